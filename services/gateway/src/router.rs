use crate::handlers::{data, keys, meta};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let data_routes = Router::new()
        .route("/{ticker}", get(data::raw_data))
        .route("/{ticker}/range", get(data::range_data))
        .route("/{ticker}/summary", get(data::summary))
        .route("/{ticker}/dates", get(data::dates))
        .route("/{ticker}/latest", get(data::latest))
        .route("/{ticker}/stats", get(data::stats));

    let admin_routes = Router::new()
        .route("/generate-key", post(keys::generate_key))
        .route("/keys", get(keys::list_keys));

    Router::new()
        .route("/", get(meta::root))
        .route("/register", post(keys::register))
        .route("/health", get(meta::health))
        .route("/tickers", get(meta::tickers))
        .nest("/data", data_routes)
        .nest("/admin", admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
