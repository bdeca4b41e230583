use axum::{Json, extract::State};
use serde_json::{Value, json};
use tick_store::query::TickerListing;

use crate::auth::ApiKeyAuth;
use crate::error::AppError;
use crate::models::HealthResponse;
use crate::state::AppState;

/// Capability document. No authentication.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Stock Market TBT Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "HTTP",
        "authentication": "All endpoints (except public ones) require API key in X-API-Key header",
        "public_endpoints": {
            "root": "/",
            "register": "/register - Request API key"
        },
        "api_endpoints": {
            "health": "/health",
            "tickers": "/tickers",
            "data": "/data/{ticker}",
            "date_range": "/data/{ticker}/range",
            "summary": "/data/{ticker}/summary",
            "dates": "/data/{ticker}/dates",
            "latest": "/data/{ticker}/latest",
            "stats": "/data/{ticker}/stats"
        },
        "admin_endpoints": {
            "generate_key": "/admin/generate-key - Generate new API key (requires admin key)",
            "list_keys": "/admin/keys - List all API keys (requires admin key)"
        },
        "how_to_get_api_key": {
            "method": "POST",
            "url": "http://your-server:8000/register",
            "body": {
                "client_name": "Your Name or Company",
                "email": "your-email@example.com",
                "purpose": "Brief description of usage"
            }
        },
        "example_request": {
            "method": "GET",
            "url": "http://your-server:8000/tickers",
            "headers": {
                "X-API-Key": "your-api-key-here"
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>, _auth: ApiKeyAuth) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        data_directory: state.engine.index().root().display().to_string(),
        api_key_valid: true,
    })
}

pub async fn tickers(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
) -> Result<Json<TickerListing>, AppError> {
    let listing = state.with_engine(|engine| engine.list_tickers()).await?;
    Ok(Json(listing))
}
