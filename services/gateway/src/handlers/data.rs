use axum::{
    Json,
    extract::{Path, State},
};
use tick_store::params::{parse_date, require_date};
use tick_store::query::{DateListing, LatestTick, TickPage, TickerStats, TickerSummary};
use tick_store::{Pagination, PartitionFilter, Ticker};

use crate::auth::ApiKeyAuth;
use crate::error::AppError;
use crate::handlers::extract::ValidQuery;
use crate::models::{DataParams, RangeParams, StatsParams};
use crate::state::AppState;

pub async fn raw_data(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    Path(ticker): Path<String>,
    ValidQuery(params): ValidQuery<DataParams>,
) -> Result<Json<TickPage>, AppError> {
    // Everything is validated before the archive is touched
    let ticker = Ticker::parse(&ticker)?;
    let filter = PartitionFilter::new(params.year, params.month)?;
    let date = parse_date("date", params.date)?;
    let page = Pagination::new(params.limit, params.offset)?;

    let result = state
        .with_engine(move |engine| engine.raw_data(&ticker, filter, date, page))
        .await?;
    Ok(Json(result))
}

pub async fn range_data(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    Path(ticker): Path<String>,
    ValidQuery(params): ValidQuery<RangeParams>,
) -> Result<Json<TickPage>, AppError> {
    let ticker = Ticker::parse(&ticker)?;
    let start = require_date("start_date", params.start_date)?;
    let end = require_date("end_date", params.end_date)?;
    let page = Pagination::new(params.limit, params.offset)?;

    let result = state
        .with_engine(move |engine| engine.range_data(&ticker, start, end, page))
        .await?;
    Ok(Json(result))
}

pub async fn summary(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    Path(ticker): Path<String>,
) -> Result<Json<TickerSummary>, AppError> {
    let ticker = Ticker::parse(&ticker)?;
    let result = state.with_engine(move |engine| engine.summary(&ticker)).await?;
    Ok(Json(result))
}

pub async fn dates(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    Path(ticker): Path<String>,
) -> Result<Json<DateListing>, AppError> {
    let ticker = Ticker::parse(&ticker)?;
    let result = state.with_engine(move |engine| engine.dates(&ticker)).await?;
    Ok(Json(result))
}

pub async fn latest(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    Path(ticker): Path<String>,
) -> Result<Json<LatestTick>, AppError> {
    let ticker = Ticker::parse(&ticker)?;
    let result = state.with_engine(move |engine| engine.latest(&ticker)).await?;
    Ok(Json(result))
}

pub async fn stats(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    Path(ticker): Path<String>,
    ValidQuery(params): ValidQuery<StatsParams>,
) -> Result<Json<TickerStats>, AppError> {
    let ticker = Ticker::parse(&ticker)?;
    let date = parse_date("date", params.date)?;
    let result = state
        .with_engine(move |engine| engine.stats(&ticker, date))
        .await?;
    Ok(Json(result))
}
