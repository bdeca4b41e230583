use serde::{Deserialize, Serialize};

/// Body of `POST /register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub client_name: String,
    pub email: Option<String>,
    pub purpose: Option<String>,
}

/// Query of `POST /admin/generate-key`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateKeyParams {
    pub client_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
    pub message: String,
    /// Keys never expire.
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub data_directory: String,
    pub api_key_valid: bool,
}

// Numeric query parameters are taken as signed integers so that negative
// or out-of-range values reach validation instead of failing to parse.

/// Query of `GET /data/{ticker}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataParams {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub date: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query of `GET /data/{ticker}/range`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeParams {
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query of `GET /data/{ticker}/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsParams {
    pub date: Option<i64>,
}
