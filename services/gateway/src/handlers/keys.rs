use axum::{Json, extract::State};
use types::errors::QueryError;

use crate::auth::AdminAuth;
use crate::error::AppError;
use crate::handlers::extract::{ValidJson, ValidQuery};
use crate::keystore::{IssueRequest, KeyListing};
use crate::models::{ApiKeyResponse, GenerateKeyParams, RegisterRequest};
use crate::state::AppState;

fn client_name(raw: Option<String>) -> Result<String, AppError> {
    match raw.map(|name| name.trim().to_string()) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(QueryError::validation("client_name", "is required").into()),
    }
}

/// Public self-serve issuance. Any well-formed body is accepted.
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<Json<ApiKeyResponse>, AppError> {
    let name = payload.client_name;
    let request = IssueRequest::register(name.clone(), payload.email, payload.purpose);

    let api_key = state.with_keys(move |keys| keys.issue(request)).await?;

    Ok(Json(ApiKeyResponse {
        api_key,
        message: format!(
            "API key generated successfully for {}. Please save this key securely - it will not be shown again!",
            name
        ),
        expires: None,
    }))
}

/// Admin-only issuance.
pub async fn generate_key(
    State(state): State<AppState>,
    admin: AdminAuth,
    ValidQuery(params): ValidQuery<GenerateKeyParams>,
) -> Result<Json<ApiKeyResponse>, AppError> {
    let name = client_name(params.client_name)?;
    let request = IssueRequest::admin(name.clone());

    let api_key = state
        .with_keys(move |keys| keys.issue_admin(request, Some(admin.admin_key.as_str())))
        .await?;

    Ok(Json(ApiKeyResponse {
        api_key,
        message: format!("API key generated for {}", name),
        expires: None,
    }))
}

pub async fn list_keys(
    State(state): State<AppState>,
    admin: AdminAuth,
) -> Result<Json<KeyListing>, AppError> {
    let listing = state
        .with_keys(move |keys| keys.list_keys(Some(admin.admin_key.as_str())))
        .await?;
    Ok(Json(listing))
}
