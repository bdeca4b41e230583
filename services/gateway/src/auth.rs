use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the client API key.
pub const API_KEY_HEADER: &str = "X-API-Key";
/// Header carrying the admin credential.
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// A request whose `X-API-Key` is a member of the key store.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    pub api_key: String,
}

/// A request whose `X-Admin-Key` matches the configured admin secret.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub admin_key: String,
}

/// Header value as sent; only a missing or zero-length header is absent.
/// Whitespace-only values are kept so they fail verification.
fn header_value(parts: &Parts, name: &str) -> Result<Option<String>, AppError> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| AppError::Forbidden(format!("Invalid {} header.", name)))?;
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
    }
}

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(api_key) = header_value(parts, API_KEY_HEADER)? else {
            return Err(AppError::Unauthorized(
                "API key missing. Please provide X-API-Key header.".to_string(),
            ));
        };

        // verify re-reads the persisted key file
        let candidate = api_key.clone();
        let valid = state
            .with_keys(move |keys| Ok::<_, AppError>(keys.verify(&candidate)))
            .await?;
        if !valid {
            return Err(AppError::Forbidden(
                "Invalid API key. Access denied.".to_string(),
            ));
        }

        Ok(ApiKeyAuth {
            api_key: api_key.trim().to_string(),
        })
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = header_value(parts, ADMIN_KEY_HEADER)?;
        state.keys.authorize_admin(presented.as_deref())?;
        Ok(AdminAuth {
            admin_key: presented.unwrap_or_default(),
        })
    }
}
