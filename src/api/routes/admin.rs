//! Admin session endpoints.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::ApiError;

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthenticateResponse {
    pub token: String,
}

/// Exchange the admin password for a session token.
pub async fn authenticate(
    State(state): State<AppState>,
    Json(req): Json<AuthenticateRequest>,
) -> Result<Json<AuthenticateResponse>, ApiError> {
    if !state.auth.enabled() {
        return Err(ApiError::Unauthorized(
            "admin access is not configured".to_string(),
        ));
    }
    match state.auth.authenticate(&req.password).await {
        Some(token) => Ok(Json(AuthenticateResponse { token })),
        None => {
            warn!("Rejected admin authentication attempt");
            Err(ApiError::Unauthorized("invalid password".to_string()))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Report whether the presented session token is still live. Always
/// answers 200 so clients can poll without tripping error handling.
pub async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ValidateResponse> {
    let valid = match bearer_token(&headers) {
        Some(token) => state.auth.validate(token).await,
        None => false,
    };
    Json(ValidateResponse { valid })
}

/// Revoke the presented session token. Idempotent; an unknown or absent
/// token still answers 204.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.auth.revoke(token).await;
    }
    StatusCode::NO_CONTENT
}
