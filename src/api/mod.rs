//! REST API endpoints.
//!
//! Axum-based HTTP API for score submission, leaderboards, and the
//! derived analytics dashboards.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;
use crate::timewindow::WindowError;

pub mod auth;
pub mod routes;
pub mod state;

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::RecordNotFound(what) => ApiError::NotFound(what),
            StorageError::VersionConflict { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<WindowError> for ApiError {
    fn from(err: WindowError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Assemble the full API router over shared state.
pub fn build_router(state: AppState) -> Router {
    use routes::{admin, analytics, games, scores, stats};

    Router::new()
        .route("/api/games", get(games::list_games).post(games::create_game))
        .route("/api/games/all", get(games::list_all_games))
        .route(
            "/api/games/:id",
            get(games::get_game)
                .put(games::update_game)
                .delete(games::delete_game),
        )
        .route(
            "/api/scores",
            get(scores::list_scores).post(scores::submit_score),
        )
        .route(
            "/api/scores/:id",
            get(scores::get_score)
                .put(scores::update_score)
                .delete(scores::delete_score),
        )
        .route("/api/scores/:id/image", get(scores::get_score_image))
        .route("/api/scores/game/:game_id", get(scores::scores_for_game))
        .route(
            "/api/scores/game/:game_id/leaderboard",
            get(scores::leaderboard),
        )
        .route("/api/analytics/close-calls", get(analytics::close_calls))
        .route(
            "/api/analytics/comeback-kings",
            get(analytics::comeback_kings),
        )
        .route(
            "/api/analytics/consistency-champions",
            get(analytics::consistency_champions),
        )
        .route(
            "/api/analytics/distribution/:scoring_type",
            get(analytics::distribution),
        )
        .route("/api/analytics/photo-finish", get(analytics::photo_finish))
        .route(
            "/api/analytics/player-temperature/:player_name",
            get(analytics::player_temperature),
        )
        .route("/api/stats/daily-champions", get(stats::daily_champions))
        .route("/api/stats/top-winners", get(stats::top_winners))
        .route("/api/admin/authenticate", post(admin::authenticate))
        .route("/api/admin/validate", post(admin::validate))
        .route("/api/admin/logout", post(admin::logout))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                ApiError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: ApiError = StorageError::RecordNotFound("game x".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = StorageError::VersionConflict {
            record: "game x".into(),
            expected: 1,
            found: 2,
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_window_error_maps_to_bad_request() {
        let err: ApiError = WindowError::InvalidDays(0).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
