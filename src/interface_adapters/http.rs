// Shared HTTP response types for consistent API error payloads.

use crate::domain::errors::SessionError;
use axum::{Json, http::StatusCode};

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// Maps session domain errors to HTTP responses.
pub fn map_session_error(err: SessionError) -> ApiError {
    match err {
        SessionError::LevelNotFound => error_response(StatusCode::NOT_FOUND, "level not found"),
        SessionError::SessionNotFound => {
            error_response(StatusCode::NOT_FOUND, "session not found")
        }
        SessionError::PlayerNotFound => error_response(StatusCode::NOT_FOUND, "player not found"),
        SessionError::MissingSpawn => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "level has no spawn point")
        }
        SessionError::InvalidObjectSize { object_id } => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("level object {object_id} has a negative size"),
        ),
        SessionError::InvalidPlayerName => {
            error_response(StatusCode::BAD_REQUEST, "invalid player_name")
        }
        SessionError::StorageFailure => error_response(StatusCode::BAD_GATEWAY, "storage error"),
    }
}
