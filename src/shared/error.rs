//! Application Error Types
//!
//! Centralized HTTP error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::services::BookingError;
use crate::domain::{ClientIdError, RegistryError, SeatIdError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 10005, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}

impl From<SeatIdError> for AppError {
    fn from(err: SeatIdError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ClientIdError> for AppError {
    fn from(err: ClientIdError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownSeat(id) => AppError::NotFound(format!("Unknown seat: {}", id)),
            e => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(id) => AppError::NotFound(format!("Booking not found: {}", id)),
            BookingError::UnknownSeat(id) => AppError::NotFound(format!("Unknown seat: {}", id)),
            BookingError::Internal(msg) => AppError::Internal(msg),
            e => AppError::Conflict(e.to_string()),
        }
    }
}
