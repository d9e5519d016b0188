// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::AuthError;
use crate::dispatch::DispatchError;
use crate::registry::RoomExists;
use crate::validation::ValidationError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Room not found or host not connected")]
    RoomNotFound,

    #[error("Room already exists")]
    RoomExists,

    #[error("Room is not accepting deliveries right now")]
    Backpressure,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::WrongRole { .. }) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::RoomNotFound => StatusCode::NOT_FOUND,
            AppError::RoomExists => StatusCode::CONFLICT,
            AppError::Backpressure => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(AuthError::MissingCredential) => "AUTH_001",
            AppError::Auth(AuthError::InvalidCredential(_)) => "AUTH_002",
            AppError::Auth(AuthError::Expired) => "AUTH_003",
            AppError::Auth(AuthError::WrongRole { .. }) => "AUTH_004",
            AppError::Validation(_) => "VAL_001",
            AppError::InvalidInput(_) => "VAL_002",
            AppError::RoomNotFound => "ROOM_001",
            AppError::RoomExists => "ROOM_002",
            AppError::Backpressure => "ROOM_003",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Auth(AuthError::WrongRole { .. }) => "Forbidden".to_string(),
            AppError::Auth(_) => "Authentication failed".to_string(),
            AppError::Validation(_) | AppError::InvalidInput(_) => {
                "Invalid input provided".to_string()
            },
            AppError::RoomNotFound | AppError::RoomExists | AppError::Backpressure => {
                self.to_string()
            },
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    /// Text of the error frame sent to a kiosk connection before it is closed
    pub fn frame_message(&self) -> String {
        match self {
            AppError::Auth(AuthError::WrongRole { .. }) => "Unauthorized kiosk".to_string(),
            AppError::Auth(_) => "Invalid kiosk token".to_string(),
            AppError::Validation(err) => err.to_string(),
            _ => self.sanitized_message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::RoomNotFound => AppError::RoomNotFound,
            DispatchError::Backpressure => AppError::Backpressure,
        }
    }
}

impl From<RoomExists> for AppError {
    fn from(_: RoomExists) -> Self {
        AppError::RoomExists
    }
}
