use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the scheduling core. All are deterministic and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    SchedulingConflict(String),

    /// Infrastructure failure reported by the store.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SchedulingError {
    pub fn not_working() -> Self {
        SchedulingError::SchedulingConflict("Doctor not working that day".to_string())
    }

    pub fn outside_working_hours() -> Self {
        SchedulingError::SchedulingConflict("Appointment outside working hours".to_string())
    }

    pub fn already_booked() -> Self {
        SchedulingError::SchedulingConflict("Slot already booked".to_string())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::NotFound(msg) => AppError::NotFound(msg),
            SchedulingError::InvalidArgument(msg) => AppError::ValidationError(msg),
            SchedulingError::SchedulingConflict(msg) if msg.to_lowercase().contains("booked") => {
                AppError::Conflict(msg)
            }
            SchedulingError::SchedulingConflict(msg) => AppError::BadRequest(msg),
            SchedulingError::Storage(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        tracing::error!("Error: {}: {}", status, message);

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
