use actix_web::http::StatusCode;
use std::fmt;

use crate::models::ApplicationStatus;

#[derive(Debug)]
pub enum AppError {
    /// Storage invoked before a backend is attached (no client context yet).
    StorageUnavailable(String),
    StorageError(String),
    SerializationError(String),
    DuplicateEmail(String),
    TransitionNotAllowed {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    NotFound(String),
    InvalidRequest(String),
    Unauthorized(String),
    Forbidden(String),
    /// Server-side failure unrelated to storage (e.g. password hashing).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::DuplicateEmail(email) => {
                write!(f, "An account with email '{}' already exists", email)
            }
            AppError::TransitionNotAllowed { from, to } => {
                write!(f, "Status transition not allowed: {} -> {}", from, to)
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::StorageError(_) | AppError::SerializationError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::DuplicateEmail(_) => StatusCode::CONFLICT,
            AppError::TransitionNotAllowed { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}
