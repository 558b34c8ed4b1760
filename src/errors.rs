use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Superseded: {0}")]
    Superseded(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::TransportError(_) => "TRANSPORT_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ServerError(_) => "SERVER_ERROR",
            AppError::StorageError(_) => "STORAGE_ERROR",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Superseded(_) => "SUPERSEDED",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Maps a non-success HTTP status to the error taxonomy. `message` is the
    /// server-supplied text, empty when the body carried none.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::FORBIDDEN => AppError::AuthError(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::ValidationError(message)
            }
            s if s.is_server_error() => AppError::ServerError(message),
            _ => AppError::InternalError(message),
        }
    }

    /// Text the backend sent with the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            AppError::AuthError(m)
            | AppError::ValidationError(m)
            | AppError::Unauthorized(m)
            | AppError::NotFound(m)
            | AppError::ServerError(m) => m.as_str(),
            _ => return None,
        };

        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }

    /// Message suitable for a notification: the server text when present,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::TransportError(format!("Request timed out: {}", err))
        } else {
            AppError::TransportError(err.to_string())
        }
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON error: {}", err))
    }
}
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
