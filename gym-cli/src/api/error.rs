use reqwest::StatusCode;
use thiserror::Error;

/// Fallback toast text when the backend sends no message
pub const GENERIC_ERROR: &str = "An error occurred";
/// Toast shown when a request is rejected with 401
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
/// Toast shown when no response is received
pub const CONNECTION_ERROR: &str = "Unable to connect to the server. Please check your connection.";

/// API-specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{}", SESSION_EXPIRED)]
    SessionExpired { return_to: Option<String> },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, message: String) -> Self {
        let msg = if message.is_empty() {
            status.canonical_reason().unwrap_or(GENERIC_ERROR).to_string()
        } else {
            message
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::SessionExpired { return_to: None },
            StatusCode::FORBIDDEN => ApiError::Unauthorized(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(msg),
            status if status.is_server_error() => ApiError::ServerError(msg),
            status if status.is_client_error() => ApiError::BadRequest(msg),
            _ => ApiError::Unknown(msg),
        }
    }

    /// Text for a toast: the server's own message where there is one
    pub fn message(&self) -> String {
        match self {
            ApiError::SessionExpired { .. } => SESSION_EXPIRED.to_string(),
            ApiError::NetworkError(_) => CONNECTION_ERROR.to_string(),
            ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::ServerError(msg)
            | ApiError::Rejected(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(format!("{err:#}"))
    }
}
