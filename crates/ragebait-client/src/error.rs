//! Backend client error types.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend answered 502/503/504.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Non-success response; the message carries the response body.
    #[error("{0}")]
    RequestFailed(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Map a non-success HTTP response to an error.
    ///
    /// The message is `"{context}: {body}"` so the backend's text survives
    /// verbatim.
    pub fn from_http_status(status: u16, context: &str, body: &str) -> Self {
        let message = format!("{}: {}", context, body);
        match status {
            404 => ApiError::NotFound(message),
            502..=504 => ApiError::ServiceUnavailable(message),
            _ => ApiError::RequestFailed(message),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::ServiceUnavailable(_) | ApiError::Timeout(_) | ApiError::Network(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
