//! Error types for the OpenTable transport layer

use thiserror::Error;

/// Errors that can occur while talking to the reservation service
///
/// The monitor treats every variant the same way: a fetch error ends the
/// run. The variants exist for logs and for callers deciding to restart.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// JSON payload error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Restaurant id is not numeric
    #[error("Invalid restaurant id: {0:?}")]
    InvalidRestaurantId(String),

    /// Home page did not carry a CSRF token
    #[error("CSRF token not found: {0}")]
    CsrfTokenMissing(String),
}

impl FetchError {
    /// Map a reqwest error, folding timeouts into [`FetchError::Timeout`]
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }

    /// Whether a later, fresh attempt could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_)
            | Self::Json(_)
            | Self::InvalidRestaurantId(_)
            | Self::CsrfTokenMissing(_) => false,
        }
    }
}
