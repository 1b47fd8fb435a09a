//! Unified error handling for the tablewatch crate
//!
//! Domain errors stay in their modules; [`Error`] wraps them at module
//! boundaries so the binary can classify failures in one place.
//!
//! - [`TablewatchErrorTrait`] - common interface implemented by all error types
//! - [`ErrorCategory`] - classification of errors for handling strategies
//! - [`Error`] - unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use tablewatch::error::{Error, TablewatchErrorTrait};
//!
//! fn report(err: &Error) {
//!     if err.is_recoverable() {
//!         eprintln!("temporary failure, try again: {}", err.user_message());
//!     } else {
//!         eprintln!("fatal: {err}");
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::monitor::MonitorError;
pub use crate::notifications::channels::ChannelError;
pub use crate::utils::error::FetchError;

/// Common trait for all tablewatch error types
pub trait TablewatchErrorTrait: std::error::Error {
    /// Whether a fresh attempt could succeed
    fn is_recoverable(&self) -> bool;

    /// Short description for people, without internal detail
    fn user_message(&self) -> String;

    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// HTTP, timeout, rejected status
    Network,
    /// Undecodable responses
    Parsing,
    /// Notification delivery
    Notification,
    /// Configuration and argument validation
    Config,
    /// Run stopped on request
    Cancelled,
}

impl ErrorCategory {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Parsing => "parsing error",
            Self::Notification => "notification error",
            Self::Config => "configuration error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

impl TablewatchErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        FetchError::is_recoverable(self)
    }

    fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach OpenTable".to_string(),
            Self::ServerError(status) => format!("OpenTable answered with HTTP {status}"),
            Self::Timeout => "OpenTable did not answer in time".to_string(),
            Self::Decode(_) | Self::Json(_) => "Unexpected response from OpenTable".to_string(),
            Self::InvalidRestaurantId(id) => format!("Restaurant id {id:?} is not numeric"),
            Self::CsrfTokenMissing(_) => "Could not start an OpenTable session".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::ServerError(_) | Self::Timeout | Self::CsrfTokenMissing(_) => {
                ErrorCategory::Network
            }
            Self::Decode(_) | Self::Json(_) => ErrorCategory::Parsing,
            Self::InvalidRestaurantId(_) => ErrorCategory::Config,
        }
    }
}

impl TablewatchErrorTrait for MonitorError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Cancelled => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Fetch(e) => e.user_message(),
            Self::Cancelled => "Monitoring was cancelled".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }
}

impl TablewatchErrorTrait for ChannelError {
    fn is_recoverable(&self) -> bool {
        self.is_retryable()
    }

    fn user_message(&self) -> String {
        format!("Notification not delivered: {self}")
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig(_) => ErrorCategory::Config,
            _ => ErrorCategory::Notification,
        }
    }
}

/// Unified error type for the tablewatch crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),

    #[error("Notification error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Config error: {0}")]
    Config(String),
}

impl TablewatchErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Monitor(e) => TablewatchErrorTrait::is_recoverable(e),
            Self::Channel(e) => TablewatchErrorTrait::is_recoverable(e),
            Self::Config(_) => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Fetch(e) => e.user_message(),
            Self::Monitor(e) => e.user_message(),
            Self::Channel(e) => e.user_message(),
            Self::Config(msg) => format!("Invalid configuration: {msg}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Monitor(e) => e.category(),
            Self::Channel(e) => e.category(),
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
