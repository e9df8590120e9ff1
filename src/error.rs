//! Error classification shared by the CLI and the HTTP API
//!
//! The leaf errors live in [`crate::utils::error`]; this module gives them a
//! common interface so callers can pick a status code or a user-facing
//! message without matching on every variant.
//!
//! - [`PaddockError`] - Common interface implemented by the leaf errors
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//!
//! # Usage
//!
//! ```rust,ignore
//! use paddock::error::{PaddockError, ProfileError};
//!
//! fn report(err: &ProfileError) -> String {
//!     if err.is_recoverable() {
//!         format!("Try again later: {}", err.user_message())
//!     } else {
//!         err.user_message()
//!     }
//! }
//! ```

pub use crate::utils::error::{FetchError, ProfileError};

/// Common trait for all paddock error types
pub trait PaddockError: std::error::Error {
    /// Check if this error is recoverable (a later retry may succeed)
    fn is_recoverable(&self) -> bool;

    /// Human-readable message surfaced to the UI collaborator
    fn user_message(&self) -> String {
        self.to_string()
    }

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport failures and HTTP status errors
    Network,
    /// Upstream rate limiting
    RateLimit,
    /// Unknown or missing driver
    NotFound,
    /// Undecodable upstream data
    Parsing,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::RateLimit => "rate_limit",
            Self::NotFound => "not_found",
            Self::Parsing => "parsing",
            Self::Config => "config",
        }
    }
}

impl PaddockError for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) | Self::HttpStatus { .. } => ErrorCategory::Network,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Decode(_) => ErrorCategory::Parsing,
            Self::InvalidUrl(_) => ErrorCategory::Config,
        }
    }
}

impl PaddockError for ProfileError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::MissingKey | Self::DriverNotFound(_) => false,
            Self::FetchFailed { source, .. } => source.is_recoverable(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::FetchFailed { source, .. } if source.is_rate_limit() => source.to_string(),
            Self::FetchFailed { source, .. } => format!("Failed to fetch driver data: {source}"),
            other => other.to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingKey => ErrorCategory::Config,
            Self::DriverNotFound(_) => ErrorCategory::NotFound,
            Self::FetchFailed { source, .. } => source.category(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        assert_eq!(FetchError::rate_limited().category(), ErrorCategory::RateLimit);

        let err = ProfileError::DriverNotFound("nobody".to_string());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.category().as_str(), "not_found");

        let err = ProfileError::FetchFailed {
            key: "alonso".to_string(),
            source: FetchError::Decode("bad json".to_string()),
        };
        assert_eq!(err.category(), ErrorCategory::Parsing);
        assert_eq!(ProfileError::MissingKey.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_is_recoverable() {
        let server = FetchError::HttpStatus {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert!(server.is_recoverable());

        let missing = FetchError::HttpStatus {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert!(!missing.is_recoverable());
        assert!(!ProfileError::MissingKey.is_recoverable());

        let err = ProfileError::FetchFailed {
            key: "alonso".to_string(),
            source: server,
        };
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = ProfileError::DriverNotFound("nobody".to_string());
        assert_eq!(
            err.user_message(),
            "Driver not found: nobody. Check if the driver ID is correct."
        );

        let err = ProfileError::FetchFailed {
            key: "alonso".to_string(),
            source: FetchError::Decode("bad json".to_string()),
        };
        assert_eq!(
            err.user_message(),
            "Failed to fetch driver data: Decoding error: bad json"
        );

        let err = ProfileError::FetchFailed {
            key: "alonso".to_string(),
            source: FetchError::rate_limited(),
        };
        assert!(err.user_message().starts_with("Rate limited (429)"));
    }
}
