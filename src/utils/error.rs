//! Error types for the paddock fetch layer
//!
//! This module defines the leaf error types used by the gateway and the
//! profile assembly code.

use thiserror::Error;

/// Errors that can occur while fetching JSON from the upstream API
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure (connection refused, DNS, reset, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 429 after the retry budget was spent
    #[error("{message}")]
    RateLimited { message: String },

    /// Non-2xx, non-429 response
    #[error("Request failed: {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Body was not valid JSON
    #[error("Decoding error: {0}")]
    Decode(String),

    /// URL could not be built from the configured base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// User-facing message for an exhausted rate-limit budget
    pub fn rate_limited() -> Self {
        Self::RateLimited {
            message: "Rate limited (429): Too many requests. Please wait a moment and try again."
                .to_string(),
        }
    }

    /// Whether this is the terminal rate-limit failure
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Errors that abort a whole driver profile request
///
/// Every finer-grained failure (a single season, a single results page)
/// degrades to missing data instead of surfacing here.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Empty driver key
    #[error("Missing driver key")]
    MissingKey,

    /// The driver lookup returned no record
    #[error("Driver not found: {0}. Check if the driver ID is correct.")]
    DriverNotFound(String),

    /// The initial record + season list fetch failed
    #[error("Failed to fetch driver data for {key}: {source}")]
    FetchFailed {
        key: String,
        #[source]
        source: FetchError,
    },
}
