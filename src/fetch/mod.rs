//! Upstream JSON access
//!
//! This module contains the HTTP gateway for the Ergast API and the
//! [`JsonSource`] seam the aggregator depends on.

pub mod endpoints;
pub mod gateway;
pub mod limiter;

use async_trait::async_trait;
use serde_json::Value;

use crate::utils::error::FetchError;

pub use endpoints::SeasonRef;
pub use gateway::HttpGateway;
pub use limiter::RequestSpacer;

/// Anything that can resolve an API path to a JSON document
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch the JSON document at `path`, relative to the API base
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError>;
}
