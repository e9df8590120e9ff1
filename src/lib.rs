//! paddock - Formula 1 driver annotation and statistics
//!
//! Finds driver names in web pages, wraps them in annotation elements, and
//! serves per-driver statistics aggregated from the Ergast API.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and tuning profiles
//! - [`fetch`] - HTTP gateway with request spacing, backoff and failover
//! - [`stats`] - Ergast envelope decoding and season aggregation
//! - [`cache`] - Profile and directory caches
//! - [`service`] - The owned fetch service tying the above together
//! - [`annotate`] - Name matching and page scanning
//! - [`server`] - JSON HTTP endpoints
//! - [`error`] - Error categories shared by the CLI and the API
//! - [`models`] - Core data structures and types
//! - [`utils`] - Clock, retry and leaf error types
//!
//! # Example
//!
//! ```no_run
//! use paddock::config::Config;
//! use paddock::service::FetchService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = FetchService::new(Config::from_env()?)?;
//!     let profile = service.handle_driver_request("alonso", false).await?;
//!     println!("{} titles", profile.championships());
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod server;
pub mod service;
pub mod stats;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::annotate::{annotate_html, PageScanner, PageTree};
    pub use crate::config::{Config, Profile};
    pub use crate::error::{ErrorCategory, PaddockError};
    pub use crate::models::{DirectoryEntry, DriverKey, DriverProfile, SeasonStanding};
    pub use crate::service::FetchService;
}

// Direct re-exports for convenience
pub use models::{DirectoryEntry, DriverKey, DriverProfile};
pub use service::FetchService;
