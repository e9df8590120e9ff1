//! Configuration management for paddock
//!
//! This module handles loading and validating configuration from environment
//! variables, TOML files, and the named tuning profiles.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Primary Ergast mirror
pub const ERGAST_MIRROR: &str = "https://api.jolpi.ca/ergast/f1";

/// Original Ergast origin, used as failover
pub const ERGAST_ORIGIN: &str = "http://ergast.com/api/f1";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream API and gateway tuning
    pub api: ApiConfig,

    /// Cache lifetimes
    pub cache: CacheConfig,

    /// Season aggregation tuning
    pub seasons: SeasonConfig,

    /// HTTP server for the inbound request contract
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Mirror base URL, tried first
    pub mirror_url: String,

    /// Origin base URL, tried once when the mirror fails
    pub origin_url: String,

    /// Minimum spacing between dispatched requests
    pub request_delay_ms: u64,

    /// Retries after an HTTP 429
    pub max_rate_limit_retries: u32,

    /// Base of the 429 exponential backoff
    pub backoff_base_ms: u64,

    /// Cap of the 429 exponential backoff
    pub max_backoff_ms: u64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// `limit` query parameter for paginated race results
    pub results_page_limit: u32,
}

/// Cache lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Driver profile TTL in seconds
    pub profile_ttl_secs: u64,

    /// Drivers directory TTL in seconds (default: 24 hours)
    pub directory_ttl_secs: u64,
}

/// Season aggregation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    /// Earliest plausible championship year
    pub earliest_year: i32,

    /// Newest seasons loaded before the first response
    pub initial_seasons: usize,

    /// Seasons fetched in parallel per batch
    pub batch_size: usize,

    /// Per-season retries after the first attempt
    pub season_retries: u32,

    /// Linear retry step in milliseconds
    pub retry_step_ms: u64,

    /// Constructor standings are only looked up this many years back
    pub constructor_window_years: i32,

    /// Recent seasons that get a results summary
    pub summary_seasons: usize,

    /// Upper bound on result pages followed per season
    pub max_pages: u32,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub enable_cors: bool,
    pub enable_request_logging: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

/// Named tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Short spacing, fail fast
    Fast,
    /// Wider spacing, more retries, longer cache
    Patient,
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "patient" => Ok(Self::Patient),
            other => anyhow::bail!("Unknown profile: {other} (expected fast or patient)"),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            mirror_url: ERGAST_MIRROR.to_string(),
            origin_url: ERGAST_ORIGIN.to_string(),
            request_delay_ms: 150,
            max_rate_limit_retries: 1,
            backoff_base_ms: 1000,
            max_backoff_ms: 10_000,
            request_timeout_secs: 30,
            user_agent: format!("paddock/{}", env!("CARGO_PKG_VERSION")),
            results_page_limit: 500,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            profile_ttl_secs: 600,      // 10 minutes
            directory_ttl_secs: 86_400, // 24 hours
        }
    }
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            earliest_year: 1950,
            initial_seasons: 5,
            batch_size: 3,
            season_retries: 1,
            retry_step_ms: 200,
            constructor_window_years: 5,
            summary_seasons: 3,
            max_pages: 10,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8787)),
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::Fast)
    }
}

impl Config {
    /// Build the defaults for a tuning profile
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            seasons: SeasonConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.apply_profile(profile);
        config
    }

    /// Overwrite the profile-dependent constants
    pub fn apply_profile(&mut self, profile: Profile) {
        let (delay_ms, retries, ttl_secs) = match profile {
            Profile::Fast => (150, 1, 600),
            Profile::Patient => (500, 3, 1800),
        };
        self.api.request_delay_ms = delay_ms;
        self.api.max_rate_limit_retries = retries;
        self.cache.profile_ttl_secs = ttl_secs;
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("PADDOCK_PROFILE") {
            Ok(name) => Self::for_profile(name.parse()?),
            Err(_) => Self::default(),
        };

        if let Ok(url) = std::env::var("PADDOCK_MIRROR_URL") {
            config.api.mirror_url = url;
        }
        if let Ok(url) = std::env::var("PADDOCK_ORIGIN_URL") {
            config.api.origin_url = url;
        }
        if let Some(ms) = env_parse("PADDOCK_REQUEST_DELAY_MS") {
            config.api.request_delay_ms = ms;
        }
        if let Some(retries) = env_parse("PADDOCK_RATE_LIMIT_RETRIES") {
            config.api.max_rate_limit_retries = retries;
        }
        if let Some(secs) = env_parse("PADDOCK_REQUEST_TIMEOUT") {
            config.api.request_timeout_secs = secs;
        }
        if let Some(secs) = env_parse("PADDOCK_PROFILE_TTL") {
            config.cache.profile_ttl_secs = secs;
        }
        if let Some(secs) = env_parse("PADDOCK_DIRECTORY_TTL") {
            config.cache.directory_ttl_secs = secs;
        }
        if let Ok(level) = std::env::var("PADDOCK_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("PADDOCK_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.mirror_url.trim().is_empty() || self.api.origin_url.trim().is_empty() {
            anyhow::bail!("mirror_url and origin_url must not be empty");
        }

        if !(1..=3).contains(&self.api.max_rate_limit_retries) {
            anyhow::bail!("max_rate_limit_retries must be between 1 and 3");
        }

        if self.cache.profile_ttl_secs == 0 || self.cache.directory_ttl_secs == 0 {
            anyhow::bail!("cache TTLs must be greater than 0");
        }

        if self.seasons.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than 0");
        }

        if self.seasons.initial_seasons == 0 {
            anyhow::bail!("initial_seasons must be greater than 0");
        }

        if self.api.results_page_limit == 0 {
            anyhow::bail!("results_page_limit must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.api.request_delay_ms)
    }

    #[must_use]
    pub fn profile_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.profile_ttl_secs)
    }

    #[must_use]
    pub fn directory_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.directory_ttl_secs)
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
