//! The owned fetch service
//!
//! [`FetchService`] holds everything that used to be process-wide state: the
//! gateway with its spacing watermark, the profile cache and the directory
//! cache. Build one per process and clone the handle freely.

use futures::future::join_all;
use std::collections::HashSet;
use std::mem;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, DirectoryCache, ProfileCache};
use crate::config::Config;
use crate::fetch::{HttpGateway, JsonSource, SeasonRef};
use crate::models::{DirectoryEntry, DriverKey, DriverProfile};
use crate::stats::SeasonAggregator;
use crate::utils::clock::{SharedClock, SystemClock};
use crate::utils::error::{FetchError, ProfileError};

/// Built-in last-resort roster: display name, key, code
const BUILTIN_ROSTER: &[(&str, &str, &str)] = &[
    ("Max Verstappen", "max_verstappen", "VER"),
    ("Sergio Pérez", "perez", "PER"),
    ("Lewis Hamilton", "hamilton", "HAM"),
    ("George Russell", "russell", "RUS"),
    ("Charles Leclerc", "leclerc", "LEC"),
    ("Carlos Sainz", "sainz", "SAI"),
    ("Lando Norris", "norris", "NOR"),
    ("Oscar Piastri", "piastri", "PIA"),
    ("Fernando Alonso", "alonso", "ALO"),
    ("Lance Stroll", "stroll", "STR"),
    ("Esteban Ocon", "ocon", "OCO"),
    ("Pierre Gasly", "gasly", "GAS"),
    ("Alexander Albon", "albon", "ALB"),
    ("Logan Sargeant", "sargeant", "SAR"),
    ("Yuki Tsunoda", "tsunoda", "TSU"),
    ("Daniel Ricciardo", "ricciardo", "RIC"),
    ("Valtteri Bottas", "bottas", "BOT"),
    ("Guanyu Zhou", "zhou", "ZHO"),
    ("Kevin Magnussen", "magnussen", "MAG"),
    ("Nico Hülkenberg", "hulkenberg", "HUL"),
];

/// Roster returned when every network tier fails
pub fn builtin_roster() -> Vec<DirectoryEntry> {
    BUILTIN_ROSTER
        .iter()
        .map(|(name, key, code)| DirectoryEntry::new(*name, *key, Some(*code)))
        .collect()
}

/// Union of rosters, first occurrence of each key wins
fn union_rosters(rosters: impl IntoIterator<Item = Vec<DirectoryEntry>>) -> Vec<DirectoryEntry> {
    let mut seen = HashSet::new();
    rosters
        .into_iter()
        .flatten()
        .filter(|entry| seen.insert(entry.key.clone()))
        .collect()
}

struct Inner {
    config: Config,
    clock: SharedClock,
    aggregator: SeasonAggregator,
    profiles: ProfileCache,
    directory: DirectoryCache,
    background: Mutex<JoinSet<()>>,
}

/// Cache statistics for both caches
#[derive(Debug, Clone)]
pub struct ServiceStats {
    pub profiles: CacheStats,
    pub directory: CacheStats,
}

/// Cloneable handle to the fetch service state
#[derive(Clone)]
pub struct FetchService {
    inner: Arc<Inner>,
}

impl FetchService {
    /// Build a service talking to the configured Ergast hosts
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be created
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let clock: SharedClock = Arc::new(SystemClock);
        let gateway = HttpGateway::new(&config.api)?;
        Ok(Self::with_source(config, Arc::new(gateway), clock))
    }

    /// Build a service over any JSON source and clock
    pub fn with_source(config: Config, source: Arc<dyn JsonSource>, clock: SharedClock) -> Self {
        let aggregator = SeasonAggregator::new(source, &config, Arc::clone(&clock));
        let profiles = ProfileCache::new(config.profile_ttl(), Arc::clone(&clock));
        let directory = DirectoryCache::new(config.directory_ttl(), Arc::clone(&clock));

        Self {
            inner: Arc::new(Inner {
                config,
                clock,
                aggregator,
                profiles,
                directory,
                background: Mutex::new(JoinSet::new()),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Inbound "fetch one driver's profile" request
    ///
    /// # Errors
    ///
    /// See [`FetchService::get_profile`]
    pub async fn handle_driver_request(
        &self,
        key: &str,
        all_seasons: bool,
    ) -> Result<Arc<DriverProfile>, ProfileError> {
        self.get_profile(&DriverKey::new(key.trim()), all_seasons).await
    }

    /// Cached driver profile, assembling it on a miss
    ///
    /// A fresh cached profile is returned as-is unless `all_seasons` is set
    /// and it is still partial. Deferred seasons are completed by a
    /// background task that updates the cache entry it was started for.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` when the driver cannot be resolved
    pub async fn get_profile(
        &self,
        key: &DriverKey,
        all_seasons: bool,
    ) -> Result<Arc<DriverProfile>, ProfileError> {
        if key.is_empty() {
            return Err(ProfileError::MissingKey);
        }

        if let Some(profile) = self.inner.profiles.get(key, all_seasons).await {
            debug!(key = %key, "Serving cached profile");
            return Ok(profile);
        }

        let assembly = self.inner.aggregator.assemble_profile(key, all_seasons).await?;
        let (profile, generation) = self
            .inner
            .profiles
            .insert(key.clone(), assembly.profile)
            .await;

        if !assembly.deferred.is_empty() {
            self.spawn_completion(key.clone(), generation, assembly.deferred);
        }

        Ok(profile)
    }

    fn spawn_completion(&self, key: DriverKey, generation: u64, deferred: Vec<i32>) {
        let inner = Arc::clone(&self.inner);
        let mut background = self
            .inner
            .background
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        while let Some(finished) = background.try_join_next() {
            if let Err(e) = finished {
                warn!(error = %e, "Background season task failed");
            }
        }

        debug!(key = %key, seasons = deferred.len(), "Deferring older seasons");
        background.spawn(async move {
            let standings = inner.aggregator.fetch_season_standings(&key, &deferred).await;
            let loaded = standings.len();
            if inner.profiles.complete_seasons(&key, generation, standings).await {
                info!(key = %key, loaded = loaded, "Background seasons merged");
            }
        });
    }

    /// Wait for every background completion task started so far
    pub async fn drain_background(&self) {
        let mut tasks = {
            let mut background = self
                .inner
                .background
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            mem::take(&mut *background)
        };

        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                warn!(error = %e, "Background season task failed");
            }
        }
    }

    /// The drivers directory; never fails
    ///
    /// Tries the current-season roster, then the union of the current year
    /// and the two before it, then the built-in roster. Only network results
    /// are cached.
    pub async fn get_directory(&self) -> Arc<Vec<DirectoryEntry>> {
        if let Some(directory) = self.inner.directory.get().await {
            return directory;
        }

        let aggregator = &self.inner.aggregator;

        match aggregator.fetch_roster(SeasonRef::Current).await {
            Ok(entries) if !entries.is_empty() => {
                info!(drivers = entries.len(), "Loaded current roster");
                return self.inner.directory.insert(entries).await;
            }
            Ok(_) => warn!("Current roster is empty, trying recent seasons"),
            Err(e) => warn!(error = %e, "Current roster failed, trying recent seasons"),
        }

        let current_year = self.inner.clock.current_year();
        let years: Vec<i32> = (0..3).map(|back| current_year - back).collect();
        let rosters = join_all(years.iter().map(|&year| async move {
            match aggregator.fetch_roster(SeasonRef::Year(year)).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(year = year, error = %e, "Roster fetch failed");
                    Vec::new()
                }
            }
        }))
        .await;

        let union = union_rosters(rosters);
        if !union.is_empty() {
            info!(drivers = union.len(), "Loaded roster from recent seasons");
            return self.inner.directory.insert(union).await;
        }

        warn!("All roster sources failed, using built-in roster");
        Arc::new(builtin_roster())
    }

    pub async fn stats(&self) -> ServiceStats {
        ServiceStats {
            profiles: self.inner.profiles.stats().await,
            directory: self.inner.directory.stats().await,
        }
    }
}
