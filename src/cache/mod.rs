//! In-process caches for driver profiles and the drivers directory
//!
//! This module provides the two process-wide caches:
//! - Profile cache: one assembled profile per driver key, short TTL
//! - Directory cache: the roster-wide directory, long TTL
//!
//! Entries hold their value behind an `Arc` and are replaced rather than
//! mutated. The one exception is background season completion, which swaps
//! a completed profile into an existing entry only if the entry still has
//! the generation the background task was started for.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::{DirectoryEntry, DriverKey, DriverProfile, SeasonStanding};
use crate::stats::merge_standings;
use crate::utils::clock::SharedClock;

/// A cached value with its expiry
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: Arc<T>,
    pub expires_at: DateTime<Utc>,
    /// Bumped on every insert for the same key
    pub generation: u64,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses
    pub misses: u64,
    /// Live entries, expired ones included until overwritten
    pub entries: usize,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Counters {
    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    ChronoDuration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Driver profile cache keyed by [`DriverKey`]
#[derive(Debug)]
pub struct ProfileCache {
    entries: RwLock<HashMap<DriverKey, CacheEntry<DriverProfile>>>,
    ttl: Duration,
    clock: SharedClock,
    next_generation: AtomicU64,
    counters: Counters,
}

impl ProfileCache {
    pub fn new(ttl: Duration, clock: SharedClock) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
            next_generation: AtomicU64::new(1),
            counters: Counters::default(),
        }
    }

    /// Cached profile if fresh, and complete when `require_all_seasons` is set
    pub async fn get(&self, key: &DriverKey, require_all_seasons: bool) -> Option<Arc<DriverProfile>> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        let hit = entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .filter(|entry| !require_all_seasons || entry.value.all_seasons_loaded)
            .map(|entry| Arc::clone(&entry.value));

        self.counters.record(hit.is_some());
        tracing::debug!(key = %key, hit = hit.is_some(), "Profile cache lookup");
        hit
    }

    /// Store a profile for `now + ttl`, returning it and the entry generation
    pub async fn insert(&self, key: DriverKey, profile: DriverProfile) -> (Arc<DriverProfile>, u64) {
        let value = Arc::new(profile);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            expires_at: expiry(self.clock.now(), self.ttl),
            generation,
        };
        self.entries.write().await.insert(key, entry);
        (value, generation)
    }

    /// Merge background-loaded seasons into the entry for `key`
    ///
    /// Applies only while the entry still carries `generation`; a newer
    /// insert or a missing entry discards the update. Expiry is unchanged.
    /// Returns whether the entry was updated.
    pub async fn complete_seasons(
        &self,
        key: &DriverKey,
        generation: u64,
        additional: Vec<SeasonStanding>,
    ) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(key) else {
            tracing::debug!(key = %key, "Entry gone, discarding background seasons");
            return false;
        };
        if entry.generation != generation {
            tracing::debug!(
                key = %key,
                expected = generation,
                found = entry.generation,
                "Entry replaced, discarding background seasons"
            );
            return false;
        }

        let mut profile = DriverProfile::clone(&entry.value);
        profile.seasons = merge_standings(&profile.seasons, additional);
        profile.all_seasons_loaded = true;
        entry.value = Arc::new(profile);
        true
    }

    /// Drop the entry for `key`
    pub async fn invalidate(&self, key: &DriverKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await.len();
        self.counters.snapshot(entries)
    }
}

/// Drivers directory cache, a single entry
#[derive(Debug)]
pub struct DirectoryCache {
    entry: RwLock<Option<CacheEntry<Vec<DirectoryEntry>>>>,
    ttl: Duration,
    clock: SharedClock,
    counters: Counters,
}

impl DirectoryCache {
    pub fn new(ttl: Duration, clock: SharedClock) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
            clock,
            counters: Counters::default(),
        }
    }

    /// Cached directory if fresh
    pub async fn get(&self) -> Option<Arc<Vec<DirectoryEntry>>> {
        let now = self.clock.now();
        let hit = self
            .entry
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| Arc::clone(&entry.value));

        self.counters.record(hit.is_some());
        hit
    }

    pub async fn insert(&self, entries: Vec<DirectoryEntry>) -> Arc<Vec<DirectoryEntry>> {
        let value = Arc::new(entries);
        let mut slot = self.entry.write().await;
        let generation = slot.as_ref().map_or(1, |e| e.generation + 1);
        *slot = Some(CacheEntry {
            value: Arc::clone(&value),
            expires_at: expiry(self.clock.now(), self.ttl),
            generation,
        });
        value
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = usize::from(self.entry.read().await.is_some());
        self.counters.snapshot(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DriverRecord;
    use crate::utils::clock::ManualClock;
    use chrono::TimeZone;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn profile(complete: bool) -> DriverProfile {
        let mut profile = DriverProfile::empty(DriverRecord {
            driver_id: DriverKey::new("norris"),
            given_name: "Lando".to_string(),
            family_name: "Norris".to_string(),
            nationality: None,
            date_of_birth: None,
            code: Some("NOR".to_string()),
            permanent_number: None,
            url: None,
        });
        profile.all_seasons_loaded = complete;
        profile
    }

    fn standing(season: i32) -> SeasonStanding {
        SeasonStanding {
            season,
            position: 6,
            points: 50.0,
            wins: 0,
            constructors: vec!["McLaren".to_string()],
            is_champion: false,
            is_constructor_champion: false,
            incomplete: false,
        }
    }

    #[tokio::test]
    async fn test_profile_ttl_boundary() {
        let clock = clock();
        let cache = ProfileCache::new(Duration::from_secs(600), clock.clone());
        let key = DriverKey::new("norris");
        let (stored, _) = cache.insert(key.clone(), profile(true)).await;

        clock.advance(Duration::from_secs(599));
        let hit = cache.get(&key, false).await.unwrap();
        assert!(Arc::ptr_eq(&hit, &stored));

        clock.advance(Duration::from_secs(2));
        assert!(cache.get(&key, false).await.is_none());

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[tokio::test]
    async fn test_partial_profile_misses_when_full_history_required() {
        let cache = ProfileCache::new(Duration::from_secs(600), clock());
        let key = DriverKey::new("norris");
        cache.insert(key.clone(), profile(false)).await;

        assert!(cache.get(&key, false).await.is_some());
        assert!(cache.get(&key, true).await.is_none());
    }

    #[tokio::test]
    async fn test_complete_seasons_guarded_by_generation() {
        let cache = ProfileCache::new(Duration::from_secs(600), clock());
        let key = DriverKey::new("norris");

        let mut partial = profile(false);
        partial.seasons = vec![standing(2023)];
        let (_, stale) = cache.insert(key.clone(), partial.clone()).await;
        let (_, current) = cache.insert(key.clone(), partial).await;

        assert!(!cache.complete_seasons(&key, stale, vec![standing(2019)]).await);
        assert!(cache.get(&key, true).await.is_none());

        assert!(cache.complete_seasons(&key, current, vec![standing(2019)]).await);
        let completed = cache.get(&key, true).await.unwrap();
        let years: Vec<i32> = completed.seasons.iter().map(|s| s.season).collect();
        assert_eq!(years, vec![2019, 2023]);

        assert!(cache.invalidate(&key).await);
        assert!(!cache.complete_seasons(&key, current, Vec::new()).await);
    }

    #[tokio::test]
    async fn test_directory_expiry() {
        let clock = clock();
        let cache = DirectoryCache::new(Duration::from_secs(86_400), clock.clone());
        assert!(cache.get().await.is_none());

        cache
            .insert(vec![DirectoryEntry::new("Lando Norris", "norris", Some("NOR"))])
            .await;
        assert_eq!(cache.get().await.unwrap().len(), 1);

        clock.advance(Duration::from_secs(86_400));
        assert!(cache.get().await.is_none());
    }
}
