//! Season aggregation
//!
//! Turns the many small Ergast endpoints into one [`DriverProfile`]:
//! - Driver record and season list fetched together
//! - Standings fetched in small parallel batches with per-season retry
//! - Race results followed across pages, summarised per season
//!
//! Only the initial record and season-list fetch can fail a request. Every
//! other failure is logged and degrades to missing data.

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::summary::summarize_season;
use super::wire::{Envelope, WireRace};
use crate::config::{Config, SeasonConfig};
use crate::fetch::{endpoints, JsonSource, SeasonRef};
use crate::models::{
    normalize_standings, DirectoryEntry, DriverKey, DriverProfile, DriverRecord, RaceResult,
    SeasonResults, SeasonSnapshot, SeasonStanding, SeasonSummaryEntry,
};
use crate::utils::clock::SharedClock;
use crate::utils::error::{FetchError, ProfileError};
use crate::utils::parse_number;
use crate::utils::retry::{with_retry, RetryConfig};

/// A freshly assembled profile plus the seasons left for background loading
#[derive(Debug, Clone)]
pub struct ProfileAssembly {
    pub profile: DriverProfile,
    /// Older seasons not yet fetched, ascending
    pub deferred: Vec<i32>,
}

/// Multi-endpoint aggregator over a [`JsonSource`]
#[derive(Clone)]
pub struct SeasonAggregator {
    source: Arc<dyn JsonSource>,
    seasons: SeasonConfig,
    results_page_limit: u32,
    request_delay: Duration,
    clock: SharedClock,
}

impl SeasonAggregator {
    pub fn new(source: Arc<dyn JsonSource>, config: &Config, clock: SharedClock) -> Self {
        Self {
            source,
            seasons: config.seasons.clone(),
            results_page_limit: config.api.results_page_limit,
            request_delay: config.request_delay(),
            clock,
        }
    }

    async fn fetch(&self, path: &str) -> Result<Envelope, FetchError> {
        let value = self.source.fetch_json(path).await?;
        Envelope::parse(value)
    }

    /// Driver record, `None` when the upstream knows no such driver
    pub async fn fetch_driver(&self, key: &DriverKey) -> Result<Option<DriverRecord>, FetchError> {
        let envelope = self.fetch(&endpoints::driver(key)).await?;
        Ok(envelope.drivers().first().map(|d| d.to_record()))
    }

    /// Every season the driver took part in, as listed upstream
    pub async fn fetch_season_list(&self, key: &DriverKey) -> Result<Vec<i32>, FetchError> {
        let envelope = self.fetch(&endpoints::driver_seasons(key)).await?;
        Ok(envelope.season_years())
    }

    /// Keep seasons between the earliest championship and the current year, ascending
    pub fn plausible_seasons(&self, years: &[i32]) -> Vec<i32> {
        let current_year = self.clock.current_year();
        let mut valid: Vec<i32> = years
            .iter()
            .copied()
            .filter(|y| (self.seasons.earliest_year..=current_year).contains(y))
            .collect();
        valid.sort_unstable();
        valid.dedup();
        valid
    }

    /// Final standings for the given seasons
    ///
    /// Seasons without a resolvable standing, or whose retries run out, are
    /// dropped. The result is ascending with no duplicate seasons.
    pub async fn fetch_season_standings(
        &self,
        key: &DriverKey,
        seasons: &[i32],
    ) -> Vec<SeasonStanding> {
        if seasons.is_empty() {
            return Vec::new();
        }

        let retry = RetryConfig::linear(self.seasons.season_retries, self.seasons.retry_step_ms);
        let batch_size = self.seasons.batch_size.max(1);
        let mut standings = Vec::with_capacity(seasons.len());

        let mut batches = seasons.chunks(batch_size).peekable();
        while let Some(batch) = batches.next() {
            let fetches = batch.iter().map(|&season| {
                let retry = &retry;
                async move {
                    match with_retry(retry, |_| self.fetch_one_standing(key, season)).await {
                        Ok(standing) => standing,
                        Err(e) => {
                            warn!(key = %key, season = season, error = %e, "Dropping season after retries");
                            None
                        }
                    }
                }
            });
            standings.extend(join_all(fetches).await.into_iter().flatten());

            if batches.peek().is_some() {
                tokio::time::sleep(self.request_delay * 2).await;
            }
        }

        debug!(key = %key, requested = seasons.len(), loaded = standings.len(), "Season standings fetched");
        normalize_standings(standings)
    }

    async fn fetch_one_standing(
        &self,
        key: &DriverKey,
        season: i32,
    ) -> Result<Option<SeasonStanding>, FetchError> {
        let envelope = self
            .fetch(&endpoints::driver_standings(SeasonRef::Year(season), key))
            .await?;

        let Some(standing) = envelope.first_driver_standing() else {
            debug!(key = %key, season = season, "No standing for season");
            return Ok(None);
        };
        let Some(position) = standing.resolved_position() else {
            debug!(key = %key, season = season, position = ?standing.position, "Unresolved position");
            return Ok(None);
        };

        let points = parse_number::<f64>(standing.points.as_deref());
        let wins = parse_number::<u32>(standing.wins.as_deref());
        let constructors = standing.constructor_names();

        let is_constructor_champion = if self.in_constructor_window(season) {
            self.constructor_champion(season)
                .await
                .is_some_and(|champion| constructors.iter().any(|c| *c == champion))
        } else {
            false
        };

        Ok(Some(SeasonStanding {
            season,
            position,
            points: points.unwrap_or(0.0),
            wins: wins.unwrap_or(0),
            constructors,
            is_champion: position == 1,
            is_constructor_champion,
            incomplete: points.is_none() || wins.is_none(),
        }))
    }

    fn in_constructor_window(&self, season: i32) -> bool {
        season >= self.clock.current_year() - self.seasons.constructor_window_years
    }

    async fn constructor_champion(&self, season: i32) -> Option<String> {
        match self.fetch(&endpoints::constructor_standings(season)).await {
            Ok(envelope) => envelope.champion_constructor().map(str::to_string),
            Err(e) => {
                warn!(season = season, error = %e, "Skipping constructor standings");
                None
            }
        }
    }

    /// Live standing for one season; `None` when unavailable
    pub async fn fetch_current_season_snapshot(
        &self,
        key: &DriverKey,
        season: i32,
    ) -> Option<SeasonSnapshot> {
        let path = endpoints::driver_standings(SeasonRef::Year(season), key);
        match self.fetch(&path).await {
            Ok(envelope) => envelope
                .first_driver_standing()
                .map(|standing| standing.to_snapshot(season)),
            Err(e) => {
                warn!(key = %key, season = season, error = %e, "Failed to fetch season snapshot");
                None
            }
        }
    }

    /// Race results and summary for one season
    ///
    /// For the current calendar year the `current` endpoint is tried first.
    /// The first endpoint yielding at least one race wins; if none do the
    /// result is empty.
    pub async fn fetch_season_results_data(&self, key: &DriverKey, season: i32) -> SeasonResults {
        let mut candidates = Vec::with_capacity(2);
        if season == self.clock.current_year() {
            candidates.push(SeasonRef::Current);
        }
        candidates.push(SeasonRef::Year(season));

        for season_ref in candidates {
            match self.fetch_result_pages(key, season_ref).await {
                Ok(races) if !races.is_empty() => {
                    let summary = summarize_season(&races);
                    return SeasonResults { races, summary };
                }
                Ok(_) => debug!(key = %key, season = ?season_ref, "No race results"),
                Err(e) => warn!(key = %key, season = ?season_ref, error = %e, "Failed to fetch race results"),
            }
        }

        warn!(key = %key, season = season, "No race results from any endpoint");
        SeasonResults::default()
    }

    /// Follow `offset`/`total` pagination up to the page limit
    async fn fetch_result_pages(
        &self,
        key: &DriverKey,
        season: SeasonRef,
    ) -> Result<Vec<RaceResult>, FetchError> {
        let mut races = Vec::new();
        let mut offset = 0u32;

        for _ in 0..self.seasons.max_pages.max(1) {
            let path = endpoints::results(season, key, self.results_page_limit, offset);
            let envelope = self.fetch(&path).await?;
            let page = envelope.races();
            if page.is_empty() {
                break;
            }

            races.extend(page.iter().filter_map(WireRace::to_result));
            offset += page.len() as u32;

            match envelope.total() {
                Some(total) if offset < total => continue,
                _ => break,
            }
        }

        Ok(races)
    }

    /// Results for several seasons, one fetch per distinct season
    async fn fetch_results_for(
        &self,
        key: &DriverKey,
        seasons: &[i32],
    ) -> BTreeMap<i32, SeasonResults> {
        let mut unique = seasons.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let fetches = unique
            .iter()
            .map(|&season| async move { (season, self.fetch_season_results_data(key, season).await) });
        join_all(fetches).await.into_iter().collect()
    }

    /// Summaries for the given seasons, skipping seasons without results
    pub async fn fetch_season_summaries(
        &self,
        key: &DriverKey,
        seasons: &[i32],
    ) -> Vec<SeasonSummaryEntry> {
        let results = self.fetch_results_for(key, seasons).await;
        summaries_from(&results, seasons)
    }

    /// Directory entries from one roster listing
    pub async fn fetch_roster(&self, season: SeasonRef) -> Result<Vec<DirectoryEntry>, FetchError> {
        let envelope = self.fetch(&endpoints::roster(season)).await?;
        Ok(envelope
            .drivers()
            .iter()
            .filter_map(|d| d.to_directory_entry())
            .collect())
    }

    /// Assemble a driver profile
    ///
    /// With `all_seasons` every plausible season is loaded before returning.
    /// Otherwise only the newest seasons are loaded and the rest are handed
    /// back in [`ProfileAssembly::deferred`].
    ///
    /// # Errors
    ///
    /// - `ProfileError::MissingKey` for an empty key
    /// - `ProfileError::FetchFailed` if the record or season list fetch fails
    /// - `ProfileError::DriverNotFound` if no record comes back
    pub async fn assemble_profile(
        &self,
        key: &DriverKey,
        all_seasons: bool,
    ) -> Result<ProfileAssembly, ProfileError> {
        if key.is_empty() {
            return Err(ProfileError::MissingKey);
        }

        info!(key = %key, all_seasons = all_seasons, "Fetching driver data");

        let (record, years) =
            futures::try_join!(self.fetch_driver(key), self.fetch_season_list(key)).map_err(
                |source| ProfileError::FetchFailed {
                    key: key.to_string(),
                    source,
                },
            )?;

        let record = record.ok_or_else(|| ProfileError::DriverNotFound(key.to_string()))?;

        if years.is_empty() {
            warn!(key = %key, "No seasons found, returning driver info only");
            return Ok(ProfileAssembly {
                profile: DriverProfile::empty(record),
                deferred: Vec::new(),
            });
        }

        let valid = self.plausible_seasons(&years);
        let split = if all_seasons {
            0
        } else {
            valid.len().saturating_sub(self.seasons.initial_seasons)
        };
        let (deferred, foreground) = valid.split_at(split);

        let seasons = self.fetch_season_standings(key, foreground).await;

        let current = seasons.iter().rev().find(|s| !s.incomplete).map(|s| s.season);
        let recent: Vec<i32> = seasons
            .iter()
            .rev()
            .take(self.seasons.summary_seasons)
            .rev()
            .map(|s| s.season)
            .collect();

        let mut wanted = recent.clone();
        wanted.extend(current);

        let snapshot = async {
            match current {
                Some(season) => self.fetch_current_season_snapshot(key, season).await,
                None => None,
            }
        };
        let (current_season, mut results) =
            futures::join!(snapshot, self.fetch_results_for(key, &wanted));

        let season_summaries = summaries_from(&results, &recent);
        let current_results = current
            .and_then(|season| results.remove(&season))
            .unwrap_or_default();

        let profile = DriverProfile {
            driver: record,
            seasons,
            current_season,
            season_summaries,
            season_results: current_results.races,
            season_results_summary: current_results.summary,
            all_seasons_loaded: deferred.is_empty(),
        };

        info!(
            key = %key,
            seasons = profile.seasons.len(),
            deferred = deferred.len(),
            "Driver profile assembled"
        );

        Ok(ProfileAssembly {
            profile,
            deferred: deferred.to_vec(),
        })
    }
}

fn summaries_from(results: &BTreeMap<i32, SeasonResults>, seasons: &[i32]) -> Vec<SeasonSummaryEntry> {
    seasons
        .iter()
        .filter_map(|season| {
            let summary = results.get(season)?.summary.clone()?;
            Some(SeasonSummaryEntry {
                season: *season,
                summary,
            })
        })
        .collect()
}

/// Merge a background batch of standings into an existing sequence
pub fn merge_standings(
    existing: &[SeasonStanding],
    additional: Vec<SeasonStanding>,
) -> Vec<SeasonStanding> {
    let mut merged = existing.to_vec();
    merged.extend(additional);
    normalize_standings(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapSource {
        responses: HashMap<String, Value>,
    }

    #[async_trait]
    impl JsonSource for MapSource {
        async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
            self.responses
                .get(path)
                .cloned()
                .ok_or(FetchError::HttpStatus {
                    status: 404,
                    reason: "Not Found".to_string(),
                })
        }
    }

    fn aggregator(responses: HashMap<String, Value>) -> SeasonAggregator {
        let mut config = Config::default();
        config.api.request_delay_ms = 0;
        config.seasons.retry_step_ms = 0;
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        ));
        SeasonAggregator::new(Arc::new(MapSource { responses }), &config, clock)
    }

    fn standing(position: &str) -> Value {
        json!({ "MRData": { "StandingsTable": { "StandingsLists": [{
            "DriverStandings": [{
                "position": position, "points": "100", "wins": "2",
                "Constructors": [{ "name": "Ferrari" }]
            }]
        }]}}})
    }

    #[test]
    fn test_plausible_seasons() {
        let aggregator = aggregator(HashMap::new());
        assert_eq!(
            aggregator.plausible_seasons(&[2025, 1949, 2003, 2024, 2003]),
            vec![2003, 2024]
        );
    }

    #[tokio::test]
    async fn test_unresolved_position_dropped() {
        let key = DriverKey::new("leclerc");
        let mut responses = HashMap::new();
        responses.insert(
            endpoints::driver_standings(SeasonRef::Year(2010), &key),
            standing("?"),
        );
        responses.insert(
            endpoints::driver_standings(SeasonRef::Year(2011), &key),
            standing("4"),
        );
        let aggregator = aggregator(responses);

        let seasons = aggregator
            .fetch_season_standings(&key, &[2010, 2011, 2012])
            .await;
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].season, 2011);
        assert_eq!(seasons[0].position, 4);
        assert!(!seasons[0].is_constructor_champion);
    }

    #[tokio::test]
    async fn test_constructor_champion_within_window() {
        let key = DriverKey::new("leclerc");
        let mut responses = HashMap::new();
        responses.insert(
            endpoints::driver_standings(SeasonRef::Year(2022), &key),
            standing("2"),
        );
        responses.insert(
            endpoints::constructor_standings(2022),
            json!({ "MRData": { "StandingsTable": { "StandingsLists": [{
                "ConstructorStandings": [{ "position": "1", "Constructor": { "name": "Ferrari" } }]
            }]}}}),
        );
        let aggregator = aggregator(responses);

        let seasons = aggregator.fetch_season_standings(&key, &[2022]).await;
        assert!(seasons[0].is_constructor_champion);
        assert!(!seasons[0].is_champion);
    }

    #[tokio::test]
    async fn test_results_fall_back_to_season_endpoint() {
        let key = DriverKey::new("leclerc");
        let mut responses = HashMap::new();
        responses.insert(
            endpoints::results(SeasonRef::Current, &key, 500, 0),
            json!({ "MRData": { "RaceTable": { "Races": [] } } }),
        );
        responses.insert(
            endpoints::results(SeasonRef::Year(2024), &key, 500, 0),
            json!({ "MRData": { "total": "1", "RaceTable": { "Races": [{
                "raceName": "Monaco Grand Prix",
                "Results": [{ "position": "1", "positionText": "1", "points": "25" }]
            }]}}}),
        );
        let aggregator = aggregator(responses);

        let results = aggregator.fetch_season_results_data(&key, 2024).await;
        assert_eq!(results.races.len(), 1);
        assert_eq!(results.summary.unwrap().wins, 1);

        let empty = aggregator.fetch_season_results_data(&key, 2019).await;
        assert!(empty.races.is_empty());
        assert!(empty.summary.is_none());
    }

    #[tokio::test]
    async fn test_missing_key() {
        let aggregator = aggregator(HashMap::new());
        let err = aggregator
            .assemble_profile(&DriverKey::new(""), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::MissingKey));
    }

    #[test]
    fn test_merge_standings() {
        let make = |season| SeasonStanding {
            season,
            position: 5,
            points: 1.0,
            wins: 0,
            constructors: Vec::new(),
            is_champion: false,
            is_constructor_champion: false,
            incomplete: false,
        };
        let merged = merge_standings(&[make(2020), make(2021)], vec![make(2018), make(2020)]);
        let years: Vec<i32> = merged.iter().map(|s| s.season).collect();
        assert_eq!(years, vec![2018, 2020, 2021]);
    }
}
