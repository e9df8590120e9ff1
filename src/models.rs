// Core data structures for paddock

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable upstream identifier of a driver (Ergast `driverId`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverKey(String);

impl DriverKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DriverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DriverKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Biographical attributes of a driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    pub driver_id: DriverKey,
    pub given_name: String,
    pub family_name: String,
    pub nationality: Option<String>,
    pub date_of_birth: Option<String>,
    pub code: Option<String>,
    pub permanent_number: Option<String>,
    pub url: Option<String>,
}

impl DriverRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// A driver's final (or latest) championship standing for one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStanding {
    pub season: i32,
    pub position: u32,
    pub points: f64,
    pub wins: u32,
    /// In the order the upstream lists them; several after a mid-season move
    pub constructors: Vec<String>,
    pub is_champion: bool,
    pub is_constructor_champion: bool,
    /// Set when points or wins could not be read from the standing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub incomplete: bool,
}

/// Live championship position for the profile's current season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSnapshot {
    pub season: i32,
    pub position: Option<u32>,
    pub position_text: String,
    pub points: f64,
    pub wins: u32,
    pub constructors: Vec<String>,
}

/// One race result for one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub race_name: String,
    pub circuit: Option<String>,
    pub date: Option<String>,
    /// Classified finishing position
    pub position: Option<u32>,
    /// Display text ("1", "R", "D", ...)
    pub position_text: String,
    pub points: f64,
    pub status: Option<String>,
    pub grid: Option<u32>,
    pub laps: Option<u32>,
}

/// Aggregate over one season's race results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub races: usize,
    pub wins: usize,
    pub podiums: usize,
    pub points: f64,
    /// Mean classified position, one decimal; `None` when no race was classified
    pub avg_finish: Option<f64>,
}

/// Summary tagged with its season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummaryEntry {
    pub season: i32,
    #[serde(flatten)]
    pub summary: SeasonSummary,
}

/// Race results for one season plus their summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonResults {
    pub races: Vec<RaceResult>,
    pub summary: Option<SeasonSummary>,
}

/// Everything the popup needs for one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    pub driver: DriverRecord,
    /// Ascending by season, no duplicate seasons
    pub seasons: Vec<SeasonStanding>,
    pub current_season: Option<SeasonSnapshot>,
    pub season_summaries: Vec<SeasonSummaryEntry>,
    pub season_results: Vec<RaceResult>,
    pub season_results_summary: Option<SeasonSummary>,
    pub all_seasons_loaded: bool,
}

impl DriverProfile {
    /// Profile with empty collections
    pub fn empty(driver: DriverRecord) -> Self {
        Self {
            driver,
            seasons: Vec::new(),
            current_season: None,
            season_summaries: Vec::new(),
            season_results: Vec::new(),
            season_results_summary: None,
            all_seasons_loaded: true,
        }
    }

    /// Drivers' championships among the loaded seasons
    pub fn championships(&self) -> usize {
        self.seasons.iter().filter(|s| s.is_champion).count()
    }

    /// Race wins among the loaded seasons
    pub fn total_wins(&self) -> u32 {
        self.seasons.iter().map(|s| s.wins).sum()
    }

    /// First and last loaded season
    pub fn active_span(&self) -> Option<(i32, i32)> {
        match (self.seasons.first(), self.seasons.last()) {
            (Some(first), Some(last)) => Some((first.season, last.season)),
            _ => None,
        }
    }
}

/// One driver in the roster-wide directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub key: DriverKey,
    pub code: Option<String>,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, key: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            name: name.into(),
            key: DriverKey::new(key),
            code: code.map(str::to_string),
        }
    }
}

/// Sort standings ascending and keep the first entry per season
pub fn normalize_standings(mut seasons: Vec<SeasonStanding>) -> Vec<SeasonStanding> {
    seasons.sort_by_key(|s| s.season);
    seasons.dedup_by_key(|s| s.season);
    seasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str) -> DriverRecord {
        DriverRecord {
            driver_id: DriverKey::new(key),
            given_name: "Fernando".to_string(),
            family_name: "Alonso".to_string(),
            nationality: Some("Spanish".to_string()),
            date_of_birth: Some("1981-07-29".to_string()),
            code: Some("ALO".to_string()),
            permanent_number: Some("14".to_string()),
            url: None,
        }
    }

    fn standing(season: i32, position: u32, wins: u32) -> SeasonStanding {
        SeasonStanding {
            season,
            position,
            points: 10.0,
            wins,
            constructors: vec!["Renault".to_string()],
            is_champion: position == 1,
            is_constructor_champion: false,
            incomplete: false,
        }
    }

    #[test]
    fn test_empty_profile_has_defined_collections() {
        let profile = DriverProfile::empty(record("alonso"));
        assert!(profile.seasons.is_empty());
        assert!(profile.season_summaries.is_empty());
        assert!(profile.season_results.is_empty());
        assert_eq!(profile.championships(), 0);
        assert_eq!(profile.active_span(), None);

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json["seasons"].is_array());
        assert!(json["seasonResults"].is_array());
    }

    #[test]
    fn test_career_figures() {
        let mut profile = DriverProfile::empty(record("alonso"));
        profile.seasons = vec![standing(2005, 1, 7), standing(2006, 1, 7), standing(2007, 3, 4)];

        assert_eq!(profile.championships(), 2);
        assert_eq!(profile.total_wins(), 18);
        assert_eq!(profile.active_span(), Some((2005, 2007)));
    }

    #[test]
    fn test_normalize_standings() {
        let seasons = normalize_standings(vec![
            standing(2007, 3, 4),
            standing(2005, 1, 7),
            standing(2007, 2, 0),
        ]);
        let years: Vec<i32> = seasons.iter().map(|s| s.season).collect();
        assert_eq!(years, vec![2005, 2007]);
        assert_eq!(seasons[1].position, 3);
    }

    #[test]
    fn test_driver_key_display() {
        let key = DriverKey::from("max_verstappen");
        assert_eq!(key.to_string(), "max_verstappen");
        assert!(!key.is_empty());
        assert!(DriverKey::new("  ").is_empty());
    }
}
