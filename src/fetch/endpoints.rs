//! Ergast API paths
//!
//! All paths are relative to a base URL so the gateway can swap the mirror
//! for the origin without string surgery on full URLs.

use url::form_urlencoded::byte_serialize;

use crate::models::DriverKey;

/// Season selector in a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonRef {
    /// The upstream's `current` alias
    Current,
    Year(i32),
}

impl SeasonRef {
    fn segment(self) -> String {
        match self {
            Self::Current => "current".to_string(),
            Self::Year(year) => year.to_string(),
        }
    }
}

fn key_segment(key: &DriverKey) -> String {
    byte_serialize(key.as_str().as_bytes()).collect()
}

/// Driver lookup by key
pub fn driver(key: &DriverKey) -> String {
    format!("/drivers/{}/", key_segment(key))
}

/// Seasons a driver took part in
pub fn driver_seasons(key: &DriverKey) -> String {
    format!("/drivers/{}/seasons/", key_segment(key))
}

/// A driver's standing in one season
pub fn driver_standings(season: SeasonRef, key: &DriverKey) -> String {
    format!(
        "/{}/drivers/{}/driverstandings/",
        season.segment(),
        key_segment(key)
    )
}

/// Constructors' championship for one season
pub fn constructor_standings(season: i32) -> String {
    format!("/{season}/constructorstandings/")
}

/// One page of a driver's race results in one season
pub fn results(season: SeasonRef, key: &DriverKey, limit: u32, offset: u32) -> String {
    let mut path = format!(
        "/{}/drivers/{}/results.json?limit={limit}",
        season.segment(),
        key_segment(key)
    );
    if offset > 0 {
        path.push_str(&format!("&offset={offset}"));
    }
    path
}

/// Driver roster for a season
pub fn roster(season: SeasonRef) -> String {
    format!("/{}/drivers.json", season.segment())
}

/// Join a base URL and a relative path without doubling the slash
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
