//! Common test utilities
//!
//! An in-memory `JsonSource` serving canned Ergast payloads by path, plus
//! builders for the payload shapes the aggregator reads.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use paddock::config::Config;
use paddock::fetch::JsonSource;
use paddock::utils::clock::ManualClock;
use paddock::utils::error::FetchError;

/// Canned responses keyed by API path; unknown paths answer 404
#[derive(Default)]
pub struct StaticSource {
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, usize>>,
    requests: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, path: impl Into<String>, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.into(), body);
    }

    /// Answer the next `times` requests for `path` with a 503
    pub fn fail_next(&self, path: impl Into<String>, times: usize) {
        self.failures.lock().unwrap().insert(path.into(), times);
    }

    /// Total requests seen so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// How many times `path` was requested
    pub fn requests_for(&self, path: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl JsonSource for StaticSource {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(path.to_string());

        if let Some(remaining) = self.failures.lock().unwrap().get_mut(path) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FetchError::HttpStatus {
                    status: 503,
                    reason: "Service Unavailable".to_string(),
                });
            }
        }

        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or(FetchError::HttpStatus {
                status: 404,
                reason: "Not Found".to_string(),
            })
    }
}

/// Clock pinned to mid-2024
pub fn clock_2024() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ))
}

/// Default config with every delay zeroed
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.api.request_delay_ms = 0;
    config.seasons.retry_step_ms = 0;
    config
}

pub fn driver_json(id: &str, given: &str, family: &str, code: &str) -> Value {
    json!({ "MRData": { "DriverTable": { "Drivers": [{
        "driverId": id,
        "code": code,
        "givenName": given,
        "familyName": family,
        "nationality": "Spanish",
        "dateOfBirth": "1981-07-29"
    }]}}})
}

pub fn no_driver_json() -> Value {
    json!({ "MRData": { "DriverTable": { "Drivers": [] } } })
}

pub fn seasons_json(years: impl IntoIterator<Item = i32>) -> Value {
    let seasons: Vec<Value> = years
        .into_iter()
        .map(|y| json!({ "season": y.to_string() }))
        .collect();
    json!({ "MRData": { "SeasonTable": { "Seasons": seasons } } })
}

pub fn standing_json(position: &str, points: &str, wins: &str, team: &str) -> Value {
    json!({ "MRData": { "StandingsTable": { "StandingsLists": [{
        "DriverStandings": [{
            "position": position,
            "positionText": position,
            "points": points,
            "wins": wins,
            "Constructors": [{ "constructorId": team.to_lowercase(), "name": team }]
        }]
    }]}}})
}

pub fn constructor_champion_json(team: &str) -> Value {
    json!({ "MRData": { "StandingsTable": { "StandingsLists": [{
        "ConstructorStandings": [{ "position": "1", "Constructor": { "name": team } }]
    }]}}})
}

/// One race per `(name, position, points)`
pub fn results_json(races: &[(&str, &str, &str)]) -> Value {
    results_page_json(races, races.len())
}

/// One page of a result listing that holds `total` races overall
pub fn results_page_json(races: &[(&str, &str, &str)], total: usize) -> Value {
    let races: Vec<Value> = races
        .iter()
        .map(|(name, position, points)| {
            json!({
                "raceName": name,
                "date": "2024-03-02",
                "Circuit": { "circuitName": format!("{name} Circuit") },
                "Results": [{
                    "position": position,
                    "positionText": position,
                    "points": points,
                    "status": "Finished",
                    "grid": "3",
                    "laps": "57"
                }]
            })
        })
        .collect();
    json!({ "MRData": { "total": total.to_string(), "RaceTable": { "Races": races } } })
}

/// One roster listing from `(driverId, given, family, code)`
pub fn roster_json(drivers: &[(&str, &str, &str, &str)]) -> Value {
    let drivers: Vec<Value> = drivers
        .iter()
        .map(|(id, given, family, code)| {
            json!({ "driverId": id, "givenName": given, "familyName": family, "code": code })
        })
        .collect();
    json!({ "MRData": { "DriverTable": { "Drivers": drivers } } })
}
