//! Ergast response envelope
//!
//! Every response is wrapped in an `MRData` object holding one typed table.
//! Fields are read leniently: numbers may arrive as strings or as JSON
//! numbers, and any missing table or record simply reads as empty.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{DirectoryEntry, DriverKey, DriverRecord, RaceResult, SeasonSnapshot};
use crate::utils::error::FetchError;
use crate::utils::parse_number;

/// Root envelope
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(rename = "MRData", default)]
    pub data: MrData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MrData {
    #[serde(deserialize_with = "lenient_string")]
    pub limit: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub offset: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub total: Option<String>,
    #[serde(rename = "DriverTable")]
    pub driver_table: Option<DriverTable>,
    #[serde(rename = "SeasonTable")]
    pub season_table: Option<SeasonTable>,
    #[serde(rename = "StandingsTable")]
    pub standings_table: Option<StandingsTable>,
    #[serde(rename = "RaceTable")]
    pub race_table: Option<RaceTable>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverTable {
    #[serde(rename = "Drivers", default)]
    pub drivers: Vec<WireDriver>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireDriver {
    pub driver_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub permanent_number: Option<String>,
    pub code: Option<String>,
    pub url: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeasonTable {
    #[serde(rename = "Seasons", default)]
    pub seasons: Vec<WireSeason>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireSeason {
    #[serde(deserialize_with = "lenient_string")]
    pub season: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StandingsTable {
    #[serde(rename = "StandingsLists", default)]
    pub lists: Vec<StandingsList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StandingsList {
    #[serde(deserialize_with = "lenient_string")]
    pub season: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub round: Option<String>,
    #[serde(rename = "DriverStandings")]
    pub driver_standings: Vec<WireDriverStanding>,
    #[serde(rename = "ConstructorStandings")]
    pub constructor_standings: Vec<WireConstructorStanding>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireDriverStanding {
    #[serde(deserialize_with = "lenient_string")]
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub position_text: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub points: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub wins: Option<String>,
    #[serde(rename = "Constructors")]
    pub constructors: Vec<WireConstructor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireConstructor {
    pub constructor_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireConstructorStanding {
    #[serde(deserialize_with = "lenient_string")]
    pub position: Option<String>,
    #[serde(rename = "Constructor")]
    pub constructor: Option<WireConstructor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RaceTable {
    #[serde(rename = "Races", default)]
    pub races: Vec<WireRace>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireRace {
    #[serde(deserialize_with = "lenient_string")]
    pub season: Option<String>,
    pub race_name: String,
    pub date: Option<String>,
    #[serde(rename = "Circuit")]
    pub circuit: Option<WireCircuit>,
    #[serde(rename = "Results")]
    pub results: Vec<WireResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireCircuit {
    pub circuit_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireResult {
    #[serde(deserialize_with = "lenient_string")]
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub position_text: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub points: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub grid: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub laps: Option<String>,
}

/// Accept `"12"`, `12` or `null`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl Envelope {
    /// Decode a fetched JSON document
    pub fn parse(value: Value) -> Result<Self, FetchError> {
        serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
    }

    pub fn drivers(&self) -> &[WireDriver] {
        self.data
            .driver_table
            .as_ref()
            .map(|t| t.drivers.as_slice())
            .unwrap_or(&[])
    }

    /// Season years, skipping anything that is not a number
    pub fn season_years(&self) -> Vec<i32> {
        self.data
            .season_table
            .as_ref()
            .map(|t| {
                t.seasons
                    .iter()
                    .filter_map(|s| parse_number(s.season.as_deref()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First standings list, if any
    pub fn standings(&self) -> Option<&StandingsList> {
        self.data.standings_table.as_ref()?.lists.first()
    }

    /// Leading driver standing in the first list
    pub fn first_driver_standing(&self) -> Option<&WireDriverStanding> {
        self.standings()?.driver_standings.first()
    }

    /// Name of the constructor at the top of the first list
    pub fn champion_constructor(&self) -> Option<&str> {
        self.standings()?
            .constructor_standings
            .first()?
            .constructor
            .as_ref()
            .map(|c| c.name.as_str())
    }

    pub fn races(&self) -> &[WireRace] {
        self.data
            .race_table
            .as_ref()
            .map(|t| t.races.as_slice())
            .unwrap_or(&[])
    }

    pub fn total(&self) -> Option<u32> {
        parse_number(self.data.total.as_deref())
    }
}

impl WireDriver {
    pub fn to_record(&self) -> DriverRecord {
        DriverRecord {
            driver_id: DriverKey::new(self.driver_id.clone()),
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
            nationality: self.nationality.clone(),
            date_of_birth: self.date_of_birth.clone(),
            code: self.code.clone(),
            permanent_number: self.permanent_number.clone(),
            url: self.url.clone(),
        }
    }

    /// Directory entry named "Given Family"; `None` without a driver id
    pub fn to_directory_entry(&self) -> Option<DirectoryEntry> {
        if self.driver_id.trim().is_empty() {
            return None;
        }
        let name = format!("{} {}", self.given_name, self.family_name);
        Some(DirectoryEntry {
            name: name.trim().to_string(),
            key: DriverKey::new(self.driver_id.clone()),
            code: self.code.clone().filter(|c| !c.is_empty()),
        })
    }
}

impl WireDriverStanding {
    /// Numeric position; `None` for missing or placeholder values such as `"?"`
    pub fn resolved_position(&self) -> Option<u32> {
        parse_number(self.position.as_deref())
    }

    pub fn constructor_names(&self) -> Vec<String> {
        self.constructors.iter().map(|c| c.name.clone()).collect()
    }

    pub fn to_snapshot(&self, season: i32) -> SeasonSnapshot {
        SeasonSnapshot {
            season,
            position: self.resolved_position(),
            position_text: self
                .position_text
                .clone()
                .or_else(|| self.position.clone())
                .unwrap_or_else(|| "-".to_string()),
            points: parse_number(self.points.as_deref()).unwrap_or(0.0),
            wins: parse_number(self.wins.as_deref()).unwrap_or(0),
            constructors: self.constructor_names(),
        }
    }
}

impl WireRace {
    /// The driver's result for this race; `None` if the race lists no result
    pub fn to_result(&self) -> Option<RaceResult> {
        let result = self.results.first()?;
        Some(RaceResult {
            race_name: self.race_name.clone(),
            circuit: self.circuit.as_ref().and_then(|c| c.circuit_name.clone()),
            date: self.date.clone(),
            position: parse_number(result.position.as_deref()),
            position_text: result
                .position_text
                .clone()
                .or_else(|| result.position.clone())
                .unwrap_or_else(|| "-".to_string()),
            points: parse_number(result.points.as_deref()).unwrap_or(0.0),
            status: result.status.clone(),
            grid: parse_number(result.grid.as_deref()),
            laps: parse_number(result.laps.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_driver_table() {
        let envelope = Envelope::parse(json!({
            "MRData": {
                "DriverTable": {
                    "Drivers": [{
                        "driverId": "alonso",
                        "permanentNumber": "14",
                        "code": "ALO",
                        "givenName": "Fernando",
                        "familyName": "Alonso",
                        "dateOfBirth": "1981-07-29",
                        "nationality": "Spanish"
                    }]
                }
            }
        }))
        .unwrap();

        let record = envelope.drivers()[0].to_record();
        assert_eq!(record.driver_id.as_str(), "alonso");
        assert_eq!(record.full_name(), "Fernando Alonso");
        assert_eq!(record.code.as_deref(), Some("ALO"));
    }

    #[test]
    fn test_missing_tables_read_as_empty() {
        let envelope = Envelope::parse(json!({ "MRData": {} })).unwrap();
        assert!(envelope.drivers().is_empty());
        assert!(envelope.season_years().is_empty());
        assert!(envelope.first_driver_standing().is_none());
        assert!(envelope.races().is_empty());

        let envelope = Envelope::parse(json!({})).unwrap();
        assert!(envelope.drivers().is_empty());
    }

    #[test]
    fn test_numbers_accepted_as_numbers() {
        let envelope = Envelope::parse(json!({
            "MRData": {
                "total": 3,
                "SeasonTable": { "Seasons": [{ "season": 2003 }, { "season": "2004" }, { "season": "x" }] }
            }
        }))
        .unwrap();

        assert_eq!(envelope.total(), Some(3));
        assert_eq!(envelope.season_years(), vec![2003, 2004]);
    }

    #[test]
    fn test_placeholder_position_unresolved() {
        let standing = WireDriverStanding {
            position: Some("?".to_string()),
            ..Default::default()
        };
        assert_eq!(standing.resolved_position(), None);

        let standing = WireDriverStanding {
            position: Some("3".to_string()),
            ..Default::default()
        };
        assert_eq!(standing.resolved_position(), Some(3));
    }

    #[test]
    fn test_race_result_conversion() {
        let envelope = Envelope::parse(json!({
            "MRData": {
                "RaceTable": {
                    "Races": [
                        {
                            "raceName": "Bahrain Grand Prix",
                            "date": "2024-03-02",
                            "Circuit": { "circuitName": "Bahrain International Circuit" },
                            "Results": [{
                                "position": "9", "positionText": "9", "points": "2",
                                "status": "Finished", "grid": "6", "laps": "57"
                            }]
                        },
                        { "raceName": "Empty", "Results": [] }
                    ]
                }
            }
        }))
        .unwrap();

        let results: Vec<_> = envelope.races().iter().filter_map(WireRace::to_result).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, Some(9));
        assert_eq!(results[0].points, 2.0);
        assert_eq!(results[0].grid, Some(6));
        assert_eq!(
            results[0].circuit.as_deref(),
            Some("Bahrain International Circuit")
        );
    }

    #[test]
    fn test_directory_entry_naming() {
        let driver = WireDriver {
            driver_id: "max_verstappen".to_string(),
            given_name: "Max".to_string(),
            family_name: "Verstappen".to_string(),
            code: Some("VER".to_string()),
            ..Default::default()
        };
        let entry = driver.to_directory_entry().unwrap();
        assert_eq!(entry.name, "Max Verstappen");
        assert_eq!(entry.key.as_str(), "max_verstappen");

        assert!(WireDriver::default().to_directory_entry().is_none());
    }
}
