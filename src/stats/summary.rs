//! Season summaries derived from race results

use crate::models::{RaceResult, SeasonSummary};
use crate::utils::round_one_decimal;

/// Summarize one season's race results
///
/// Returns `None` for an empty season. Wins and podiums count classified
/// positions 1 and 1..=3; the average covers classified races only.
pub fn summarize_season(races: &[RaceResult]) -> Option<SeasonSummary> {
    if races.is_empty() {
        return None;
    }

    let classified: Vec<u32> = races.iter().filter_map(|r| r.position).collect();
    let wins = classified.iter().filter(|&&p| p == 1).count();
    let podiums = classified.iter().filter(|&&p| (1..=3).contains(&p)).count();
    let points = races.iter().map(|r| r.points).sum();
    let avg_finish = if classified.is_empty() {
        None
    } else {
        let total: u32 = classified.iter().sum();
        Some(round_one_decimal(f64::from(total) / classified.len() as f64))
    };

    Some(SeasonSummary {
        races: races.len(),
        wins,
        podiums,
        points,
        avg_finish,
    })
}
