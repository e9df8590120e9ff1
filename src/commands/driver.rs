use anyhow::Result;

use paddock::error::PaddockError;
use paddock::models::DriverProfile;
use paddock::service::FetchService;

pub async fn driver(service: &FetchService, key: String, all_seasons: bool, json: bool) -> Result<()> {
    let profile = service
        .handle_driver_request(&key, all_seasons)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(profile.as_ref())?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

fn print_profile(profile: &DriverProfile) {
    let driver = &profile.driver;
    println!("{}", driver.full_name());
    println!("================================");
    if let Some(code) = &driver.code {
        println!("  Code: {code}");
    }
    if let Some(number) = &driver.permanent_number {
        println!("  Number: {number}");
    }
    if let Some(nationality) = &driver.nationality {
        println!("  Nationality: {nationality}");
    }
    if let Some(born) = &driver.date_of_birth {
        println!("  Born: {born}");
    }
    if let Some((first, last)) = profile.active_span() {
        println!("  Seasons: {first}-{last}");
    }
    println!("  Championships: {}", profile.championships());
    println!("  Wins: {}", profile.total_wins());

    if let Some(current) = &profile.current_season {
        println!();
        println!(
            "{} season: P{} | {} pts | {} wins | {}",
            current.season,
            current.position_text,
            current.points,
            current.wins,
            current.constructors.join(" / ")
        );
    }

    if let Some(summary) = &profile.season_results_summary {
        println!(
            "  {} races, {} podiums, avg finish {}",
            summary.races,
            summary.podiums,
            summary
                .avg_finish
                .map_or("-".to_string(), |avg| format!("{avg:.1}"))
        );
    }

    if !profile.seasons.is_empty() {
        println!();
        println!("Season  Pos  Points  Wins  Team");
        for season in &profile.seasons {
            let marker = match (season.is_champion, season.is_constructor_champion) {
                (true, true) => " **",
                (true, false) => " *",
                (false, true) => " +",
                (false, false) => "",
            };
            println!(
                "{:<7} {:>3}  {:>6}  {:>4}  {}{marker}",
                season.season,
                season.position,
                season.points,
                season.wins,
                season.constructors.join(" / ")
            );
        }
    }

    if !profile.season_summaries.is_empty() {
        println!();
        println!("Recent seasons:");
        for entry in &profile.season_summaries {
            println!(
                "  {}: {} races, {} wins, {} podiums, {} pts",
                entry.season,
                entry.summary.races,
                entry.summary.wins,
                entry.summary.podiums,
                entry.summary.points
            );
        }
    }

    if !profile.all_seasons_loaded {
        println!();
        println!("Older seasons omitted; rerun with --all-seasons for the full history.");
    }
}
