use anyhow::Result;

use paddock::service::FetchService;

pub async fn roster(service: &FetchService, json: bool) -> Result<()> {
    let directory = service.get_directory().await;

    if json {
        println!("{}", serde_json::to_string_pretty(directory.as_ref())?);
        return Ok(());
    }

    println!("Drivers ({})", directory.len());
    println!("================================");
    for entry in directory.iter() {
        println!(
            "  {:<4} {:<28} {}",
            entry.code.as_deref().unwrap_or("-"),
            entry.name,
            entry.key
        );
    }
    Ok(())
}
