use anyhow::{Context, Result};
use std::net::SocketAddr;

use paddock::config::ServerConfig;
use paddock::server::PaddockServer;
use paddock::service::FetchService;

pub async fn serve(service: FetchService, mut config: ServerConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.bind_address = bind
            .parse::<SocketAddr>()
            .context("Invalid bind address")?;
    }
    let bind_address = config.bind_address;

    println!("Starting paddock server");
    println!("=======================");
    println!(
        "  CORS: {}",
        if config.enable_cors { "enabled" } else { "disabled" }
    );
    println!(
        "  Request Logging: {}",
        if config.enable_request_logging {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("API Endpoints:");
    println!("  GET  /api/health         - Health check and cache stats");
    println!("  GET  /api/drivers        - Drivers directory");
    println!("  GET  /api/drivers/{{key}}  - Driver profile (?all_seasons=true)");
    println!("  POST /api/annotate       - Annotate HTML");
    println!();
    println!("Listening on http://{bind_address}");
    println!("Press Ctrl+C to stop.\n");

    let server = PaddockServer::new(config, service.clone());
    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                }
                Err(e) => {
                    tracing::error!("Failed to wait for Ctrl+C: {}", e);
                }
            }
        })
        .await?;

    service.drain_background().await;
    println!("Server stopped.");
    Ok(())
}
