use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paddock::config::{Config, Profile};
use paddock::service::FetchService;

mod commands;

#[derive(Parser)]
#[command(
    name = "paddock",
    version,
    about = "Formula 1 driver annotation and statistics from the Ergast API",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (defaults to PADDOCK_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tuning profile (fast, patient)
    #[arg(short, long, global = true)]
    profile: Option<Profile>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print one driver's profile
    Driver {
        /// Ergast driver id, e.g. "alonso" or "max_verstappen"
        key: String,

        /// Load every season before returning
        #[arg(long, default_value = "false")]
        all_seasons: bool,

        /// Print JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Fetch and print the drivers directory
    Roster {
        /// Print JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Annotate driver names in an HTML file
    Annotate {
        /// Input HTML file
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat the input as a fragment rather than a full document
        #[arg(long, default_value = "false")]
        fragment: bool,
    },

    /// Serve the JSON API
    Serve {
        /// Bind address, e.g. 127.0.0.1:8787
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.profile)?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(config.logging.format.as_str());
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;
    tracing::debug!(
        mirror = %config.api.mirror_url,
        request_delay_ms = config.api.request_delay_ms,
        profile_ttl_secs = config.cache.profile_ttl_secs,
        "Configuration loaded"
    );

    let server_config = config.server.clone();
    let service = FetchService::new(config).context("Failed to create fetch service")?;

    match cli.command {
        Commands::Driver {
            key,
            all_seasons,
            json,
        } => {
            tracing::info!(key = %key, all_seasons = %all_seasons, "Starting driver command");
            commands::driver(&service, key, all_seasons, json).await?;
        }

        Commands::Roster { json } => {
            tracing::info!("Starting roster command");
            commands::roster(&service, json).await?;
        }

        Commands::Annotate {
            input,
            output,
            fragment,
        } => {
            tracing::info!(input = %input.display(), output = ?output, "Starting annotate command");
            commands::annotate(&service, input, output, fragment).await?;
        }

        Commands::Serve { bind } => {
            tracing::info!(bind = ?bind, "Starting serve command");
            commands::serve(service, server_config, bind).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, profile: Option<Profile>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env().context("Failed to load configuration from environment")?,
    };

    if let Some(profile) = profile {
        config.apply_profile(profile);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("paddock=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("paddock={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
