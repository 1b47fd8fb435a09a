mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::WatchParams;

#[derive(Parser)]
#[command(
    name = "tablewatch",
    version,
    about = "Watch OpenTable for a reservation slot and get notified when it opens up",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search restaurants by name
    Search {
        /// Search term
        term: String,

        /// Maximum number of results to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Watch a restaurant until the preferred time is bookable
    Watch {
        /// Numeric restaurant id (see `search`)
        #[arg(short, long)]
        restaurant: String,

        /// Reservation date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Preferred time, 24-hour (HH:MM)
        #[arg(short, long)]
        time: String,

        /// Party size
        #[arg(short, long, default_value = "2")]
        party: u32,

        /// Restaurant name, used to look up details for notifications
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    let log_format = cli
        .log_format
        .as_deref()
        .unwrap_or(config.logging.format.as_str());
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Search { term, limit } => {
            tracing::info!(term = %term, limit, "Starting search command");
            commands::search(&config, term, limit).await?;
        }

        Commands::Watch {
            restaurant,
            date,
            time,
            party,
            name,
        } => {
            tracing::info!(
                restaurant = %restaurant,
                date = %date,
                time = %time,
                party,
                "Starting watch command"
            );
            commands::watch(
                &config,
                WatchParams {
                    restaurant,
                    date,
                    time,
                    party,
                    name,
                },
            )
            .await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tablewatch=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("tablewatch={level},warn"))
        })
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
        "text" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        other => anyhow::bail!("Unknown log format {other:?}, expected text or json"),
    }

    Ok(())
}
