use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playout_controller::config::Config;
use playout_controller::error::{ControllerError, Error};

mod commands;

#[derive(Parser)]
#[command(
    name = "playout-controller",
    version,
    about = "Dispatches conference talks to per-room playout workers",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pollers, the dispatch scheduler and the HTTP API
    Serve,

    /// Fetch the schedule once and print the job set as JSON
    Jobs,

    /// Fetch the schedule once and print the upcoming set as JSON
    Upcoming {
        /// Lookahead in seconds, defaults to the configured window
        #[arg(short, long)]
        window: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    let result = run(cli, config).await;
    if let Err(e) = &result {
        match Error::find_in(e) {
            Some(cause) => tracing::error!(
                category = %cause.category(),
                recoverable = cause.is_recoverable(),
                "{:#}",
                e
            ),
            None => tracing::error!("{:#}", e),
        }
    }
    result
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve => {
            tracing::info!(config = %cli.config.display(), "Playout controller starting");
            commands::serve(config).await?;
        }
        Commands::Jobs => {
            commands::print_jobs(&config).await?;
        }
        Commands::Upcoming { window } => {
            commands::print_upcoming(&config, window).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("playout_controller=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("playout_controller={level},warn"))
        })
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
