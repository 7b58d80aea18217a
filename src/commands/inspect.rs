use anyhow::{Context, Result};

use playout_controller::config::Config;
use playout_controller::error::Error;
use playout_controller::jobs::{build_jobs, upcoming};
use playout_controller::lookup::TalkSources;
use playout_controller::models::JobSet;
use playout_controller::schedule::{ScheduleFetcher, ScheduleSource};

async fn fetch_jobs(config: &Config) -> Result<JobSet> {
    let sources = TalkSources::from_files(
        &config.schedule.talk_studio_file,
        &config.schedule.studio_ingest_file,
    )
    .await
    .context("Failed to load talk sources")?;

    let fetcher = ScheduleFetcher::new(&config.schedule.url).map_err(Error::from)?;
    let document = fetcher
        .fetch()
        .await
        .map_err(Error::from)
        .context("Failed to fetch schedule")?;
    tracing::info!(version = document.version(), "Fetched schedule");

    Ok(build_jobs(&document, &sources.into_map()))
}

/// Print the full job set
pub async fn print_jobs(config: &Config) -> Result<()> {
    let jobs = fetch_jobs(config).await?;
    println!("{}", serde_json::to_string_pretty(&jobs).map_err(Error::from)?);
    Ok(())
}

/// Print the jobs inside the upcoming window
pub async fn print_upcoming(config: &Config, window_secs: Option<u64>) -> Result<()> {
    let window = match window_secs {
        Some(secs) => chrono::Duration::try_seconds(secs as i64).context("Window out of range")?,
        None => config.upcoming_window(),
    };

    let jobs = fetch_jobs(config).await?;
    let upcoming = upcoming(&jobs, window);
    println!("{}", serde_json::to_string_pretty(&upcoming).map_err(Error::from)?);
    Ok(())
}
