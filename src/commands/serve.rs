use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;

use playout_controller::api::{ApiServer, AppState};
use playout_controller::config::Config;
use playout_controller::dispatch::{DispatchScheduler, WorkerPool};
use playout_controller::error::Error;
use playout_controller::lookup::TalkSources;
use playout_controller::poller::{SchedulePoller, UpcomingPoller};
use playout_controller::pubsub::Hub;
use playout_controller::schedule::ScheduleFetcher;
use playout_controller::store::Store;

/// Run the full pipeline until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    let sources = TalkSources::from_files(
        &config.schedule.talk_studio_file,
        &config.schedule.studio_ingest_file,
    )
    .await
    .context("Failed to load talk sources")?;

    let workers = WorkerPool::connect(&config.workers, config.request_timeout())
        .await
        .map_err(Error::from)
        .context("Failed to connect playout workers")?;
    if !workers.has_default() {
        tracing::warn!("No default worker configured, jobs in unmapped rooms will not be dispatched");
    }

    let fetcher = ScheduleFetcher::new(&config.schedule.url).map_err(Error::from)?;

    let hub = Arc::new(Hub::new());
    let store = Arc::new(Store::new(workers));
    let dispatcher = Arc::new(DispatchScheduler::new(
        config.dispatch_config(),
        Arc::clone(&store),
        Arc::clone(&hub),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // consumers subscribe before the producers publish anything
    let store_task = store.spawn_sync(&hub, shutdown_rx.clone());
    let dispatch_task = dispatcher.spawn(shutdown_rx.clone());
    let upcoming_task = UpcomingPoller::new(
        Arc::clone(&hub),
        config.upcoming_window(),
        config.upcoming_poll_interval(),
    )
    .spawn(shutdown_rx.clone());
    let schedule_task = SchedulePoller::new(
        Arc::new(fetcher),
        Arc::new(sources.into_map()),
        config.refresh_interval(),
        Arc::clone(&hub),
    )
    .spawn(shutdown_rx);

    let server = ApiServer::new(config.server.clone(), AppState::new(store, dispatcher));
    let result = server
        .start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
            }
            tracing::info!("Shutdown requested");
        })
        .await;

    let _ = shutdown_tx.send(true);
    for (name, task) in [
        ("schedule poller", schedule_task),
        ("upcoming poller", upcoming_task),
        ("dispatch scheduler", dispatch_task),
        ("store sync", store_task),
    ] {
        if let Err(e) = task.await {
            tracing::error!(task = name, error = %e, "Task ended abnormally");
        }
    }

    result.context("API server failed")?;
    tracing::info!("Playout controller stopped");
    Ok(())
}
