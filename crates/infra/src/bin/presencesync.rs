//! PresenceSync daemon
//!
//! Loads configuration, runs one immediate sync of every connected user, then
//! keeps syncing on the configured polling interval until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use presencesync_core::AvailabilityService;
use presencesync_infra::config;
use presencesync_infra::database::{DbManager, SqliteUserDirectory};
use presencesync_infra::integrations::chat::ChatApiClient;
use presencesync_infra::integrations::graph::GraphScheduleClient;
use presencesync_infra::logging;
use presencesync_infra::scheduling::{StatusScheduler, StatusSchedulerConfig};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load().context("failed to load configuration")?;
    logging::init(&config.logging);

    info!(
        polling_interval_minutes = config.sync.polling_interval_minutes,
        probe_window_minutes = config.sync.probe_window_minutes,
        lead_time_minutes = config.sync.lead_time_minutes,
        "starting presencesync"
    );

    let db = Arc::new(
        DbManager::new(&config.database.path, config.database.pool_size)
            .context("failed to open user directory")?,
    );
    db.run_migrations().context("failed to prepare user directory schema")?;

    let directory = Arc::new(SqliteUserDirectory::new(Arc::clone(&db)));
    let calendar = Arc::new(GraphScheduleClient::new(&config.graph)?);
    let chat = Arc::new(ChatApiClient::new(&config.chat, &config.sync.bot_user_id)?);

    let service = Arc::new(AvailabilityService::new(
        config.sync.clone(),
        directory,
        calendar,
        chat.clone(),
        chat,
    ));

    let scheduler_config = StatusSchedulerConfig::from_sync_config(&config.sync)?;
    let mut scheduler = StatusScheduler::new(scheduler_config, service);

    match scheduler.run_once().await {
        Ok(report) => info!(summary = %report.summary, "initial sync complete"),
        Err(err) => warn!(error = %err, "initial sync failed; continuing with schedule"),
    }

    scheduler.start().await?;
    info!("presencesync running. Press Ctrl+C to stop.");

    signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("shutdown signal received, stopping");

    scheduler.stop().await?;
    info!("presencesync stopped");
    Ok(())
}
