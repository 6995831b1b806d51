// Scheduler binary entry point
// Runs the notification scheduler on its own, next to an api started with
// scheduler.embedded = false

use anyhow::{Context, Result};
use common::bootstrap;
use common::config::{Settings, StoreBackend};
use common::scheduler::NotificationScheduler;
use common::telemetry;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;

    telemetry::init_logging(
        &settings.observability.log_level,
        settings.observability.tracing_endpoint.as_deref(),
    )?;

    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    info!(
        poll_interval_seconds = settings.scheduler.poll_interval_seconds,
        "Starting builder timer scheduler"
    );

    if settings.store.backend == StoreBackend::Memory {
        warn!("In-memory store is private to this process; the api will not see its timers");
    }

    telemetry::init_metrics(settings.observability.metrics_port)?;

    let store = bootstrap::init_timer_store(&settings).await?;
    let channels = bootstrap::init_notification_channels(&settings)?;

    let scheduler = Arc::new(NotificationScheduler::new(
        settings.scheduler.clone(),
        store,
        channels,
    ));

    let scheduler_for_shutdown = scheduler.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C signal, initiating graceful shutdown");
                scheduler_for_shutdown.stop();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    scheduler.start().await;

    telemetry::shutdown_tracer();
    info!("Scheduler stopped");
    Ok(())
}
