use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

mod handlers;
mod routes;
mod state;

use common::bootstrap;
use common::config::Settings;
use common::scheduler::NotificationScheduler;
use common::service::TimerService;
use common::telemetry;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Settings::load().context("Failed to load configuration")?;

    telemetry::init_logging(
        &config.observability.log_level,
        config.observability.tracing_endpoint.as_deref(),
    )?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        store = ?config.store.backend,
        embedded_scheduler = config.scheduler.embedded,
        "Starting API server"
    );

    let metrics_handle = telemetry::install_metrics_recorder()?;

    let store = bootstrap::init_timer_store(&config).await?;
    let ocr = bootstrap::init_ocr_provider(&config)?;
    let service = TimerService::new(store.clone(), ocr, bootstrap::init_extractor(&config));

    // Run the notification scheduler in-process when configured
    let scheduler = if config.scheduler.embedded {
        let channels = bootstrap::init_notification_channels(&config)?;
        let scheduler = Arc::new(NotificationScheduler::new(
            config.scheduler.clone(),
            store.clone(),
            channels,
        ));
        let runner = scheduler.clone();
        let handle = tokio::spawn(async move { runner.start().await });
        Some((scheduler, handle))
    } else {
        None
    };

    let state = AppState::new(service, metrics_handle, config.clone());
    let app = routes::create_router(state);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .context("Invalid server host")?,
        config.server.port,
    ));
    tracing::info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some((scheduler, handle)) = scheduler {
        scheduler.stop();
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Scheduler task ended abnormally");
        }
    }

    telemetry::shutdown_tracer();
    tracing::info!("API server stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Initiating graceful shutdown");
}
