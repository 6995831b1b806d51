// Bootstrap utilities for binary initialization
// Shared by the api and scheduler main.rs files

use crate::config::{Settings, StoreBackend};
use crate::db::DbPool;
use crate::notify::{LogChannel, NotificationChannel, TelegramChannel, WebhookChannel};
use crate::ocr::{OcrProvider, TimerExtractor, VisionOcrProvider};
use crate::store::{InMemoryTimerStore, PgTimerStore, TimerStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Initialize database pool, applying migrations when configured
///
/// # Errors
/// Returns error if the pool cannot connect or a migration fails
#[tracing::instrument(skip(settings))]
pub async fn init_database_pool(settings: &Settings) -> Result<DbPool> {
    info!("Initializing database pool");

    let db_pool = DbPool::new(&settings.database)
        .await
        .context("Failed to initialize database pool")?;

    if settings.database.run_migrations {
        db_pool
            .run_migrations()
            .await
            .context("Failed to run database migrations")?;
    }

    info!("Database pool initialized");
    Ok(db_pool)
}

/// Build the configured timer store backend
#[tracing::instrument(skip(settings), fields(backend = ?settings.store.backend))]
pub async fn init_timer_store(settings: &Settings) -> Result<Arc<dyn TimerStore>> {
    let store: Arc<dyn TimerStore> = match settings.store.backend {
        StoreBackend::Postgres => Arc::new(PgTimerStore::new(init_database_pool(settings).await?)),
        StoreBackend::Memory => {
            warn!("Using in-memory timer store; timers are lost on restart");
            Arc::new(InMemoryTimerStore::new())
        }
    };

    info!("Timer store initialized");
    Ok(store)
}

/// Build every notification channel that has configuration.
///
/// The log channel is opt-in. With no channel at all, due timers stay
/// unnotified and are retried every cycle.
#[tracing::instrument(skip(settings))]
pub fn init_notification_channels(settings: &Settings) -> Result<Vec<Arc<dyn NotificationChannel>>> {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

    let telegram = TelegramChannel::new(&settings.telegram).context("Failed to build Telegram client")?;
    if telegram.is_configured() {
        channels.push(Arc::new(telegram));
    }

    let webhook =
        WebhookChannel::new(settings.webhook.url.clone()).context("Failed to build webhook client")?;
    if webhook.is_configured() {
        channels.push(Arc::new(webhook));
    }

    if settings.webhook.log_channel_enabled {
        channels.push(Arc::new(LogChannel));
    }

    if channels.is_empty() {
        warn!("No notification channel configured, expired timers will not be marked notified");
    }

    info!(
        channels = ?channels.iter().map(|c| c.name()).collect::<Vec<_>>(),
        "Notification channels initialized"
    );
    Ok(channels)
}

#[tracing::instrument(skip(settings))]
pub fn init_ocr_provider(settings: &Settings) -> Result<Arc<dyn OcrProvider>> {
    if settings.ocr.api_key.as_deref().map_or(true, str::is_empty) {
        warn!("OCR API key not set, screenshot import is disabled");
    }

    let provider = VisionOcrProvider::new(&settings.ocr).context("Failed to build OCR client")?;
    Ok(Arc::new(provider))
}

pub fn init_extractor(settings: &Settings) -> TimerExtractor {
    TimerExtractor::new(
        settings.extractor.start_marker.clone(),
        settings.extractor.end_marker.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelegramConfig;

    fn memory_settings() -> Settings {
        let mut settings = Settings::default();
        settings.store.backend = StoreBackend::Memory;
        settings
    }

    #[tokio::test]
    async fn test_memory_store_backend() {
        let store = init_timer_store(&memory_settings()).await.unwrap();
        assert!(store.health_check().await.is_ok());
    }

    #[test]
    fn test_no_channels_without_configuration() {
        let channels = init_notification_channels(&memory_settings()).unwrap();
        assert!(channels.is_empty());
    }

    #[test]
    fn test_log_channel_is_opt_in() {
        let mut settings = memory_settings();
        settings.webhook.log_channel_enabled = true;
        let channels = init_notification_channels(&settings).unwrap();
        let names: Vec<_> = channels.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["log"]);
    }

    #[test]
    fn test_configured_channels_are_registered() {
        let mut settings = memory_settings();
        settings.telegram = TelegramConfig {
            bot_token: Some("t".to_string()),
            chat_id: Some("1".to_string()),
            api_base: "http://localhost".to_string(),
        };
        settings.webhook.url = Some("http://localhost/hook".to_string());

        let channels = init_notification_channels(&settings).unwrap();
        let names: Vec<_> = channels.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["telegram", "webhook"]);
    }

    #[test]
    fn test_extractor_uses_configured_markers() {
        let mut settings = memory_settings();
        settings.extractor.start_marker = "Building".to_string();
        let extractor = init_extractor(&settings);
        let debug = format!("{:?}", extractor);
        assert!(debug.contains("building"));
    }
}
