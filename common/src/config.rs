// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub scheduler: SchedulerConfig,
    pub telegram: TelegramConfig,
    pub webhook: WebhookConfig,
    pub ocr: OcrConfig,
    pub extractor: ExtractorConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted screenshot upload size
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_run_migrations() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub poll_interval_seconds: u64,
    /// Run the notification scheduler inside the API process
    pub embedded: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub log_channel_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub start_marker: String,
    pub end_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub metrics_port: u16,
    pub tracing_endpoint: Option<String>,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let defaults = Config::try_from(&Settings::default())?;

        let builder = Config::builder()
            // Built-in defaults so partial files and env overrides deserialize
            .add_source(defaults)
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.server.max_upload_bytes == 0 {
            return Err("Server max_upload_bytes must be greater than 0".to_string());
        }

        if self.store.backend == StoreBackend::Postgres {
            if self.database.url.is_empty() {
                return Err("Database URL cannot be empty".to_string());
            }
            if self.database.max_connections == 0 {
                return Err("Database max_connections must be greater than 0".to_string());
            }
        }

        if self.scheduler.poll_interval_seconds == 0 {
            return Err("Scheduler poll_interval_seconds must be greater than 0".to_string());
        }

        // A half-configured Telegram channel is almost always a typo
        if self.telegram.bot_token.is_some() != self.telegram.chat_id.is_some() {
            return Err("Telegram bot_token and chat_id must be set together".to_string());
        }

        if self.ocr.endpoint.is_empty() {
            return Err("OCR endpoint cannot be empty".to_string());
        }

        if self.extractor.start_marker.trim().is_empty()
            || self.extractor.end_marker.trim().is_empty()
        {
            return Err("Extractor markers cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_upload_bytes: 10 * 1024 * 1024,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/builder_timers".to_string(),
                max_connections: 10,
                min_connections: 1,
                connect_timeout_seconds: 30,
                run_migrations: true,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
            },
            scheduler: SchedulerConfig {
                poll_interval_seconds: 15,
                embedded: true,
            },
            telegram: TelegramConfig {
                bot_token: None,
                chat_id: None,
                api_base: default_telegram_api_base(),
            },
            webhook: WebhookConfig::default(),
            ocr: OcrConfig {
                endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
                api_key: None,
                timeout_seconds: 30,
            },
            extractor: ExtractorConfig {
                start_marker: crate::ocr::DEFAULT_START_MARKER.to_string(),
                end_marker: crate::ocr::DEFAULT_END_MARKER.to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                metrics_port: 9090,
                tracing_endpoint: None,
            },
        }
    }
}
