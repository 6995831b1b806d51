// Telegram Bot API channel

use super::NotificationChannel;
use crate::config::TelegramConfig;
use crate::errors::ChannelError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT_SECONDS: u64 = 10;

struct TelegramTarget {
    bot_token: String,
    chat_id: String,
}

/// Sends alerts through `sendMessage` of the Telegram Bot API
pub struct TelegramChannel {
    client: Client,
    api_base: String,
    target: Option<TelegramTarget>,
}

impl TelegramChannel {
    pub fn new(config: &TelegramConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        let target = match (&config.bot_token, &config.chat_id) {
            (Some(bot_token), Some(chat_id)) if !bot_token.is_empty() && !chat_id.is_empty() => {
                Some(TelegramTarget {
                    bot_token: bot_token.clone(),
                    chat_id: chat_id.clone(),
                })
            }
            _ => None,
        };

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            target,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    async fn deliver(&self, target: &TelegramTarget, message: &str) -> Result<(), ChannelError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, target.bot_token);
        let response = self
            .client
            .post(url)
            .form(&[("chat_id", target.chat_id.as_str()), ("text", message)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    #[tracing::instrument(skip(self, message))]
    async fn send(&self, message: &str) -> bool {
        let Some(target) = &self.target else {
            tracing::debug!("Telegram not configured, skipping send");
            return false;
        };

        match self.deliver(target, message).await {
            Ok(()) => {
                tracing::info!("Telegram message sent");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Telegram send failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> TelegramConfig {
        TelegramConfig {
            bot_token: Some("123:abc".to_string()),
            chat_id: Some("42".to_string()),
            api_base: server.uri(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_string_contains("chat_id=42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let channel = TelegramChannel::new(&config(&server)).unwrap();
        assert!(channel.send("⏰ 'BARRACKS' done!").await);
    }

    #[tokio::test]
    async fn test_rejected_send_reports_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
            .mount(&server)
            .await;

        let channel = TelegramChannel::new(&config(&server)).unwrap();
        assert!(!channel.send("hello").await);
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_silent_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cfg = config(&server);
        cfg.chat_id = None;
        let channel = TelegramChannel::new(&cfg).unwrap();
        assert!(!channel.is_configured());
        assert!(!channel.send("hello").await);
    }
}
