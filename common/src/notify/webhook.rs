// Generic JSON webhook channel (Slack-style incoming webhooks)

use super::NotificationChannel;
use crate::errors::ChannelError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Posts `{"text": message}` to a configured URL
pub struct WebhookChannel {
    client: Client,
    url: Option<String>,
}

impl WebhookChannel {
    pub fn new(url: Option<String>) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            url: url.filter(|u| !u.trim().is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    async fn deliver(&self, url: &str, message: &str) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(url)
            .json(&json!({ "text": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    #[tracing::instrument(skip(self, message))]
    async fn send(&self, message: &str) -> bool {
        let Some(url) = self.url.as_deref() else {
            return false;
        };

        match self.deliver(url, message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook send failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(json!({"text": "⏰ 'ARMORY' done!"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let channel = WebhookChannel::new(Some(format!("{}/hook", server.uri()))).unwrap();
        assert!(channel.send("⏰ 'ARMORY' done!").await);
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let channel = WebhookChannel::new(Some(server.uri())).unwrap();
        assert!(!channel.send("x").await);
    }

    #[tokio::test]
    async fn test_missing_url_is_not_configured() {
        let channel = WebhookChannel::new(Some("  ".to_string())).unwrap();
        assert!(!channel.is_configured());
        assert!(!channel.send("x").await);
    }
}
