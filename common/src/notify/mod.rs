// Notification channels for expired timers

pub mod telegram;
pub mod webhook;

pub use telegram::TelegramChannel;
pub use webhook::WebhookChannel;

use async_trait::async_trait;

/// Message delivered when a timer expires
pub fn expiry_message(timer_name: &str) -> String {
    format!("⏰ '{}' done!", timer_name.to_uppercase())
}

/// External delivery mechanism for expiry alerts.
///
/// `send` reports whether delivery succeeded. Failures are logged by the
/// channel itself; an unconfigured channel returns `false` without I/O.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short label used in logs and metrics
    fn name(&self) -> &'static str;

    async fn send(&self, message: &str) -> bool;
}

/// Channel that only writes the alert to the log.
///
/// Useful in development, where no external channel is configured.
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    #[tracing::instrument(skip(self))]
    async fn send(&self, message: &str) -> bool {
        tracing::warn!(alert_type = "timer_expired", "ALERT: {}", message);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_message_upper_cases_name() {
        assert_eq!(expiry_message("Barracks lvl 5"), "⏰ 'BARRACKS LVL 5' done!");
    }

    #[tokio::test]
    async fn test_log_channel_always_delivers() {
        assert!(LogChannel.send("hello").await);
        assert_eq!(LogChannel.name(), "log");
    }
}
