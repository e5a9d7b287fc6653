//! Delivery of run outcomes to the operator channel.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::SyncError;

/// Operator-facing message sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text` to the channel. With `force_notify` the message
    /// pings the channel instead of sitting silently in the backlog.
    async fn send(&self, text: &str, force_notify: bool) -> Result<(), SyncError>;
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
}

impl WebhookPayload {
    fn new(text: &str, force_notify: bool) -> Self {
        let content = if force_notify {
            format!("@here {}", text)
        } else {
            text.to_string()
        };
        WebhookPayload { content }
    }
}

/// Posts messages to a Discord-compatible webhook.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String) -> Self {
        DiscordNotifier {
            client: Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, text: &str, force_notify: bool) -> Result<(), SyncError> {
        self.client
            .post(&self.webhook_url)
            .json(&WebhookPayload::new(text, force_notify))
            .send().await?
            .error_for_status()?;

        Ok(())
    }
}

/// Fallback for runs without a webhook configured; messages still end up
/// in the scheduler's job log.
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, text: &str, _force_notify: bool) -> Result<(), SyncError> {
        println!("{}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_payload_passes_text_through() {
        let payload = WebhookPayload::new("Blocklist successfully updated all skylinks", false);
        assert_eq!(payload.content, "Blocklist successfully updated all skylinks");
    }

    #[test]
    fn test_forced_payload_pings_the_channel() {
        let payload = WebhookPayload::new("Airtable: too many retries, aborting!", true);
        assert_eq!(payload.content, "@here Airtable: too many retries, aborting!");
    }

    #[test]
    fn test_payload_serializes_to_webhook_shape() {
        let payload = WebhookPayload::new("hello", false);
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"content":"hello"}"#);
    }
}
