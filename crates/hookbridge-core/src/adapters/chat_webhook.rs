//! Reqwest-backed chat-webhook adapter.
//!
//! Posts the canonical message as JSON to an incoming-webhook URL. This is
//! the workhorse adapter: most chat products (Slack-compatible endpoints,
//! Teams connectors, Glip, Mattermost) accept a JSON POST of roughly this
//! shape and differ only in URL.

use crate::adapters::{Adapter, DeliveryError, RenderOptions};
use crate::message::Message;
use async_trait::async_trait;
use tracing::debug;

/// A named outbound chat-webhook sender with a preconfigured default
/// destination.
pub struct ChatWebhookAdapter {
    name: String,
    default_url: Option<String>,
    client: reqwest::Client,
}

impl ChatWebhookAdapter {
    /// Create an adapter with a default destination URL.
    pub fn new(name: impl Into<String>, default_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_url: Some(default_url.into()),
            client: reqwest::Client::new(),
        }
    }

    /// Create an adapter without a default destination; usable only for
    /// explicit-URL sends.
    pub fn without_default_url(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_url: None,
            client: reqwest::Client::new(),
        }
    }

    /// Render the canonical message for the wire, honoring the render
    /// options.
    fn render(&self, message: &Message, render: RenderOptions) -> Message {
        let mut rendered = message.clone();
        if !render.attachments {
            rendered.attachments.clear();
        }
        rendered
    }
}

#[async_trait]
impl Adapter for ChatWebhookAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        message: &Message,
        url: Option<&str>,
        render: RenderOptions,
    ) -> Result<(), DeliveryError> {
        let destination = match url.or(self.default_url.as_deref()) {
            Some(destination) => destination,
            None => {
                return Err(DeliveryError::Transport {
                    message: format!("adapter '{}' has no destination URL", self.name),
                })
            }
        };

        let payload = self.render(message, render);
        let response = self
            .client
            .post(destination)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(adapter = %self.name, status = status.as_u16(), "delivered");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
#[path = "chat_webhook_tests.rs"]
mod tests;
