//! Outbound adapters and multi-destination fan-out.
//!
//! An [`Adapter`] re-renders the canonical [`Message`] into one
//! destination's wire format and delivers it. The [`AdapterSet`] is the
//! process-wide registry of named adapters, built once at startup and
//! read-only thereafter, and owns the fan-out logic: one request may send
//! to an explicit URL, to every registered name the caller listed, or
//! both, with each attempt classified independently.

use crate::hookdata::{HookData, OutputFormat};
use crate::message::Message;
use crate::ErrorInfo;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

mod chat_webhook;
pub use chat_webhook::ChatWebhookAdapter;

// ============================================================================
// Adapter capability
// ============================================================================

/// Rendering options for one outbound send.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Whether rich attachments are rendered. Disabled by the `nocard`
    /// output format for explicit-URL sends.
    pub attachments: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { attachments: true }
    }
}

/// One failed delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The request never completed (connect/DNS/TLS failure).
    #[error("webhook delivery failed: {message}")]
    Transport { message: String },

    /// The destination answered with a non-2xx status.
    #[error("destination returned status {status}")]
    Rejected { status: u16, body: String },
}

impl DeliveryError {
    /// Classify this failure into the response envelope's error shape.
    ///
    /// Transport failures map to a 500 with the error text; rejections
    /// keep the destination's own status and body.
    pub fn into_error_info(self) -> ErrorInfo {
        match self {
            Self::Transport { message } => ErrorInfo::new(500, message),
            Self::Rejected { status, body } => ErrorInfo::new(status, body),
        }
    }
}

/// A configured sender for one destination kind.
///
/// Implementations hold their own preconfigured default destination and
/// re-render the canonical message into the destination's wire format.
/// They must be safe for unsynchronized concurrent use.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// The registry name this adapter answers to.
    fn name(&self) -> &str;

    /// Deliver `message`, to `url` when given or to the adapter's default
    /// destination otherwise.
    ///
    /// One attempt only: no retry, and no timeout beyond the underlying
    /// client's defaults.
    async fn send(
        &self,
        message: &Message,
        url: Option<&str>,
        render: RenderOptions,
    ) -> Result<(), DeliveryError>;
}

// ============================================================================
// AdapterSet
// ============================================================================

/// Immutable registry of named outbound adapters.
#[derive(Default)]
pub struct AdapterSet {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterSet {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own name. Start-up only; the set is
    /// read-only once requests are flowing.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    /// Look up a registered adapter.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Adapter>> {
        self.adapters.get(name)
    }

    /// Registered adapter count.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapters are registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Fan one canonical message out to every configured destination.
    ///
    /// Two independent paths, both of which may fire for one request:
    ///
    /// - explicit: when `output_type` and `output_url` are both set, the
    ///   named adapter sends to that URL; a `nocard` output format
    ///   disables rich attachments for this one send.
    /// - named: every entry of `output_names`, in order, sends via that
    ///   adapter's own default destination.
    ///
    /// Unknown adapter names are skipped silently — not every deployment
    /// registers every adapter. Every destination is attempted even after
    /// earlier failures; each failure becomes one [`ErrorInfo`].
    #[instrument(skip(self, hook), fields(input_type = %hook.input_type))]
    pub async fn send_webhooks(&self, hook: &HookData) -> Vec<ErrorInfo> {
        let mut errors = Vec::new();

        if let (Some(output_type), Some(output_url)) = (&hook.output_type, &hook.output_url) {
            match self.get(output_type) {
                Some(adapter) => {
                    let render = RenderOptions {
                        attachments: hook.output_format != Some(OutputFormat::NoCard),
                    };
                    if let Err(error) = adapter.send(&hook.message, Some(output_url), render).await
                    {
                        warn!(adapter = %output_type, %error, "explicit send failed");
                        errors.push(error.into_error_info());
                    }
                }
                None => {
                    debug!(adapter = %output_type, "explicit adapter not registered, skipping");
                }
            }
        }

        for name in &hook.output_names {
            let Some(adapter) = self.get(name) else {
                debug!(adapter = %name, "named adapter not registered, skipping");
                continue;
            };
            if let Err(error) = adapter
                .send(&hook.message, None, RenderOptions::default())
                .await
            {
                warn!(adapter = %name, %error, "named send failed");
                errors.push(error.into_error_info());
            }
        }

        errors
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
