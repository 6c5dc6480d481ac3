//! Request handling: decode, normalize, override, dispatch.
//!
//! A [`Handler`] binds one [`MessageBodyType`] and one [`Normalizer`] and
//! runs the same linear flow for every transport binding: decode the body,
//! normalize it into a canonical [`Message`], apply post-hoc query
//! overrides, fan the message out through the [`AdapterSet`], and collect
//! the per-destination errors. There are no retries anywhere in the flow.

use crate::adapters::AdapterSet;
use crate::body::{self, MessageBodyType};
use crate::config::ServiceConfig;
use crate::hookdata::{HookData, QueryParams, RawEvent, OVERRIDE_ACTIVITY_KEY, OVERRIDE_ICON_KEY};
use crate::message::Message;
use crate::{ErrorInfo, ResponseInfo};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ============================================================================
// Normalizer capability
// ============================================================================

/// Errors raised by a [`Normalizer`].
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The event payload cannot be parsed for this source.
    #[error("invalid payload: {message}")]
    InvalidPayload { message: String },

    /// A field the conversion requires is absent.
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// A substituted template did not produce a valid message.
    #[error("template rendering failed: {message}")]
    Template { message: String },
}

/// The inputs handed to a [`Normalizer`].
#[derive(Debug, Clone)]
pub struct NormalizeRequest {
    /// Non-reserved query params, lower-cased keys.
    pub query_params: HashMap<String, String>,

    /// Decoded event bytes.
    pub body: Bytes,
}

/// A pluggable per-source conversion capability.
///
/// Each third-party integration supplies one implementation mapping its
/// payload shape to the canonical [`Message`]. Implementations are
/// registered once at startup and must be stateless across requests.
/// [`crate::template::TemplateNormalizer`] is the declarative fallback for
/// sources without a dedicated implementation.
#[async_trait]
pub trait Normalizer: Send + Sync {
    /// Convert decoded event bytes into a canonical message.
    async fn normalize(
        &self,
        config: &ServiceConfig,
        request: &NormalizeRequest,
    ) -> Result<Message, NormalizeError>;
}

// ============================================================================
// Handler
// ============================================================================

/// One registered integration: a body type bound to a normalizer.
///
/// Immutable after construction and stateless across requests; a single
/// handler serves concurrent requests without synchronization.
pub struct Handler {
    body_type: MessageBodyType,
    normalizer: Arc<dyn Normalizer>,
    adapters: Arc<AdapterSet>,
    config: Arc<ServiceConfig>,
}

impl Handler {
    /// Create a handler binding `body_type` and `normalizer`.
    pub fn new(
        body_type: MessageBodyType,
        normalizer: Arc<dyn Normalizer>,
        adapters: Arc<AdapterSet>,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self {
            body_type,
            normalizer,
            adapters,
            config,
        }
    }

    /// The body type fixed at registration.
    pub fn body_type(&self) -> MessageBodyType {
        self.body_type
    }

    /// Run the canonical flow for one request.
    ///
    /// Decode errors degrade to empty bytes and are deferred to the
    /// normalizer. A normalize failure short-circuits with a single
    /// `ErrorInfo{500, ..}` and dispatch is skipped entirely. Dispatch
    /// errors are collected per destination and rolled up.
    #[instrument(skip(self, raw, params), fields(input_type = %params.input_type))]
    pub async fn handle(&self, raw: RawEvent, params: QueryParams) -> ResponseInfo {
        let input_body = body::decode(
            self.body_type,
            raw.content_type.as_deref(),
            &raw.body,
            raw.is_base64,
        );
        let mut hook = HookData::new(params, input_body);

        let request = NormalizeRequest {
            query_params: hook.custom_query_params.clone(),
            body: hook.input_body.clone(),
        };

        let message = match self.normalizer.normalize(&self.config, &request).await {
            Ok(message) => message,
            Err(error) => {
                warn!(input_type = %hook.input_type, %error, "normalize failed");
                return ResponseInfo::from_error(hook, ErrorInfo::new(500, error.to_string()));
            }
        };

        hook.message = message;
        apply_query_overrides(&mut hook.message, &hook.custom_query_params);

        let errors = self.adapters.send_webhooks(&hook).await;
        debug!(
            input_type = %hook.input_type,
            error_count = errors.len(),
            "dispatch complete"
        );

        ResponseInfo::new(hook, errors)
    }
}

/// Apply post-hoc overrides from non-reserved query params.
///
/// An `activity` value replaces the computed activity line. An `icon`
/// value is treated as a URL when it parses as http(s); anything else is
/// taken as an icon/emoji token.
pub fn apply_query_overrides(message: &mut Message, custom: &HashMap<String, String>) {
    if let Some(activity) = custom.get(OVERRIDE_ACTIVITY_KEY) {
        message.activity = Some(activity.clone());
    }

    if let Some(icon) = custom.get(OVERRIDE_ICON_KEY) {
        let is_http_url = url::Url::parse(icon)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if is_http_url {
            message.icon_url = Some(icon.clone());
        } else {
            message.icon_emoji = Some(icon.clone());
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
