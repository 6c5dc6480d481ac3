//! Transport-neutral request data.
//!
//! [`RawEvent`] is what a transport binding hands over: body bytes, the
//! content type, the base64 flag, and the query pairs exactly as received.
//! [`QueryParams`] is the shared reserved-key extraction applied to those
//! pairs, and [`HookData`] is the per-request value threading decoded
//! event bytes, routing information, and the eventual canonical message
//! through the pipeline. A `HookData` is created fresh per request and
//! never shared across requests.

use crate::message::Message;
use bytes::Bytes;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Reserved query keys, never forwarded to
/// [`HookData::custom_query_params`].
const RESERVED_KEYS: [&str; 6] = [
    "adapters",
    "inputType",
    "outputFormat",
    "outputType",
    "outputURL",
    "token",
];

/// Custom query key overriding the computed activity line.
pub const OVERRIDE_ACTIVITY_KEY: &str = "activity";

/// Custom query key overriding the message icon.
pub const OVERRIDE_ICON_KEY: &str = "icon";

/// Whether a query key is reserved for pipeline routing.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

// ============================================================================
// RawEvent
// ============================================================================

/// The transport-neutral input every binding produces.
///
/// Bindings differ only in how they populate this value and in how they
/// render the resulting [`crate::ResponseInfo`]; everything in between is
/// shared.
#[derive(Debug, Clone, Default)]
pub struct RawEvent {
    /// The request's `Content-Type` header, if any.
    pub content_type: Option<String>,

    /// Raw body bytes as delivered by the transport.
    pub body: Bytes,

    /// Whether `body` is base64-encoded (FaaS proxy transports).
    pub is_base64: bool,

    /// Query pairs in request order, undecoded semantics preserved.
    pub query: Vec<(String, String)>,
}

// ============================================================================
// OutputFormat
// ============================================================================

/// Rendering hint for outbound sends; a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rich attachment rendering.
    Card,

    /// Plain rendering; rich attachments disabled.
    NoCard,

    /// Adaptive-card rendering.
    AdaptiveCard,
}

impl OutputFormat {
    /// Parse an `outputFormat` query value.
    ///
    /// Accepts singular and plural spellings case-insensitively and
    /// normalizes them (`"Cards"` and `"card"` both parse to
    /// [`OutputFormat::Card`]). Unrecognized input is `None`, never an
    /// error. Parsing is idempotent: `parse(x).as_str()` parses back to
    /// the same variant.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "card" | "cards" => Some(Self::Card),
            "nocard" | "nocards" => Some(Self::NoCard),
            "adaptivecard" | "adaptivecards" => Some(Self::AdaptiveCard),
            _ => None,
        }
    }

    /// The normalized wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::NoCard => "nocard",
            Self::AdaptiveCard => "adaptivecard",
        }
    }
}

// ============================================================================
// QueryParams
// ============================================================================

/// Reserved-key query extraction shared by all transport bindings.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    /// Routing key selecting the handler (`inputType`).
    pub input_type: String,

    /// Ordered named destinations (`adapters`, comma-separated).
    pub output_names: Vec<String>,

    /// Rendering hint (`outputFormat`); unrecognized values are dropped.
    pub output_format: Option<OutputFormat>,

    /// Explicit destination adapter name (`outputType`).
    pub output_type: Option<String>,

    /// Explicit destination URL (`outputURL`).
    pub output_url: Option<String>,

    /// Shared-token value (`token`).
    pub token: Option<String>,

    /// Every non-reserved key, lower-cased.
    pub custom: HashMap<String, String>,
}

impl QueryParams {
    /// Extract reserved keys from raw query pairs.
    ///
    /// The `adapters` value is split on commas with entries trimmed and
    /// empties dropped. Every non-reserved key lands in
    /// [`QueryParams::custom`] with its key lower-cased.
    pub fn extract(pairs: &[(String, String)]) -> Self {
        let mut params = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "adapters" => {
                    params.output_names = value
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "inputType" => params.input_type = value.clone(),
                "outputFormat" => params.output_format = OutputFormat::parse(value),
                "outputType" => params.output_type = Some(value.clone()),
                "outputURL" => params.output_url = Some(value.clone()),
                "token" => params.token = Some(value.clone()),
                _ => {
                    params.custom.insert(key.to_lowercase(), value.clone());
                }
            }
        }

        params
    }
}

// ============================================================================
// HookData
// ============================================================================

/// Per-request pipeline state.
///
/// Created fresh for each request, mutated only while that request is in
/// flight, and discarded once the response is written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HookData {
    /// Routing key that selected the handler.
    pub input_type: String,

    /// Decoded event bytes produced by [`crate::body::decode`].
    #[serde(serialize_with = "serialize_body")]
    pub input_body: Bytes,

    /// Rendering hint for outbound sends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,

    /// Explicit destination adapter name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,

    /// Explicit destination URL, paired with `output_type`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,

    /// Ordered named destinations.
    pub output_names: Vec<String>,

    /// Shared-token value. Never echoed back in responses.
    #[serde(skip)]
    pub token: Option<String>,

    /// Non-reserved query keys, lower-cased.
    pub custom_query_params: HashMap<String, String>,

    /// The canonical message once normalization has run.
    pub message: Message,
}

impl HookData {
    /// Assemble hook data from extracted query params and decoded body
    /// bytes.
    pub fn new(params: QueryParams, input_body: Bytes) -> Self {
        Self {
            input_type: params.input_type,
            input_body,
            output_format: params.output_format,
            output_type: params.output_type,
            output_url: params.output_url,
            output_names: params.output_names,
            token: params.token,
            custom_query_params: params.custom,
            message: Message::new(),
        }
    }

    /// Hook data for a request rejected before body decoding (auth
    /// failures, unknown routing keys).
    pub fn without_body(params: QueryParams) -> Self {
        Self::new(params, Bytes::new())
    }
}

/// Serialize body bytes as lossy UTF-8 so the response envelope stays
/// readable JSON.
fn serialize_body<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(body))
}

#[cfg(test)]
#[path = "hookdata_tests.rs"]
mod tests;
