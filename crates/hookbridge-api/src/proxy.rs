//! FaaS-style proxy binding.
//!
//! Serverless platforms hand webhooks over as a structured proxy event —
//! headers, a body string (optionally base64-encoded), and flat query
//! parameters — and expect a structured proxy response back. This binding
//! converts between that shape and the shared pipeline; there is no
//! server here at all.

use bytes::Bytes;
use hookbridge_core::hookdata::RawEvent;
use hookbridge_core::Service;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

/// The structured event a FaaS host delivers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// Request headers as delivered by the platform.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Flat query parameters.
    #[serde(default)]
    pub query_string_parameters: HashMap<String, String>,

    /// Body string; base64-encoded when the flag below is set.
    #[serde(default)]
    pub body: String,

    /// Whether `body` is base64-encoded.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// The structured response a FaaS host expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Handle one proxy event through the shared pipeline.
///
/// The response body is the same JSON envelope every other binding
/// returns, with the rollup status mirrored into `status_code`.
#[instrument(skip(service, request))]
pub async fn handle_proxy_event(service: &Service, request: ProxyRequest) -> ProxyResponse {
    let content_type = request
        .headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.clone());

    let raw = RawEvent {
        content_type,
        body: Bytes::from(request.body),
        is_base64: request.is_base64_encoded,
        query: request.query_string_parameters.into_iter().collect(),
    };

    let response = service.handle_raw(raw).await;
    let status_code = response.status_code;
    let body = serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"status_code":500,"errors":[]}"#.to_string());

    ProxyResponse {
        status_code,
        headers: HashMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]),
        body,
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
