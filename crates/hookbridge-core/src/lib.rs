//! # Hookbridge Core
//!
//! Transport-agnostic webhook ingestion and fan-out pipeline.
//!
//! Hookbridge accepts webhook events from third-party SaaS products, each
//! with its own payload encoding, converts every event into one canonical
//! chat [`Message`], and fans that message out to the configured outbound
//! chat-webhook destinations. The same pipeline serves three host
//! transports (a FaaS-style proxy event, an event-loop HTTP server, and a
//! blocking HTTP entry point); everything transport-specific lives outside
//! this crate.
//!
//! Pipeline stages, in request order:
//!
//! 1. [`hookdata::QueryParams`] — reserved-key query extraction.
//! 2. Token allow-list check ([`service::Service`]).
//! 3. [`body::decode`] — extract event bytes for the bound [`MessageBodyType`].
//! 4. [`handler::Normalizer`] — map event bytes to a canonical [`Message`].
//! 5. [`adapters::AdapterSet::send_webhooks`] — multi-destination fan-out
//!    with partial-failure aggregation.
//!
//! Every request is processed independently; the only shared state is the
//! read-only [`adapters::AdapterSet`] and the token allow-list, both built
//! once at startup.

use serde::{Deserialize, Serialize};

pub mod adapters;
pub mod body;
pub mod config;
pub mod handler;
pub mod hookdata;
pub mod message;
pub mod rails;
pub mod service;
pub mod template;

pub use adapters::AdapterSet;
pub use body::MessageBodyType;
pub use config::ServiceConfig;
pub use handler::{Handler, NormalizeError, NormalizeRequest, Normalizer};
pub use hookdata::{HookData, OutputFormat};
pub use message::{Attachment, Field, Message};
pub use service::Service;
pub use template::TemplateNormalizer;

// ============================================================================
// Response Envelope
// ============================================================================

/// One destination's failure outcome.
///
/// A successful send produces no `ErrorInfo` at all; the absence of entries
/// is how callers distinguish full success from partial failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// HTTP-style status code describing the failure.
    pub status_code: u16,

    /// Failure detail: the destination's response body for rejections, or
    /// the transport error text for connection-level failures.
    pub body: String,
}

impl ErrorInfo {
    /// Create a new error entry.
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }
}

/// The single response shape serialized back to callers, regardless of
/// which transport delivered the request.
///
/// Carries the request's [`HookData`], the per-destination error list, and
/// the rollup status computed by [`rollup_status`].
#[derive(Debug, Clone, Serialize)]
pub struct ResponseInfo {
    /// The request's hook data (token redacted during serialization).
    pub hook_data: HookData,

    /// Zero or more per-destination failures.
    pub errors: Vec<ErrorInfo>,

    /// Rollup status summarizing the whole request.
    pub status_code: u16,
}

impl ResponseInfo {
    /// Build a response from hook data and collected dispatch errors,
    /// computing the rollup status.
    pub fn new(hook_data: HookData, errors: Vec<ErrorInfo>) -> Self {
        let status_code = rollup_status(&errors);
        Self {
            hook_data,
            errors,
            status_code,
        }
    }

    /// Build a short-circuit response carrying exactly one error.
    ///
    /// Used for authorization failures, unknown routing keys, and
    /// normalize failures, where dispatch never runs.
    pub fn from_error(hook_data: HookData, error: ErrorInfo) -> Self {
        let status_code = error.status_code;
        Self {
            hook_data,
            errors: vec![error],
            status_code,
        }
    }
}

/// Compute the rollup status for a set of per-destination outcomes.
///
/// Zero errors is a 200; one error is that error's code; more than one is
/// the maximum code across all of them. Worst case wins so that partial
/// multi-destination failure is always visible to the caller.
pub fn rollup_status(errors: &[ErrorInfo]) -> u16 {
    errors
        .iter()
        .map(|e| e.status_code)
        .max()
        .unwrap_or(200)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
