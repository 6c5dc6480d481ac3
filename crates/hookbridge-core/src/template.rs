//! Declarative token-templating normalizer.
//!
//! [`TemplateNormalizer`] is the zero-code fallback [`Normalizer`]: a JSON
//! template containing `${path.expr}` tokens is filled in from the raw
//! inbound JSON and parsed directly into the canonical [`Message`]. No
//! per-service logic — it trades expressiveness for configuration-only
//! onboarding of new sources.
//!
//! # Sharp edge
//!
//! String substitution is deliberately NOT JSON-escaped: a value
//! containing a quote character can break the template, surfacing as an
//! ordinary normalize failure. This is intentional current behavior, kept
//! visible rather than silently patched; see the tests.

use crate::config::ServiceConfig;
use crate::handler::{NormalizeError, NormalizeRequest, Normalizer};
use crate::message::Message;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// Literal inserted for tokens whose path matches nothing in the payload.
///
/// Visible on purpose so broken templates are debuggable from the
/// rendered output; never an empty string.
pub const UNMATCHED_PLACEHOLDER: &str = "<no value>";

/// Token syntax: `${path.to.value}`.
const TOKEN_PATTERN: &str = r"\$\{([^}]+)\}";

/// How the inbound body becomes the JSON value paths evaluate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadShape {
    /// The body is JSON.
    Json,

    /// The body is a Rails-style bracket-nested form, reconstructed via
    /// [`crate::rails::decode_nested_form`].
    RailsForm,
}

/// Configuration-driven fallback normalizer.
pub struct TemplateNormalizer {
    template: String,
    token: Regex,
    shape: PayloadShape,
}

impl TemplateNormalizer {
    /// Create a normalizer from a JSON message template.
    ///
    /// The template itself is not validated here; whether it yields a
    /// well-formed message depends on the substituted values, so errors
    /// surface per request at normalize time.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            // The pattern is a compile-time constant; it cannot fail.
            token: Regex::new(TOKEN_PATTERN).expect("token pattern is valid"),
            shape: PayloadShape::Json,
        }
    }

    /// Create a normalizer for Rails-style form bodies: the bracket-nested
    /// form is reconstructed into JSON before path evaluation.
    pub fn new_rails_form(template: impl Into<String>) -> Self {
        Self {
            shape: PayloadShape::RailsForm,
            ..Self::new(template)
        }
    }

    /// Parse the inbound body according to the configured shape.
    fn parse_payload(&self, body: &[u8]) -> Result<Value, NormalizeError> {
        match self.shape {
            PayloadShape::Json => {
                serde_json::from_slice(body).map_err(|e| NormalizeError::InvalidPayload {
                    message: format!("event body is not JSON: {e}"),
                })
            }
            PayloadShape::RailsForm => crate::rails::decode_nested_form(body).map_err(|e| {
                NormalizeError::InvalidPayload {
                    message: format!("event body is not a nested form: {e}"),
                }
            }),
        }
    }

    /// Substitute every `${path}` token in the template against `payload`.
    fn render(&self, payload: &Value) -> String {
        self.token
            .replace_all(&self.template, |caps: &regex::Captures<'_>| {
                substitute(payload, &caps[1])
            })
            .into_owned()
    }
}

#[async_trait]
impl Normalizer for TemplateNormalizer {
    async fn normalize(
        &self,
        _config: &ServiceConfig,
        request: &NormalizeRequest,
    ) -> Result<Message, NormalizeError> {
        let payload = self.parse_payload(&request.body)?;

        let rendered = self.render(&payload);

        serde_json::from_str(&rendered).map_err(|e| NormalizeError::Template {
            message: format!("substituted template is not a valid message: {e}"),
        })
    }
}

/// Evaluate one path expression and format the result for insertion.
///
/// Substitution by result kind: strings verbatim (unescaped), numbers in
/// minimal decimal form, booleans/null/composites as raw JSON, unmatched
/// paths as [`UNMATCHED_PLACEHOLDER`].
fn substitute(payload: &Value, path: &str) -> String {
    match resolve_path(payload, path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format_number(n),
        Some(other) => other.to_string(),
        None => UNMATCHED_PLACEHOLDER.to_string(),
    }
}

/// Traverse a dot-separated path, with numeric segments indexing arrays.
///
/// Example: `resolve_path(&json, "commits.0.id")` returns
/// `&json["commits"][0]["id"]`.
fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| {
        match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(segment),
        }
    })
}

/// Format a JSON number with no trailing zeros or unneeded exponent.
fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // `{}` on f64 prints the shortest representation that round-trips.
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
