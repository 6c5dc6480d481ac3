//! Body decoding for the five supported inbound encodings.
//!
//! [`decode`] is the single place raw transport bytes become event bytes.
//! It is pure: every transport binding feeds it the same inputs (body
//! bytes, content type, base64 flag) and gets the same output, which is
//! the system's central correctness property. Decode failures degrade to
//! empty bytes rather than aborting; the downstream normalizer reports the
//! actual error.

use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Form field conventionally holding the JSON event in
/// [`MessageBodyType::UrlEncodedJsonPayload`] bodies.
const PAYLOAD_FIELD: &str = "payload";

/// Media-type token sniffed by
/// [`MessageBodyType::UrlEncodedJsonPayloadOrJson`].
const JSON_MEDIA_TYPE: &str = "application/json";

/// How to extract event bytes from a raw HTTP body.
///
/// Exactly one body type is bound per handler, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageBodyType {
    /// The body is the JSON event.
    Json,

    /// The body is form-encoded key/values and those ARE the event.
    UrlEncoded,

    /// Form-encoded body with one field (`payload`) holding the JSON event.
    UrlEncodedJsonPayload,

    /// Content-type sniffed between `Json` and `UrlEncodedJsonPayload`.
    UrlEncodedJsonPayloadOrJson,

    /// Rails-style bracket-nested form encoding (e.g. `alert[id]=5`).
    ///
    /// The decoder only recognizes the tag and passes the body through;
    /// [`crate::rails::decode_nested_form`] reconstructs the structure for
    /// normalizers that need it. Keeping reconstruction out of this stage
    /// avoids double-decoding.
    UrlEncodedRails,
}

/// Extract the event bytes from a raw transport body.
///
/// When `is_base64` is set the body is base64-decoded first; a failed
/// decode yields empty bytes, not an error. The remaining rules depend on
/// `body_type`:
///
/// - [`Json`](MessageBodyType::Json), [`UrlEncoded`](MessageBodyType::UrlEncoded),
///   [`UrlEncodedRails`](MessageBodyType::UrlEncodedRails): pass through.
/// - [`UrlEncodedJsonPayload`](MessageBodyType::UrlEncodedJsonPayload):
///   parse as a query string and return the `payload` field's value;
///   unparseable bodies and missing fields yield empty bytes.
/// - [`UrlEncodedJsonPayloadOrJson`](MessageBodyType::UrlEncodedJsonPayloadOrJson):
///   if the content type contains the JSON media-type token
///   (case-insensitive, trimmed) the whole body is the event; otherwise
///   fall through to the `payload` rule.
pub fn decode(
    body_type: MessageBodyType,
    content_type: Option<&str>,
    raw_body: &[u8],
    is_base64: bool,
) -> Bytes {
    let body: Bytes = if is_base64 {
        match base64::engine::general_purpose::STANDARD.decode(raw_body) {
            Ok(decoded) => Bytes::from(decoded),
            Err(_) => return Bytes::new(),
        }
    } else {
        Bytes::copy_from_slice(raw_body)
    };

    match body_type {
        MessageBodyType::Json | MessageBodyType::UrlEncoded | MessageBodyType::UrlEncodedRails => {
            body
        }
        MessageBodyType::UrlEncodedJsonPayload => extract_payload_field(&body),
        MessageBodyType::UrlEncodedJsonPayloadOrJson => {
            if content_type_is_json(content_type) {
                body
            } else {
                extract_payload_field(&body)
            }
        }
    }
}

/// Parse a form-encoded body and return the `payload` field's value.
///
/// Bodies that are not valid UTF-8 and bodies without a `payload` field
/// both yield empty bytes.
fn extract_payload_field(body: &[u8]) -> Bytes {
    let Ok(text) = std::str::from_utf8(body) else {
        return Bytes::new();
    };

    url::form_urlencoded::parse(text.as_bytes())
        .find(|(key, _)| key == PAYLOAD_FIELD)
        .map(|(_, value)| Bytes::from(value.into_owned()))
        .unwrap_or_default()
}

/// Case-insensitive, trimmed content-type sniff for the JSON media type.
fn content_type_is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim().to_ascii_lowercase().contains(JSON_MEDIA_TYPE))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "body_tests.rs"]
mod tests;
