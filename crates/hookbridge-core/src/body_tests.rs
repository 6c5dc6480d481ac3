//! Tests for the body decoder.
//!
//! `decode` is pure: these tests exercise it directly with the same
//! inputs any transport binding would supply.

use super::*;

mod passthrough {
    use super::*;

    /// Verify that a JSON body passes through untouched.
    #[test]
    fn test_json_passthrough() {
        let body = br#"{"x":1}"#;
        let decoded = decode(MessageBodyType::Json, None, body, false);
        assert_eq!(&decoded[..], body);
    }

    /// Verify that a form-encoded body passes through: the key/values ARE
    /// the event.
    #[test]
    fn test_urlencoded_passthrough() {
        let body = b"alert=down&severity=high";
        let decoded = decode(MessageBodyType::UrlEncoded, None, body, false);
        assert_eq!(&decoded[..], body);
    }

    /// Verify that the rails tag only recognizes, never reconstructs:
    /// bracket fields survive verbatim for the dedicated decoder.
    #[test]
    fn test_rails_tag_avoids_double_decoding() {
        let body = b"alert%5Bid%5D=5";
        let decoded = decode(MessageBodyType::UrlEncodedRails, None, body, false);
        assert_eq!(&decoded[..], body);
    }
}

mod base64_prestep {
    use super::*;

    /// Verify that base64 bodies are decoded before any other rule.
    #[test]
    fn test_base64_decoded_first() {
        // base64 of {"x":1}
        let body = b"eyJ4IjoxfQ==";
        let decoded = decode(MessageBodyType::Json, None, body, true);
        assert_eq!(&decoded[..], br#"{"x":1}"#);
    }

    /// Verify that a failed base64 decode degrades to empty bytes, not an
    /// error.
    #[test]
    fn test_base64_failure_yields_empty() {
        let decoded = decode(MessageBodyType::Json, None, b"!!!not-base64!!!", true);
        assert!(decoded.is_empty());
    }
}

mod json_payload_field {
    use super::*;

    /// Scenario from the pipeline contract: `payload=%7B%22x%22%3A1%7D`
    /// decodes to `{"x":1}`.
    #[test]
    fn test_payload_field_extracted() {
        let body = b"payload=%7B%22x%22%3A1%7D";
        let decoded = decode(MessageBodyType::UrlEncodedJsonPayload, None, body, false);
        assert_eq!(&decoded[..], br#"{"x":1}"#);
    }

    /// Verify that a body without a `payload` field yields empty bytes.
    #[test]
    fn test_missing_payload_field_yields_empty() {
        let body = b"other=%7B%22x%22%3A1%7D";
        let decoded = decode(MessageBodyType::UrlEncodedJsonPayload, None, body, false);
        assert!(decoded.is_empty());
    }

    /// Verify that an unparseable (non-UTF-8) body yields empty bytes.
    #[test]
    fn test_unparseable_body_yields_empty() {
        let body = [0xff, 0xfe, 0x00];
        let decoded = decode(MessageBodyType::UrlEncodedJsonPayload, None, &body, false);
        assert!(decoded.is_empty());
    }
}

mod content_type_sniff {
    use super::*;

    /// Verify that a JSON content type selects the whole body.
    #[test]
    fn test_json_content_type_takes_whole_body() {
        let body = br#"{"x":1}"#;
        let decoded = decode(
            MessageBodyType::UrlEncodedJsonPayloadOrJson,
            Some("application/json; charset=utf-8"),
            body,
            false,
        );
        assert_eq!(&decoded[..], body);
    }

    /// Verify that the sniff is case-insensitive and trims whitespace.
    #[test]
    fn test_sniff_is_case_insensitive_and_trimmed() {
        let body = br#"{"x":1}"#;
        let decoded = decode(
            MessageBodyType::UrlEncodedJsonPayloadOrJson,
            Some("  Application/JSON "),
            body,
            false,
        );
        assert_eq!(&decoded[..], body);
    }

    /// Verify the fall-through to the `payload` rule for form content
    /// types.
    #[test]
    fn test_form_content_type_falls_through_to_payload() {
        let body = b"payload=%7B%22x%22%3A1%7D";
        let decoded = decode(
            MessageBodyType::UrlEncodedJsonPayloadOrJson,
            Some("application/x-www-form-urlencoded"),
            body,
            false,
        );
        assert_eq!(&decoded[..], br#"{"x":1}"#);
    }

    /// Verify that a missing content type also falls through.
    #[test]
    fn test_missing_content_type_falls_through() {
        let body = b"payload=%7B%22x%22%3A1%7D";
        let decoded = decode(MessageBodyType::UrlEncodedJsonPayloadOrJson, None, body, false);
        assert_eq!(&decoded[..], br#"{"x":1}"#);
    }
}

/// Verify that decode is pure: repeated calls with identical inputs
/// produce identical output bytes.
#[test]
fn test_decode_is_pure() {
    let body = b"payload=%7B%22x%22%3A1%7D";
    let first = decode(MessageBodyType::UrlEncodedJsonPayload, None, body, false);
    let second = decode(MessageBodyType::UrlEncodedJsonPayload, None, body, false);
    assert_eq!(first, second);
}
