//! Fixture-driven tests for rails-style bracket decoding.
//!
//! The fixtures here ARE the supported grammar; anything beyond them is
//! out of contract.

use super::*;
use serde_json::json;

/// Verify the canonical fixture: `alert[id]=5` nests one level.
#[test]
fn test_single_level_nesting() {
    let decoded = decode_nested_form(b"alert%5Bid%5D=5").unwrap();
    assert_eq!(decoded, json!({"alert": {"id": "5"}}));
}

/// Verify deep nesting: `a[b][c]=v`.
#[test]
fn test_deep_nesting() {
    let decoded = decode_nested_form(b"a%5Bb%5D%5Bc%5D=v").unwrap();
    assert_eq!(decoded, json!({"a": {"b": {"c": "v"}}}));
}

/// Verify that plain keys land at the top level alongside nested ones.
#[test]
fn test_plain_and_nested_keys_mix() {
    let decoded = decode_nested_form(b"kind=alert&alert%5Bid%5D=5").unwrap();
    assert_eq!(decoded, json!({"kind": "alert", "alert": {"id": "5"}}));
}

/// Verify that repeated identical keys collect into an array, in order.
#[test]
fn test_repeated_keys_collect_into_array() {
    let decoded = decode_nested_form(b"tag=a&tag=b&tag=c").unwrap();
    assert_eq!(decoded, json!({"tag": ["a", "b", "c"]}));
}

/// Verify that a trailing `[]` appends to an array.
#[test]
fn test_trailing_brackets_append() {
    let decoded = decode_nested_form(b"tags%5B%5D=a&tags%5B%5D=b").unwrap();
    assert_eq!(decoded, json!({"tags": ["a", "b"]}));
}

/// Verify that nested repeated keys also collect into arrays.
#[test]
fn test_nested_repeated_keys() {
    let decoded = decode_nested_form(b"alert%5Btag%5D=x&alert%5Btag%5D=y").unwrap();
    assert_eq!(decoded, json!({"alert": {"tag": ["x", "y"]}}));
}

/// Verify that all leaf values stay strings; the encoding carries no type
/// information.
#[test]
fn test_leaves_are_strings() {
    let decoded = decode_nested_form(b"alert%5Bcount%5D=42").unwrap();
    assert_eq!(decoded["alert"]["count"], json!("42"));
}

mod malformed_input {
    use super::*;

    /// Verify that an unbalanced bracket key is rejected.
    #[test]
    fn test_unbalanced_bracket_rejected() {
        let err = decode_nested_form(b"a%5Bb=v").unwrap_err();
        assert!(
            matches!(err, RailsDecodeError::MalformedKey { .. }),
            "expected MalformedKey, got: {err:?}"
        );
    }

    /// Verify that a key starting with a bracket is rejected.
    #[test]
    fn test_leading_bracket_rejected() {
        let err = decode_nested_form(b"%5Ba%5D=v").unwrap_err();
        assert!(
            matches!(err, RailsDecodeError::MalformedKey { .. }),
            "expected MalformedKey, got: {err:?}"
        );
    }

    /// Verify that a non-UTF-8 body is rejected.
    #[test]
    fn test_non_utf8_body_rejected() {
        let err = decode_nested_form(&[0xff, 0xfe]).unwrap_err();
        assert!(
            matches!(err, RailsDecodeError::InvalidUtf8),
            "expected InvalidUtf8, got: {err:?}"
        );
    }

    /// Verify that contradictory nesting (scalar then map under the same
    /// key) is rejected rather than silently overwritten.
    #[test]
    fn test_conflicting_structure_rejected() {
        let err = decode_nested_form(b"a=v&a%5Bb%5D=w").unwrap_err();
        assert!(
            matches!(err, RailsDecodeError::ConflictingStructure { .. }),
            "expected ConflictingStructure, got: {err:?}"
        );
    }
}
