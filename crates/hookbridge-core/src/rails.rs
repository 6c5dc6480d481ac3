//! Rails-style bracket-nested form decoding.
//!
//! Rails encodes nested structures into form keys using brackets:
//! `alert[id]=5` becomes `{"alert":{"id":"5"}}` and `a[b][c]=v` becomes
//! `{"a":{"b":{"c":"v"}}}`. This module reconstructs that structure into a
//! [`serde_json::Value`] so normalizers can walk it like any other JSON
//! payload.
//!
//! The supported grammar is fixture-driven: nested maps via `[key]`,
//! repeated identical keys collecting into arrays, and a trailing `[]`
//! appending to an array. Deeper generality (numeric indices, sparse
//! arrays) is deliberately not assumed; the tests are the contract.

use serde_json::{Map, Value};

/// Errors raised while reconstructing a bracket-nested form body.
#[derive(Debug, thiserror::Error)]
pub enum RailsDecodeError {
    /// The body is not valid UTF-8.
    #[error("form body is not valid UTF-8")]
    InvalidUtf8,

    /// A form key has unbalanced or misplaced brackets.
    #[error("malformed form key: {key}")]
    MalformedKey { key: String },

    /// A key mixes array-append and map semantics for the same node.
    #[error("conflicting structure at form key: {key}")]
    ConflictingStructure { key: String },
}

/// One parsed component of a bracket-nested form key.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// A named map entry (`alert`, `[id]`).
    Key(String),

    /// A trailing `[]`, appending to an array.
    Append,
}

/// Reconstruct a Rails-style form body into a JSON object.
///
/// All leaf values are strings; Rails form encoding carries no type
/// information.
///
/// # Errors
///
/// Returns [`RailsDecodeError`] for non-UTF-8 bodies, unbalanced bracket
/// keys, and keys whose nesting contradicts an earlier key's structure.
pub fn decode_nested_form(body: &[u8]) -> Result<Value, RailsDecodeError> {
    let text = std::str::from_utf8(body).map_err(|_| RailsDecodeError::InvalidUtf8)?;

    let mut root = Value::Object(Map::new());
    for (key, value) in url::form_urlencoded::parse(text.as_bytes()) {
        let segments = parse_key_segments(&key)?;
        insert_value(&mut root, &key, &segments, Value::String(value.into_owned()))?;
    }

    Ok(root)
}

/// Split a form key into its bracket segments.
///
/// `a[b][c]` parses to `[Key(a), Key(b), Key(c)]`; `tags[]` parses to
/// `[Key(tags), Append]`. A key without brackets is a single segment.
fn parse_key_segments(key: &str) -> Result<Vec<Segment>, RailsDecodeError> {
    let malformed = || RailsDecodeError::MalformedKey {
        key: key.to_string(),
    };

    let Some(open) = key.find('[') else {
        if key.is_empty() {
            return Err(malformed());
        }
        return Ok(vec![Segment::Key(key.to_string())]);
    };

    let head = &key[..open];
    if head.is_empty() {
        return Err(malformed());
    }

    let mut segments = vec![Segment::Key(head.to_string())];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(malformed());
        }
        let close = rest.find(']').ok_or_else(malformed)?;
        let inner = &rest[1..close];
        if inner.is_empty() {
            segments.push(Segment::Append);
        } else if inner.contains('[') {
            return Err(malformed());
        } else {
            segments.push(Segment::Key(inner.to_string()));
        }
        rest = &rest[close + 1..];
    }

    Ok(segments)
}

/// Walk `segments` into `node`, creating containers on the way, and place
/// `value` at the leaf.
fn insert_value(
    node: &mut Value,
    key: &str,
    segments: &[Segment],
    value: Value,
) -> Result<(), RailsDecodeError> {
    let conflict = || RailsDecodeError::ConflictingStructure {
        key: key.to_string(),
    };

    match segments {
        [] => Err(RailsDecodeError::MalformedKey {
            key: key.to_string(),
        }),

        [Segment::Key(name)] => {
            let map = node.as_object_mut().ok_or_else(conflict)?;
            // Repeated identical keys collect into an array.
            match map.get_mut(name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    if existing.is_object() {
                        return Err(conflict());
                    }
                    let previous = existing.take();
                    *existing = Value::Array(vec![previous, value]);
                }
                None => {
                    map.insert(name.clone(), value);
                }
            }
            Ok(())
        }

        [Segment::Append] => {
            let items = node.as_array_mut().ok_or_else(conflict)?;
            items.push(value);
            Ok(())
        }

        [Segment::Key(name), rest @ ..] => {
            let next_is_append = matches!(rest[0], Segment::Append);
            let map = node.as_object_mut().ok_or_else(conflict)?;
            let child = map.entry(name.clone()).or_insert_with(|| {
                if next_is_append {
                    Value::Array(Vec::new())
                } else {
                    Value::Object(Map::new())
                }
            });
            insert_value(child, key, rest, value)
        }

        [Segment::Append, rest @ ..] => {
            // `a[][b]=v` style: each append opens a fresh object.
            let items = node.as_array_mut().ok_or_else(conflict)?;
            items.push(Value::Object(Map::new()));
            let child = items.last_mut().ok_or_else(conflict)?;
            insert_value(child, key, rest, value)
        }
    }
}

#[cfg(test)]
#[path = "rails_tests.rs"]
mod tests;
