//! Tests for the canonical message model.

use super::*;

/// Verify that the builder helpers populate the expected fields.
#[test]
fn test_builder_helpers() {
    let message = Message::new()
        .with_activity("Alert triggered")
        .with_title("CPU high")
        .with_text("cpu > 90% for 5m")
        .with_attachment(
            Attachment::new()
                .with_title("host")
                .with_field(Field::new("name", "web-1")),
        );

    assert_eq!(message.activity.as_deref(), Some("Alert triggered"));
    assert_eq!(message.title.as_deref(), Some("CPU high"));
    assert_eq!(message.attachments.len(), 1);
    assert_eq!(
        message.attachments[0].fields[0].title.as_deref(),
        Some("name")
    );
}

/// Verify that empty fields are omitted from the serialized form, keeping
/// outbound payloads minimal.
#[test]
fn test_empty_fields_skipped_in_json() {
    let message = Message::new().with_text("hi");
    let json = serde_json::to_string(&message).unwrap();

    assert_eq!(json, r#"{"text":"hi"}"#);
}

/// Verify that a message deserializes from the same shape the templated
/// normalizer renders.
#[test]
fn test_deserializes_from_template_output_shape() {
    let json = r#"{
        "activity": "Deploy finished",
        "attachments": [
            {"title": "build", "fields": [{"title": "id", "value": "42", "short": true}]}
        ]
    }"#;

    let message: Message = serde_json::from_str(json).unwrap();
    assert_eq!(message.activity.as_deref(), Some("Deploy finished"));
    assert!(message.attachments[0].fields[0].short);
}
