//! Tests for handler orchestration and query overrides.

use super::*;
use crate::hookdata::QueryParams;

/// Normalizer double that records the body it saw and returns a fixed
/// message.
struct EchoNormalizer;

#[async_trait]
impl Normalizer for EchoNormalizer {
    async fn normalize(
        &self,
        _config: &ServiceConfig,
        request: &NormalizeRequest,
    ) -> Result<Message, NormalizeError> {
        Ok(Message::new()
            .with_activity("echo")
            .with_text(String::from_utf8_lossy(&request.body).into_owned()))
    }
}

/// Normalizer double that always fails.
struct FailingNormalizer;

#[async_trait]
impl Normalizer for FailingNormalizer {
    async fn normalize(
        &self,
        _config: &ServiceConfig,
        _request: &NormalizeRequest,
    ) -> Result<Message, NormalizeError> {
        Err(NormalizeError::InvalidPayload {
            message: "unusable payload".to_string(),
        })
    }
}

fn handler_with(normalizer: Arc<dyn Normalizer>, body_type: MessageBodyType) -> Handler {
    Handler::new(
        body_type,
        normalizer,
        Arc::new(AdapterSet::new()),
        Arc::new(ServiceConfig::default()),
    )
}

fn raw_json_event(body: &'static [u8]) -> RawEvent {
    RawEvent {
        content_type: Some("application/json".to_string()),
        body: Bytes::from_static(body),
        is_base64: false,
        query: vec![],
    }
}

mod flow {
    use super::*;

    /// Verify the happy path: decoded bytes reach the normalizer and the
    /// message lands in the envelope with a 200 rollup.
    #[tokio::test]
    async fn test_decode_feeds_normalizer() {
        let handler = handler_with(Arc::new(EchoNormalizer), MessageBodyType::Json);
        let response = handler
            .handle(raw_json_event(br#"{"x":1}"#), QueryParams::default())
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.hook_data.message.text.as_deref(), Some(r#"{"x":1}"#));
    }

    /// Verify that the handler applies its bound body type: a payload
    /// form field is unwrapped before normalization.
    #[tokio::test]
    async fn test_bound_body_type_applied() {
        let handler = handler_with(
            Arc::new(EchoNormalizer),
            MessageBodyType::UrlEncodedJsonPayload,
        );
        let raw = RawEvent {
            content_type: Some("application/x-www-form-urlencoded".to_string()),
            body: Bytes::from_static(b"payload=%7B%22x%22%3A1%7D"),
            is_base64: false,
            query: vec![],
        };

        let response = handler.handle(raw, QueryParams::default()).await;
        assert_eq!(response.hook_data.message.text.as_deref(), Some(r#"{"x":1}"#));
    }

    /// Verify that a normalize failure short-circuits with exactly one
    /// 500 error and dispatch is skipped.
    #[tokio::test]
    async fn test_normalize_failure_short_circuits() {
        let handler = handler_with(Arc::new(FailingNormalizer), MessageBodyType::Json);
        let response = handler
            .handle(raw_json_event(b"whatever"), QueryParams::default())
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].body.contains("unusable payload"));
    }

    /// Verify that an `activity` custom param overrides the computed
    /// activity after normalization.
    #[tokio::test]
    async fn test_activity_override_applied() {
        let handler = handler_with(Arc::new(EchoNormalizer), MessageBodyType::Json);
        let params = QueryParams::extract(&[("activity".to_string(), "Deployed".to_string())]);

        let response = handler.handle(raw_json_event(b"{}"), params).await;
        assert_eq!(
            response.hook_data.message.activity.as_deref(),
            Some("Deployed")
        );
    }
}

mod overrides {
    use super::*;
    use std::collections::HashMap;

    fn custom(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Verify that an http(s) icon value is treated as a URL.
    #[test]
    fn test_icon_url_override() {
        let mut message = Message::new();
        apply_query_overrides(&mut message, &custom(&[("icon", "https://example.com/i.png")]));

        assert_eq!(message.icon_url.as_deref(), Some("https://example.com/i.png"));
        assert!(message.icon_emoji.is_none());
    }

    /// Verify that a non-URL icon value is treated as an emoji token.
    #[test]
    fn test_icon_emoji_override() {
        let mut message = Message::new();
        apply_query_overrides(&mut message, &custom(&[("icon", ":rocket:")]));

        assert_eq!(message.icon_emoji.as_deref(), Some(":rocket:"));
        assert!(message.icon_url.is_none());
    }

    /// Verify that a non-http scheme counts as an emoji token, not a URL.
    #[test]
    fn test_non_http_scheme_is_emoji() {
        let mut message = Message::new();
        apply_query_overrides(&mut message, &custom(&[("icon", "ftp://example.com/i.png")]));

        assert_eq!(message.icon_emoji.as_deref(), Some("ftp://example.com/i.png"));
    }

    /// Verify that overrides leave other fields alone.
    #[test]
    fn test_untouched_without_override_keys() {
        let mut message = Message::new().with_activity("original");
        apply_query_overrides(&mut message, &custom(&[("color", "red")]));

        assert_eq!(message.activity.as_deref(), Some("original"));
    }
}
