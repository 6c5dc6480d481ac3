//! Tests for binary configuration parsing.

use super::*;

mod adapter_specs {
    use super::*;

    /// Verify well-formed specs parse in order.
    #[test]
    fn test_parses_name_url_pairs() {
        let specs =
            parse_adapter_specs("slack=https://hooks.example.com/a, teams=https://hooks.example.com/b")
                .unwrap();
        assert_eq!(
            specs,
            vec![
                ("slack".to_string(), "https://hooks.example.com/a".to_string()),
                ("teams".to_string(), "https://hooks.example.com/b".to_string()),
            ]
        );
    }

    /// Verify an empty spec string registers nothing.
    #[test]
    fn test_empty_spec_is_empty() {
        assert!(parse_adapter_specs("").unwrap().is_empty());
        assert!(parse_adapter_specs(" , ,").unwrap().is_empty());
    }

    /// Verify a spec without `=` is rejected at startup, not at request
    /// time.
    #[test]
    fn test_malformed_spec_rejected() {
        assert!(parse_adapter_specs("slack").is_err());
        assert!(parse_adapter_specs("slack=").is_err());
        assert!(parse_adapter_specs("=https://x").is_err());
    }
}

mod body_type_tags {
    use super::*;

    /// Verify every filename tag maps to its decoder.
    #[test]
    fn test_known_tags() {
        assert_eq!(parse_body_type_tag("json").unwrap(), MessageBodyType::Json);
        assert_eq!(parse_body_type_tag("form").unwrap(), MessageBodyType::UrlEncoded);
        assert_eq!(
            parse_body_type_tag("payload").unwrap(),
            MessageBodyType::UrlEncodedJsonPayload
        );
        assert_eq!(
            parse_body_type_tag("sniff").unwrap(),
            MessageBodyType::UrlEncodedJsonPayloadOrJson
        );
        assert_eq!(
            parse_body_type_tag("rails").unwrap(),
            MessageBodyType::UrlEncodedRails
        );
    }

    /// Verify unknown tags fail startup.
    #[test]
    fn test_unknown_tag_rejected() {
        assert!(parse_body_type_tag("xml").is_err());
    }
}

/// Verify CLI defaults match the documented open-by-default posture.
#[test]
fn test_cli_defaults() {
    let cli = Cli::parse_from(["hookbridge"]);
    assert_eq!(cli.port, 8080);
    assert!(cli.tokens.is_empty());
    assert!(cli.template_dir.is_none());
    assert!(!cli.log_json);
}
