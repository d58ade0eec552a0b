//! Tests for configuration import and export.

use super::*;
use crate::{BackoffStrategy, ContentSource, PhoneExtractionMethod};
use proptest::prelude::*;
use tempfile::TempDir;

fn populated_config() -> WorkerConfig {
    let mut config = WorkerConfig::default();
    config.basic.worker_name = "sms-gateway".to_string();
    config.basic.domain = "example.com".to_string();
    config.twilio.account_sid = format!("AC{}", "a".repeat(32));
    config.twilio.auth_token = "b".repeat(32);
    config.twilio.phone_number = "+14155552671".to_string();
    config.routing.phone_extraction_method = PhoneExtractionMethod::SubjectLine;
    config.routing.content_source = ContentSource::SubjectAndBody;
    config.retry.backoff_strategy = BackoffStrategy::Linear;
    config.integrations.enable_error_notifications = true;
    config.integrations.notification_email = Some("ops@example.com".to_string());
    config
        .integrations
        .custom_headers
        .insert("X-Source".to_string(), "gateway".to_string());
    config.metadata.notes = Some("{{ not a template }}".to_string());
    config
}

// ============================================================================
// Round-trip Tests
// ============================================================================

/// Verify a populated configuration survives JSON export and import.
#[test]
fn test_json_round_trip() {
    let config = populated_config();
    let json = config.to_json_string_pretty().unwrap();
    assert_eq!(WorkerConfig::from_json_str(&json).unwrap(), config);
}

/// Verify a populated configuration survives TOML export and import.
#[test]
fn test_toml_round_trip() {
    let config = populated_config();
    let toml = config.to_toml_string().unwrap();
    assert_eq!(WorkerConfig::from_toml_str(&toml).unwrap(), config);
}

/// Verify a large allow-list round-trips unchanged and in order.
#[test]
fn test_round_trip_large_whitelist() {
    let mut config = populated_config();
    config.security.enable_sender_whitelist = true;
    config.security.sender_whitelist = (0..1000)
        .map(|i| format!("user{}@example.com", i))
        .collect();

    let value = config.to_value().unwrap();
    let restored = WorkerConfig::from_value(value).unwrap();

    assert_eq!(restored, config);
    assert_eq!(restored.security.sender_whitelist.len(), 1000);
    assert_eq!(restored.security.sender_whitelist[999], "user999@example.com");
}

// ============================================================================
// Partial Document Tests
// ============================================================================

/// Verify missing sections and keys take their defaults.
#[test]
fn test_partial_json_uses_defaults() {
    let json = r#"{ "basic": { "domain": "example.com" }, "retry": { "max_retries": 2 } }"#;
    let config = WorkerConfig::from_json_str(json).unwrap();

    assert_eq!(config.basic.domain, "example.com");
    assert_eq!(config.basic.worker_name, "email-to-sms-worker");
    assert_eq!(config.retry.max_retries, 2);
    assert_eq!(config.retry.retry_delay, 5);
    assert_eq!(config.rate_limit, crate::RateLimitSettings::default());
}

/// Verify an empty document is the default configuration.
#[test]
fn test_empty_documents_are_default() {
    assert_eq!(WorkerConfig::from_json_str("{}").unwrap(), WorkerConfig::default());
    assert_eq!(WorkerConfig::from_toml_str("").unwrap(), WorkerConfig::default());
}

/// Verify unknown enum values are parse errors.
#[test]
fn test_unknown_enum_value_rejected() {
    let json = r#"{ "routing": { "content_source": "carrier_pigeon" } }"#;
    let error = WorkerConfig::from_json_str(json).unwrap_err();
    assert!(matches!(error, ConfigurationError::ParseError { .. }));
}

/// Verify malformed text is a parse error.
#[test]
fn test_malformed_json_rejected() {
    let error = WorkerConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(error, ConfigurationError::ParseError { .. }));
}

// ============================================================================
// File Tests
// ============================================================================

/// Verify save and load through both formats.
#[test]
fn test_save_and_load_files() {
    let dir = TempDir::new().unwrap();
    let config = populated_config();

    for name in ["worker.json", "worker.toml"] {
        let path = dir.path().join(name);
        config.save(&path).unwrap();
        assert_eq!(WorkerConfig::load(&path).unwrap(), config);
    }
}

/// Verify a missing file is reported by path.
#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let error = WorkerConfig::load(&path).unwrap_err();
    assert!(matches!(error, ConfigurationError::FileNotFound { .. }));
}

/// Verify an unknown extension is rejected.
#[test]
fn test_load_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("worker.yaml");
    std::fs::write(&path, "basic: {}").unwrap();

    let error = WorkerConfig::load(&path).unwrap_err();
    assert_eq!(
        error,
        ConfigurationError::UnsupportedFormat {
            extension: "yaml".to_string()
        }
    );
}

// ============================================================================
// Redaction Tests
// ============================================================================

/// Verify redaction replaces every sensitive field with a marker.
#[test]
fn test_redacted_replaces_sensitive_fields() {
    let config = populated_config();
    let redacted = config.redacted();

    assert_eq!(redacted.twilio.account_sid, "<ACCOUNT_SID_PLACEHOLDER>");
    assert_eq!(redacted.twilio.auth_token, "<AUTH_TOKEN_PLACEHOLDER>");
    assert_eq!(redacted.twilio.phone_number, "<PHONE_NUMBER_PLACEHOLDER>");
    assert_eq!(
        redacted.integrations.notification_email.as_deref(),
        Some("<NOTIFICATION_EMAIL_PLACEHOLDER>")
    );

    let json = redacted.to_json_string_pretty().unwrap();
    assert!(!json.contains(&config.twilio.account_sid));
    assert!(!json.contains(&config.twilio.auth_token));
    assert!(!json.contains("ops@example.com"));
}

/// Verify redaction leaves non-sensitive fields alone.
#[test]
fn test_redacted_keeps_other_fields() {
    let config = populated_config();
    let redacted = config.redacted();

    assert_eq!(redacted.basic, config.basic);
    assert_eq!(redacted.routing, config.routing);
    assert_eq!(redacted.metadata, config.metadata);
}

/// Verify an absent notification email stays absent.
#[test]
fn test_redacted_absent_notification_email() {
    let redacted = WorkerConfig::default().redacted();
    assert!(redacted.integrations.notification_email.is_none());
}

// ============================================================================
// Schema Tests
// ============================================================================

/// Verify the JSON schema names the top-level sections.
#[test]
fn test_json_schema_lists_sections() {
    let schema = json_schema().unwrap();
    let properties = schema["properties"].as_object().unwrap();

    for key in ["basic", "twilio", "routing", "rate_limit", "security", "metadata"] {
        assert!(properties.contains_key(key), "missing {}", key);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Verify arbitrary field contents survive a JSON round-trip.
    #[test]
    fn prop_json_round_trip(
        worker_name in ".{0,40}",
        notes in proptest::option::of(".{0,80}"),
        whitelist in proptest::collection::vec("[a-z]{1,8}@[a-z]{1,8}\\.com", 0..50),
        max_length in any::<i64>(),
        headers in proptest::collection::btree_map("[A-Za-z-]{1,12}", ".{0,20}", 0..5),
    ) {
        let mut config = WorkerConfig::default();
        config.basic.worker_name = worker_name;
        config.metadata.notes = notes;
        config.security.sender_whitelist = whitelist;
        config.routing.max_message_length = max_length;
        config.integrations.custom_headers = headers;

        let json = config.to_json_string_pretty().unwrap();
        prop_assert_eq!(WorkerConfig::from_json_str(&json).unwrap(), config);
    }
}
