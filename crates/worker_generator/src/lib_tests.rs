use super::*;
use chrono::TimeZone;
use proptest::prelude::*;
use serde_json::Value;
use template_engine::contains_live_delimiter;
use worker_config::{
    CredentialRules, LogStorage, PhoneExtractionMethod, RateLimitStorage, UrlShortenerService,
};

fn valid_config() -> WorkerConfig {
    let mut config = WorkerConfig::default();
    config.basic.worker_name = "sms-gateway".to_string();
    config.basic.domain = "example.com".to_string();
    config.twilio.account_sid = format!("AC{}", "0123456789abcdef".repeat(2));
    config.twilio.auth_token = "9f8e7d6c5b4a39281706f5e4d3c2b1a0".to_string();
    config.twilio.phone_number = "+14155552671".to_string();
    config
}

fn generator() -> WorkerGenerator {
    WorkerGenerator::new().unwrap()
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 22, 8, 30, 0).unwrap()
}

fn assert_no_secrets(config: &WorkerConfig, files: &GeneratedFiles) {
    for (path, content) in files {
        for secret in config.twilio.secret_values() {
            assert!(!content.contains(secret), "credential found in {}", path);
        }
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_validate_valid_config() {
    let result = generator().validate(&valid_config());
    assert!(result.is_valid(), "{:?}", result.messages());
}

/// Verify identity, credential and routing errors are all reported at once.
#[test]
fn test_validate_collects_all_errors() {
    let mut config = valid_config();
    config.basic.worker_name = "worker--name".to_string();
    config.twilio.account_sid = format!("AC{}", "1".repeat(31));
    config.routing.max_message_length = 159;

    let result = generator().validate(&config);
    assert!(result.errors.len() >= 3);

    let messages = result.messages();
    let distinct: std::collections::HashSet<&String> = messages.iter().collect();
    assert_eq!(distinct.len(), messages.len());
    assert!(messages.iter().any(|m| m.contains("160")));
}

#[test]
fn test_generate_refuses_invalid_config() {
    let mut config = valid_config();
    config.basic.worker_name = "-worker".to_string();
    config.twilio.auth_token = "short".to_string();
    config.retry.max_retries = 6;

    let error = generator().generate(&config).unwrap_err();
    match error {
        GenerationError::ValidationFailed { errors } => assert!(errors.len() >= 3),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_with_validator_uses_custom_rules() {
    let rules = CredentialRules {
        account_sid_prefix: "SK",
        ..CredentialRules::default()
    };
    let generator =
        WorkerGenerator::with_validator(WorkerConfigValidator::with_credential_rules(rules))
            .unwrap();

    let result = generator.validate(&valid_config());
    assert!(!result.is_valid());

    let mut config = valid_config();
    config.twilio.account_sid = format!("SK{}", "0123456789abcdef".repeat(2));
    assert!(generator.validate(&config).is_valid());
}

// ============================================================================
// Generation Tests
// ============================================================================

#[test]
fn test_generate_produces_all_documents() {
    let files = generator().generate(&valid_config()).unwrap();

    let paths: Vec<&str> = files.keys().map(String::as_str).collect();
    let mut expected: Vec<&str> = TemplateId::ALL.iter().map(|id| id.output_path()).collect();
    expected.sort_unstable();
    assert_eq!(paths, expected);
}

/// Verify no credential literal reaches any generated document.
#[test]
fn test_generate_does_not_leak_credentials() {
    let config = valid_config();
    let files = generator().generate(&config).unwrap();
    assert_no_secrets(&config, &files);
}

#[test]
fn test_generate_all_is_deterministic() {
    let config = valid_config();

    let first = generator().generate_all_at(&config, fixed_time()).unwrap();
    let second = generator().generate_all_at(&config, fixed_time()).unwrap();
    assert_eq!(first, second);
}

/// Verify only the timestamp text differs between runs at different times.
#[test]
fn test_generate_all_differs_only_by_timestamp() {
    let config = valid_config();
    let later = fixed_time() + chrono::Duration::hours(5);

    let first = generator().generate_all_at(&config, fixed_time()).unwrap();
    let second = generator().generate_all_at(&config, later).unwrap();

    for (path, content) in &first {
        let normalized = content.replace("2024-10-22T08:30:00Z", "<TIME>");
        let other = second[path].replace("2024-10-22T13:30:00Z", "<TIME>");
        assert_eq!(normalized, other, "{} differs beyond the timestamp", path);
    }
    assert!(first["README.md"].contains("2024-10-22T08:30:00Z"));
}

#[test]
fn test_generate_all_does_not_modify_input() {
    let config = valid_config();
    generator().generate_all_at(&config, fixed_time()).unwrap();
    assert!(config.metadata.generated_at.is_none());
}

/// Verify a default configuration still renders all documents.
#[test]
fn test_generate_all_default_config() {
    let files = generator()
        .generate_all_at(&WorkerConfig::default(), fixed_time())
        .unwrap();
    assert_eq!(files.len(), 8);
}

#[test]
fn test_generate_all_every_extraction_method() {
    for method in [
        PhoneExtractionMethod::EmailPrefix,
        PhoneExtractionMethod::SubjectLine,
        PhoneExtractionMethod::CustomHeader,
        PhoneExtractionMethod::AllMethods,
    ] {
        let mut config = valid_config();
        config.routing.phone_extraction_method = method;

        let files = generator().generate_all_at(&config, fixed_time()).unwrap();
        assert!(files["src/index.ts"].contains("export default"));
    }
}

/// Verify template syntax in free text never comes out live.
#[test]
fn test_generate_all_neutralizes_injection() {
    let mut config = valid_config();
    config.metadata.notes = Some("{{ injection }} {% block %} {# note #}".to_string());
    config.metadata.author = Some("<script>alert(1)</script>".to_string());

    let files = generator().generate(&config).unwrap();

    for (path, content) in &files {
        assert!(!contains_live_delimiter(content), "live delimiter in {}", path);
        assert!(!content.contains("<script>"), "raw markup in {}", path);
    }
    assert!(files["README.md"].contains(r"\{\{ injection \}\}"));
}

#[test]
fn test_worker_name_with_injection_fails_validation() {
    let mut config = valid_config();
    config.basic.worker_name = "{{ injection }}".to_string();

    assert!(!generator().validate(&config).is_valid());
}

#[test]
fn test_secret_in_notes_is_caught() {
    let mut config = valid_config();
    config.metadata.notes = Some(format!("token {}", config.twilio.auth_token));

    let error = generator()
        .generate_all_at(&config, fixed_time())
        .unwrap_err();
    assert!(matches!(error, GenerationError::SecretLeak { ref path } if path == "README.md"));
}

/// Verify a credential is caught when sanitizing changed how it is written.
#[test]
fn test_escaped_secret_in_notes_is_caught() {
    let mut config = valid_config();
    config.twilio.auth_token = "s3cr3t&t0ken<with>marks0123456789abc".to_string();
    config.metadata.notes = Some(format!("token is {}", config.twilio.auth_token));
    assert!(generator().validate(&config).is_valid());

    let error = generator()
        .generate_all_at(&config, fixed_time())
        .unwrap_err();
    assert!(matches!(error, GenerationError::SecretLeak { ref path } if path == "README.md"));
    assert!(!error.to_string().contains("s3cr3t"));
}

// ============================================================================
// Output Format Tests
// ============================================================================

#[test]
fn test_wrangler_toml_parses() {
    let mut config = valid_config();
    config.cloudflare.kv_namespace_id = Some("0f2b6c3e9a4d4e8f9b1c2d3e4f5a6b7c".to_string());

    let files = generator().generate(&config).unwrap();
    let manifest: toml::Table = toml::from_str(&files["wrangler.toml"]).unwrap();

    assert_eq!(manifest["name"].as_str(), Some("sms-gateway"));
    assert_eq!(manifest["main"].as_str(), Some("src/index.ts"));
    assert_eq!(manifest["compatibility_date"].as_str(), Some("2024-10-22"));

    let kv = manifest["kv_namespaces"].as_array().unwrap();
    assert_eq!(kv[0]["binding"].as_str(), Some("SMS_GATEWAY_KV"));
    assert_eq!(
        kv[0]["id"].as_str(),
        Some("0f2b6c3e9a4d4e8f9b1c2d3e4f5a6b7c")
    );

    let datasets = manifest["analytics_engine_datasets"].as_array().unwrap();
    assert_eq!(datasets[0]["dataset"].as_str(), Some("EMAIL_SMS_ANALYTICS"));
}

/// Verify bindings are only declared when something uses them.
#[test]
fn test_wrangler_toml_without_bindings() {
    let mut config = valid_config();
    config.rate_limit.storage = RateLimitStorage::Memory;
    config.logging.storage_type = LogStorage::Console;

    let files = generator().generate(&config).unwrap();
    let manifest: toml::Table = toml::from_str(&files["wrangler.toml"]).unwrap();

    assert!(!manifest.contains_key("kv_namespaces"));
    assert!(!manifest.contains_key("analytics_engine_datasets"));
    assert!(!files["src/index.ts"].contains("SMS_GATEWAY_KV"));
}

#[test]
fn test_json_documents_parse() {
    let files = generator().generate(&valid_config()).unwrap();

    let package: Value = serde_json::from_str(&files["package.json"]).unwrap();
    assert_eq!(package["name"], "sms-gateway");
    assert!(package["scripts"]["deploy"].is_string());

    let tsconfig: Value = serde_json::from_str(&files["tsconfig.json"]).unwrap();
    assert!(tsconfig["compilerOptions"].is_object());
}

#[test]
fn test_optional_integrations_render() {
    let mut config = valid_config();
    config.integrations.enable_url_shortening = true;
    config.integrations.url_shortener_service = UrlShortenerService::Tinyurl;
    config.integrations.enable_error_notifications = true;
    config.integrations.notification_email = Some("ops@example.com".to_string());
    config
        .integrations
        .custom_headers
        .insert("X-Source".to_string(), "sms-gateway".to_string());
    config.security.enable_sender_whitelist = true;
    config.security.sender_whitelist = vec!["alerts@example.com".to_string()];

    let files = generator().generate(&config).unwrap();

    assert!(files[".env.example"].contains("URL_SHORTENER_TOKEN="));
    assert!(files["src/index.ts"].contains(r#"["alerts@example.com"]"#));
    assert!(files["src/index.ts"].contains(r#"{"X-Source":"sms-gateway"}"#));
    assert!(files["README.md"].contains("1 address(es)"));
}

/// Verify allow-list entries reach the worker as entered.
#[test]
fn test_sender_whitelist_keeps_case() {
    let mut config = valid_config();
    config.security.enable_sender_whitelist = true;
    config.security.sender_whitelist = vec![" Alerts@Example.com ".to_string()];

    let files = generator().generate(&config).unwrap();

    assert!(files["src/index.ts"].contains(r#"["Alerts@Example.com"]"#));
    assert!(files["src/index.ts"].contains("e.toLowerCase()"));
    assert!(files["README.md"].contains("without regard to case"));
}

/// Verify an unvalidated address pattern stays inside the header comments.
#[test]
fn test_address_pattern_cannot_escape_comments() {
    let mut config = valid_config();
    config.basic.email_pattern = "*/ evil(); /*\nname = \"x\"\n*@sms.{domain}".to_string();

    let files = generator().generate_all_at(&config, fixed_time()).unwrap();

    let index = &files["src/index.ts"];
    let header_end = index.find("*/").unwrap();
    assert!(index[..header_end].contains("Never hard-code them here."));
    let pattern_line = index.lines().nth(4).unwrap();
    assert!(pattern_line.contains("Inbound address pattern"));
    assert!(pattern_line.ends_with("*@sms.example.com"));

    let manifest: toml::Table = toml::from_str(&files["wrangler.toml"]).unwrap();
    assert_eq!(manifest["name"].as_str(), Some("sms-gateway"));
}

/// Verify one generator serves concurrent callers independently.
#[test]
fn test_generator_is_shareable_across_threads() {
    let generator = generator();
    let names = ["alpha-worker", "beta-worker", "gamma-worker"];

    std::thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let generator = &generator;
                scope.spawn(move || {
                    let mut config = valid_config();
                    config.basic.worker_name = name.to_string();
                    generator.generate_all_at(&config, fixed_time())
                })
            })
            .collect();

        for (handle, name) in handles.into_iter().zip(names) {
            let files = handle.join().unwrap().unwrap();
            let manifest: toml::Table = toml::from_str(&files["wrangler.toml"]).unwrap();
            assert_eq!(manifest["name"].as_str(), Some(name));
        }
    });
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Credentials never appear in the output of a valid configuration.
    #[test]
    fn prop_no_secret_leak(
        sid in "[0-9a-f]{32}",
        token in "[A-Za-z0-9]{32,48}",
        phone in prop::sample::select(vec![
            "+14155552671",
            "+12015550123",
            "+447400123456",
            "+33123456789",
        ]),
        notes in "[ -~]{0,40}",
    ) {
        let mut config = valid_config();
        config.twilio.account_sid = format!("AC{}", sid);
        config.twilio.auth_token = token;
        config.twilio.phone_number = phone.to_string();
        config.metadata.notes = Some(notes);

        let generator = generator();
        prop_assume!(generator.validate(&config).is_valid());

        match generator.generate_all_at(&config, fixed_time()) {
            Ok(files) => assert_no_secrets(&config, &files),
            Err(GenerationError::SecretLeak { .. }) => {
                // Random notes can only collide with a credential by chance.
                let notes = config.metadata.notes.clone().unwrap_or_default();
                prop_assert!(config
                    .twilio
                    .secret_values()
                    .iter()
                    .any(|s| notes.contains(s)));
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
