use super::*;

fn auditor() -> SecretAuditor {
    SecretAuditor::new().unwrap()
}

// ============================================================================
// Literal Check Tests
// ============================================================================

#[test]
fn test_check_literals_clean_content() {
    let secrets = ["f".repeat(32)];
    let secrets: Vec<&str> = secrets.iter().map(String::as_str).collect();

    assert!(auditor()
        .check_literals("README.md", "nothing to see here", &secrets)
        .is_ok());
}

/// Verify a leak is reported by path without the value.
#[test]
fn test_check_literals_detects_leak() {
    let token = "a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6";
    let content = format!("const token = '{}';", token);

    let error = auditor()
        .check_literals("src/index.ts", &content, &[token])
        .unwrap_err();

    match &error {
        GenerationError::SecretLeak { path } => assert_eq!(path, "src/index.ts"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!error.to_string().contains(token));
}

/// Verify a credential is found after sanitizing escaped its markup.
#[test]
fn test_check_literals_detects_escaped_leak() {
    let token = "s3cr3t&t0ken<with>{{marks}}0123456789";
    let content = format!("> token is {}", sanitize_str(token));
    assert!(!content.contains(token));

    let error = auditor()
        .check_literals("README.md", &content, &[token])
        .unwrap_err();
    assert!(matches!(error, GenerationError::SecretLeak { .. }));
}

#[test]
fn test_check_literals_skips_short_values() {
    assert!(auditor()
        .check_literals("README.md", "AC and +1 and x", &["AC", "+1", "", "x"])
        .is_ok());
}

#[test]
fn test_check_literals_length_boundary() {
    let content = "value 12345678 here";

    assert!(auditor()
        .check_literals("a", content, &["1234567"])
        .is_ok());
    assert!(auditor()
        .check_literals("a", content, &["12345678"])
        .is_err());
}

// ============================================================================
// Pattern Scan Tests
// ============================================================================

#[test]
fn test_scan_patterns_account_sid() {
    let content = format!("sid: AC{}", "0123456789abcdef".repeat(2));
    assert_eq!(auditor().scan_patterns(&content), vec!["account_sid"]);
}

#[test]
fn test_scan_patterns_assignments() {
    let found = auditor().scan_patterns(r#"AUTH_TOKEN = "abcdefgh12345678""#);
    assert_eq!(found, vec!["secret_assignment"]);

    let found = auditor().scan_patterns(r#"{ password: 'hunter2' }"#);
    assert_eq!(found, vec!["password_assignment"]);
}

/// Verify secret names without values are not flagged.
#[test]
fn test_scan_patterns_ignores_secret_names() {
    let content = "TWILIO_AUTH_TOKEN=\nnpx wrangler secret put TWILIO_AUTH_TOKEN\n";
    assert!(auditor().scan_patterns(content).is_empty());
}

#[test]
fn test_audit_passes_warnings_through() {
    let content = format!("sid: AC{}", "0123456789abcdef".repeat(2));
    assert!(auditor().audit("README.md", &content, &[]).is_ok());
}
