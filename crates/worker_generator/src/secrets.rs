//! Post-render audit for credential material in generated files.
//!
//! Two checks run over every document:
//!
//! * a literal check that fails generation when a configured credential
//!   value appears, either verbatim or in the escaped form the sanitizer
//!   gives it, and
//! * a pattern check that only warns about text shaped like a credential
//!   (an account id, a quoted secret assignment).

use crate::{GenerationError, GenerationResult};
use regex::Regex;
use template_engine::sanitize_str;
use tracing::warn;

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;

/// Credential values shorter than this are not searched for.
///
/// Short values such as a two-letter prefix match ordinary text and say
/// nothing about a leak.
pub const MIN_AUDITED_SECRET_LENGTH: usize = 8;

const SUSPICIOUS_PATTERNS: [(&str, &str); 3] = [
    ("account_sid", r"\bAC[0-9a-fA-F]{32}\b"),
    (
        "secret_assignment",
        r#"(?i)\b(auth_?token|api_?key|secret)\b\s*[:=]\s*["'][^"'\s]{8,}["']"#,
    ),
    ("password_assignment", r#"(?i)\bpassword\b\s*[:=]\s*["'][^"']+["']"#),
];

/// Scans rendered documents for credentials.
#[derive(Debug)]
pub struct SecretAuditor {
    patterns: Vec<(&'static str, Regex)>,
}

impl SecretAuditor {
    /// Compile the suspicious-content patterns.
    pub fn new() -> GenerationResult<Self> {
        let patterns = SUSPICIOUS_PATTERNS
            .iter()
            .map(|(name, pattern)| {
                Regex::new(pattern)
                    .map(|regex| (*name, regex))
                    .map_err(|e| GenerationError::AuditPattern {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<GenerationResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Fail when any credential literal appears in `content`.
    ///
    /// Each value is searched for as written and as sanitized, since user
    /// text reaches templates only after sanitizing. Values shorter than
    /// [`MIN_AUDITED_SECRET_LENGTH`] are skipped. The error names the file
    /// only.
    pub fn check_literals(
        &self,
        path: &str,
        content: &str,
        secrets: &[&str],
    ) -> GenerationResult<()> {
        let leaked = secrets
            .iter()
            .map(|secret| secret.trim())
            .filter(|secret| secret.chars().count() >= MIN_AUDITED_SECRET_LENGTH)
            .any(|secret| content.contains(secret) || content.contains(&sanitize_str(secret)));

        if leaked {
            return Err(GenerationError::SecretLeak {
                path: path.to_string(),
            });
        }
        Ok(())
    }

    /// Names of the suspicious patterns found in `content`.
    pub fn scan_patterns(&self, content: &str) -> Vec<&'static str> {
        self.patterns
            .iter()
            .filter(|(_, regex)| regex.is_match(content))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Run both checks, logging a warning for each pattern match.
    pub fn audit(&self, path: &str, content: &str, secrets: &[&str]) -> GenerationResult<()> {
        self.check_literals(path, content, secrets)?;

        for pattern in self.scan_patterns(content) {
            warn!(
                message = "Generated file contains text shaped like a credential",
                path = path,
                pattern = pattern
            );
        }
        Ok(())
    }
}
