//! Field validators.
//!
//! Pure functions, one per field class. Each returns `Ok` when the value is
//! acceptable and a [`FieldError`] carrying a human-readable message when it
//! is not. Invalid user input is never a panic.
//!
//! # Examples
//!
//! ```rust
//! use worker_config::field_validators::{validate_worker_name, validate_sender_whitelist};
//!
//! assert!(validate_worker_name("sms-gateway").is_ok());
//! assert!(validate_worker_name("sms--gateway").is_err());
//!
//! let emails = validate_sender_whitelist("ops@example.com\n\nalerts@example.com").unwrap();
//! assert_eq!(emails.len(), 2);
//! ```

use thiserror::Error;

#[cfg(test)]
#[path = "field_validators_tests.rs"]
mod tests;

/// A single field failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FieldError {
    message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

/// Outcome of a field validator.
pub type FieldResult<T = ()> = Result<T, FieldError>;

/// Credential format rules of the SMS provider.
///
/// The defaults are Twilio's conventions and must stay as they are for
/// compatibility with exported configurations. Other providers can supply
/// their own rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRules {
    pub account_sid_prefix: &'static str,
    pub account_sid_length: usize,
    pub auth_token_min_length: usize,
}

impl Default for CredentialRules {
    fn default() -> Self {
        Self {
            account_sid_prefix: "AC",
            account_sid_length: 34,
            auth_token_min_length: 32,
        }
    }
}

const MAX_WORKER_NAME_LENGTH: usize = 63;
const MAX_DOMAIN_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;
const MAX_LOCAL_PART_LENGTH: usize = 64;

// ============================================================================
// Identity
// ============================================================================

/// Validate a worker identifier.
///
/// Must match `^[a-z0-9-]{1,63}$`, must not start or end with a hyphen and
/// must not contain consecutive hyphens.
pub fn validate_worker_name(name: &str) -> FieldResult {
    if name.is_empty() {
        return Err(FieldError::new("Worker name is required"));
    }

    let charset_ok = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !charset_ok || name.len() > MAX_WORKER_NAME_LENGTH {
        return Err(FieldError::new(
            "Worker name must be lowercase, 1-63 characters, letters/numbers/hyphens only",
        ));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(FieldError::new("Worker name cannot start or end with hyphen"));
    }

    if name.contains("--") {
        return Err(FieldError::new(
            "Worker name cannot contain consecutive hyphens",
        ));
    }

    Ok(())
}

/// Validate a DNS domain name (case-insensitive).
pub fn validate_domain(domain: &str) -> FieldResult {
    if domain.is_empty() {
        return Err(FieldError::new("Domain is required"));
    }

    if is_valid_domain(domain) {
        Ok(())
    } else {
        Err(FieldError::new("Invalid domain format (e.g., example.com)"))
    }
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.len() > MAX_DOMAIN_LENGTH {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    // TLD: at least two letters
    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);

    labels_ok && tld_ok
}

/// Validate an email address (`local@domain`, case-insensitive).
///
/// The local part accepts letters, digits and `. _ % + -`; it may not start
/// or end with a dot or contain consecutive dots.
pub fn validate_email(email: &str) -> FieldResult {
    if email.is_empty() {
        return Err(FieldError::new("Email is required"));
    }

    if is_valid_email(email) {
        Ok(())
    } else {
        Err(FieldError::new("Invalid email format"))
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if domain.contains('@') {
        return false;
    }

    let local_ok = !local.is_empty()
        && local.len() <= MAX_LOCAL_PART_LENGTH
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'));

    local_ok && is_valid_domain(domain)
}

/// Validate an inbound address pattern such as `*@sms.{domain}`.
///
/// The wildcard and the domain placeholder are replaced with sample values
/// and the result must be a valid email address.
pub fn validate_email_pattern(pattern: &str) -> FieldResult {
    if pattern.is_empty() {
        return Err(FieldError::new("Email pattern is required"));
    }

    if !pattern.contains('@') {
        return Err(FieldError::new("Email pattern must contain @ symbol"));
    }

    let sample = pattern
        .replace('*', "a")
        .replace(crate::schema::DOMAIN_PLACEHOLDER, "example.com");

    if is_valid_email(&sample) {
        Ok(())
    } else {
        Err(FieldError::new("Invalid email pattern format"))
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Validate a phone number in E.164 form: `+`, then 2 to 15 digits, the
/// first of which is not zero. The number must also be assigned in the
/// numbering plan of its country code.
pub fn validate_phone_number(phone: &str) -> FieldResult {
    if phone.is_empty() {
        return Err(FieldError::new("Phone number is required"));
    }

    let Some(digits) = phone.strip_prefix('+') else {
        return Err(FieldError::new(
            "Invalid phone number format (use E.164: +14155552671)",
        ));
    };

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::new(
            "Phone number may only contain digits after the leading '+'",
        ));
    }

    if !(2..=15).contains(&digits.len()) {
        return Err(FieldError::new(
            "Phone number must have between 2 and 15 digits",
        ));
    }

    if digits.starts_with('0') {
        return Err(FieldError::new("Phone number country code cannot start with 0"));
    }

    match phonenumber::parse(None, phone) {
        Ok(number) if phonenumber::is_valid(&number) => Ok(()),
        _ => Err(FieldError::new("Invalid phone number")),
    }
}

/// Validate a Twilio Account SID: `AC` followed by 32 hex characters.
pub fn validate_account_sid(sid: &str) -> FieldResult {
    validate_account_sid_with(sid, &CredentialRules::default())
}

/// Validate an account SID against explicit provider rules.
pub fn validate_account_sid_with(sid: &str, rules: &CredentialRules) -> FieldResult {
    if sid.is_empty() {
        return Err(FieldError::new("Twilio Account SID is required"));
    }

    if !sid.starts_with(rules.account_sid_prefix) {
        return Err(FieldError::new(format!(
            "Twilio SID must start with '{}'",
            rules.account_sid_prefix
        )));
    }

    if sid.chars().count() != rules.account_sid_length {
        return Err(FieldError::new(format!(
            "Twilio SID must be exactly {} characters",
            rules.account_sid_length
        )));
    }

    if !sid[rules.account_sid_prefix.len()..]
        .chars()
        .all(|c| c.is_ascii_hexdigit())
    {
        return Err(FieldError::new("Invalid Twilio SID format"));
    }

    Ok(())
}

/// Validate a Twilio auth token: at least 32 characters, no other format.
pub fn validate_auth_token(token: &str) -> FieldResult {
    validate_auth_token_with(token, &CredentialRules::default())
}

/// Validate an auth token against explicit provider rules.
pub fn validate_auth_token_with(token: &str, rules: &CredentialRules) -> FieldResult {
    if token.is_empty() {
        return Err(FieldError::new("Twilio Auth Token is required"));
    }

    if token.chars().count() < rules.auth_token_min_length {
        return Err(FieldError::new(format!(
            "Twilio Auth Token must be at least {} characters",
            rules.auth_token_min_length
        )));
    }

    Ok(())
}

// ============================================================================
// Generic values
// ============================================================================

/// Validate an `http`/`https` URL with a host.
pub fn validate_url(value: &str) -> FieldResult {
    if value.is_empty() {
        return Err(FieldError::new("URL is required"));
    }

    let parsed = url::Url::parse(value).map_err(|_| FieldError::new("Invalid URL format"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FieldError::new("URL must start with http:// or https://"));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(FieldError::new("URL must include a host")),
    }
}

/// Validate that `value >= min` and, when given, `value <= max`.
pub fn validate_integer_range(value: i64, min: i64, max: Option<i64>) -> FieldResult {
    if value < min {
        return Err(FieldError::new(format!("Value must be at least {}", min)));
    }

    if let Some(max) = max {
        if value > max {
            return Err(FieldError::new(format!("Value must be at most {}", max)));
        }
    }

    Ok(())
}

/// Parse raw form text as an integer and check its range.
///
/// Text that is not an integer is reported separately from an out-of-range
/// value.
pub fn validate_integer_text(raw: &str, min: i64, max: Option<i64>) -> FieldResult<i64> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| FieldError::new("Value must be an integer"))?;

    validate_integer_range(value, min, max)?;
    Ok(value)
}

// ============================================================================
// Lists
// ============================================================================

/// Validate a newline-separated sender allow-list.
///
/// Blank input yields an empty list. Every non-blank line must be a valid
/// email address; a single bad line rejects the whole block and is named in
/// the error.
pub fn validate_sender_whitelist(text: &str) -> FieldResult<Vec<String>> {
    parse_lines(text, |line| {
        validate_email(line).map_err(|_| FieldError::new(format!("Invalid email: {}", line)))
    })
}

/// Validate a newline-separated list of allowed sender domains.
pub fn validate_domain_whitelist(text: &str) -> FieldResult<Vec<String>> {
    parse_lines(text, |line| {
        validate_domain(line).map_err(|_| FieldError::new(format!("Invalid domain: {}", line)))
    })
}

fn parse_lines(text: &str, check: impl Fn(&str) -> FieldResult) -> FieldResult<Vec<String>> {
    let mut accepted = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        check(line)?;
        accepted.push(line.to_string());
    }

    Ok(accepted)
}

// ============================================================================
// Output paths
// ============================================================================

/// Sanitize a user-influenced file or directory name.
///
/// Keeps only `[A-Za-z0-9 ._-]`, collapses whitespace and hyphen runs to a
/// single hyphen and dot runs to a single dot, trims leading and trailing
/// dots and spaces, then lowercases. Path separators, `..` and shell
/// metacharacters cannot survive.
pub fn sanitize_filename(filename: &str) -> String {
    let kept: String = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == ' ');

    let mut result = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        let c = if c == ' ' { '-' } else { c };
        let last = result.chars().last();
        if (c == '-' && last == Some('-')) || (c == '.' && last == Some('.')) {
            continue;
        }
        result.push(c);
    }

    result.to_lowercase()
}
