//! Configuration validation types and the worker configuration validator.
//!
//! Validation collects every failure in a single pass so the caller can show
//! all problems at once. Failures are returned as data, never as `Err`.
//!
//! # Examples
//!
//! ```rust
//! use worker_config::{ConfigurationValidator, WorkerConfig, WorkerConfigValidator};
//!
//! let validator = WorkerConfigValidator::new();
//! let result = validator.validate(&WorkerConfig::default());
//!
//! // The default configuration has no domain or credentials yet.
//! assert!(!result.is_valid());
//! for error in &result.errors {
//!     eprintln!("Validation error: {} - {}", error.field_path, error.message);
//! }
//! ```

use crate::{
    field_validators::{
        validate_account_sid_with, validate_auth_token_with, validate_domain, validate_email,
        validate_email_pattern, validate_phone_number, validate_url, validate_worker_name,
        CredentialRules, FieldResult,
    },
    schema::{
        BasicSettings, CloudflareSettings, IntegrationSettings, RateLimitSettings, RetrySettings,
        RoutingSettings, SecuritySettings, TwilioSettings,
    },
    WorkerConfig,
};
use tracing::debug;

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// Smallest allowed [`RoutingSettings::max_message_length`].
pub const MIN_MESSAGE_LENGTH: i64 = 160;

/// Largest allowed [`RoutingSettings::max_message_length`].
pub const MAX_MESSAGE_LENGTH: i64 = 1600;

/// Smallest allowed [`RetrySettings::max_retries`].
pub const MIN_RETRIES: i64 = 1;

/// Largest allowed [`RetrySettings::max_retries`].
pub const MAX_RETRIES: i64 = 5;

/// Result of configuration validation.
///
/// Validation is considered successful only if no errors are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Validation errors in the order they were found.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty validation result.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Check if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add a validation error.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Human-readable messages, one per failure, in validation order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// Record a field validator outcome against `field_path`.
    fn check(&mut self, field_path: &str, outcome: FieldResult) {
        if let Err(e) = outcome {
            self.add_error(ValidationError {
                error_type: ValidationErrorType::InvalidValue,
                field_path: field_path.to_string(),
                message: e.into_message(),
                suggestion: None,
            });
        }
    }

    fn violation(
        &mut self,
        error_type: ValidationErrorType,
        field_path: &str,
        message: impl Into<String>,
        suggestion: Option<&str>,
    ) {
        self.add_error(ValidationError {
            error_type,
            field_path: field_path.to_string(),
            message: message.into(),
            suggestion: suggestion.map(str::to_string),
        });
    }
}

/// Individual validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The category of validation error.
    pub error_type: ValidationErrorType,
    /// Dot-separated path to the field that failed validation.
    pub field_path: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    pub suggestion: Option<String>,
}

/// Validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorType {
    /// A required field is missing or empty.
    RequiredFieldMissing,
    /// A field value is malformed or out of range.
    InvalidValue,
    /// A rule spanning several fields was violated.
    BusinessRuleViolation,
}

impl std::fmt::Display for ValidationErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequiredFieldMissing => write!(f, "RequiredFieldMissing"),
            Self::InvalidValue => write!(f, "InvalidValue"),
            Self::BusinessRuleViolation => write!(f, "BusinessRuleViolation"),
        }
    }
}

/// Configuration validation service.
///
/// Implementations validate every aspect of the configuration and collect
/// all errors in a single pass.
pub trait ConfigurationValidator: Send + Sync {
    /// Validate a complete worker configuration.
    fn validate(&self, config: &WorkerConfig) -> ValidationResult;
}

/// Validator applying the worker configuration rules.
///
/// Sections are checked in a fixed order: identity, credentials, routing,
/// rate limiting, retry, integrations, then security and platform settings.
#[derive(Debug, Clone, Default)]
pub struct WorkerConfigValidator {
    credential_rules: CredentialRules,
}

impl WorkerConfigValidator {
    /// Create a validator using Twilio's credential rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with provider-specific credential rules.
    pub fn with_credential_rules(credential_rules: CredentialRules) -> Self {
        Self { credential_rules }
    }

    fn validate_basic(&self, basic: &BasicSettings, result: &mut ValidationResult) {
        result.check("basic.worker_name", validate_worker_name(&basic.worker_name));
        result.check("basic.domain", validate_domain(&basic.domain));
        result.check(
            "basic.email_pattern",
            validate_email_pattern(&basic.email_pattern),
        );
    }

    fn validate_twilio(&self, twilio: &TwilioSettings, result: &mut ValidationResult) {
        result.check(
            "twilio.account_sid",
            validate_account_sid_with(&twilio.account_sid, &self.credential_rules),
        );
        result.check(
            "twilio.auth_token",
            validate_auth_token_with(&twilio.auth_token, &self.credential_rules),
        );
        result.check(
            "twilio.phone_number",
            validate_phone_number(&twilio.phone_number),
        );
    }

    fn validate_routing(&self, routing: &RoutingSettings, result: &mut ValidationResult) {
        if routing.max_message_length < MIN_MESSAGE_LENGTH {
            result.violation(
                ValidationErrorType::InvalidValue,
                "routing.max_message_length",
                format!("Max message length must be at least {}", MIN_MESSAGE_LENGTH),
                Some("A single SMS segment holds 160 characters"),
            );
        }

        if routing.max_message_length > MAX_MESSAGE_LENGTH {
            result.violation(
                ValidationErrorType::InvalidValue,
                "routing.max_message_length",
                format!("Max message length cannot exceed {}", MAX_MESSAGE_LENGTH),
                Some("Twilio rejects message bodies longer than 1600 characters"),
            );
        }

        if !is_country_code(&routing.default_country_code) {
            result.violation(
                ValidationErrorType::InvalidValue,
                "routing.default_country_code",
                format!(
                    "Default country code must be '+' followed by 1-3 digits, got: {}",
                    routing.default_country_code
                ),
                Some("Use a calling code such as +1 or +44"),
            );
        }
    }

    fn validate_rate_limit(&self, rate_limit: &RateLimitSettings, result: &mut ValidationResult) {
        if !rate_limit.enabled {
            return;
        }

        if rate_limit.per_sender < 1 {
            result.violation(
                ValidationErrorType::InvalidValue,
                "rate_limit.per_sender",
                "Rate limit per sender must be at least 1",
                Some("Disable rate limiting instead of using zero"),
            );
        }

        if rate_limit.per_recipient < 1 {
            result.violation(
                ValidationErrorType::InvalidValue,
                "rate_limit.per_recipient",
                "Rate limit per recipient must be at least 1",
                Some("Disable rate limiting instead of using zero"),
            );
        }

        if rate_limit.global_limit < 1 {
            result.violation(
                ValidationErrorType::InvalidValue,
                "rate_limit.global_limit",
                "Global rate limit must be at least 1",
                None,
            );
        }
    }

    fn validate_retry(&self, retry: &RetrySettings, result: &mut ValidationResult) {
        if !retry.enabled {
            return;
        }

        if !(MIN_RETRIES..=MAX_RETRIES).contains(&retry.max_retries) {
            result.violation(
                ValidationErrorType::InvalidValue,
                "retry.max_retries",
                format!(
                    "Max retries must be between {} and {}",
                    MIN_RETRIES, MAX_RETRIES
                ),
                None,
            );
        }

        if retry.retry_delay < 1 {
            result.violation(
                ValidationErrorType::InvalidValue,
                "retry.retry_delay",
                "Retry delay must be at least 1 second",
                None,
            );
        }
    }

    fn validate_integrations(
        &self,
        integrations: &IntegrationSettings,
        result: &mut ValidationResult,
    ) {
        let email = integrations
            .notification_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        match email {
            None if integrations.enable_error_notifications => result.violation(
                ValidationErrorType::RequiredFieldMissing,
                "integrations.notification_email",
                "Notification email is required when error notifications are enabled",
                Some("Provide an address or disable error notifications"),
            ),
            Some(email) => {
                if let Err(e) = validate_email(email) {
                    result.violation(
                        ValidationErrorType::InvalidValue,
                        "integrations.notification_email",
                        format!("Notification email: {}", e),
                        None,
                    );
                }
            }
            None => {}
        }

        if let Some(webhook) = &integrations.notification_webhook {
            if let Err(e) = validate_url(webhook) {
                result.violation(
                    ValidationErrorType::InvalidValue,
                    "integrations.notification_webhook",
                    format!("Notification webhook: {}", e),
                    None,
                );
            }
        }

        for name in integrations.custom_headers.keys() {
            if !is_header_token(name) {
                result.violation(
                    ValidationErrorType::InvalidValue,
                    &format!("integrations.custom_headers.{}", name),
                    format!("Custom header name '{}' is not a valid HTTP header name", name),
                    Some("Use letters, digits and hyphens, e.g. X-Source"),
                );
            }
        }
    }

    fn validate_security(&self, security: &SecuritySettings, result: &mut ValidationResult) {
        for (index, sender) in security.sender_whitelist.iter().enumerate() {
            if validate_email(sender).is_err() {
                result.violation(
                    ValidationErrorType::InvalidValue,
                    &format!("security.sender_whitelist[{}]", index),
                    format!("Invalid email: {}", sender),
                    None,
                );
            }
        }

        for (index, domain) in security.domain_whitelist.iter().enumerate() {
            if validate_domain(domain).is_err() {
                result.violation(
                    ValidationErrorType::InvalidValue,
                    &format!("security.domain_whitelist[{}]", index),
                    format!("Invalid domain: {}", domain),
                    None,
                );
            }
        }

        if security.enable_sender_whitelist && security.sender_whitelist.is_empty() {
            debug!(
                message = "Sender allow-list enabled but empty; all senders are accepted"
            );
        }
    }

    fn validate_cloudflare(&self, cloudflare: &CloudflareSettings, result: &mut ValidationResult) {
        if chrono::NaiveDate::parse_from_str(&cloudflare.compatibility_date, "%Y-%m-%d").is_err() {
            result.violation(
                ValidationErrorType::InvalidValue,
                "cloudflare.compatibility_date",
                format!(
                    "Compatibility date must be a YYYY-MM-DD date, got: {}",
                    cloudflare.compatibility_date
                ),
                None,
            );
        }
    }
}

impl ConfigurationValidator for WorkerConfigValidator {
    fn validate(&self, config: &WorkerConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        self.validate_basic(&config.basic, &mut result);
        self.validate_twilio(&config.twilio, &mut result);
        self.validate_routing(&config.routing, &mut result);
        self.validate_rate_limit(&config.rate_limit, &mut result);
        self.validate_retry(&config.retry, &mut result);
        self.validate_integrations(&config.integrations, &mut result);
        self.validate_security(&config.security, &mut result);
        self.validate_cloudflare(&config.cloudflare, &mut result);

        debug!(
            message = "Configuration validated",
            worker = %config.basic.worker_name,
            error_count = result.errors.len()
        );

        result
    }
}

fn is_country_code(code: &str) -> bool {
    code.strip_prefix('+')
        .map(|digits| {
            (1..=3).contains(&digits.len())
                && !digits.starts_with('0')
                && digits.chars().all(|c| c.is_ascii_digit())
        })
        .unwrap_or(false)
}

fn is_header_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}
