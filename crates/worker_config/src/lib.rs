//! Configuration model for the email-to-SMS worker generator.
//!
//! This crate owns everything about a worker configuration that does not
//! involve rendering: the typed schema, per-field validators, the
//! whole-configuration validator, and JSON/TOML import and export.

pub mod document;
pub mod errors;
pub mod field_validators;
pub mod schema;
pub mod validator;

pub use document::json_schema;
pub use errors::{ConfigurationError, ConfigurationResult};
pub use field_validators::{sanitize_filename, CredentialRules, FieldError, FieldResult};
pub use schema::{
    sms_segments, BackoffStrategy, BasicSettings, CloudflareSettings, ContentSource,
    FeatureFlags, GenerationMetadata, IntegrationSettings, LogLevel, LogStorage, LoggingSettings,
    PhoneExtractionMethod, RateLimitSettings, RateLimitStorage, RetrySettings, RoutingSettings,
    SecuritySettings, SmsEncoding, TwilioSettings, UrlShortenerService, WorkerConfig,
};
pub use validator::{
    ConfigurationValidator, ValidationError, ValidationErrorType, ValidationResult,
    WorkerConfigValidator,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Mask a sensitive value for display.
///
/// Shows the first and last `show_chars` characters and replaces the rest
/// with `*`. Values too short to keep anything hidden become `****`.
pub fn mask_sensitive_value(value: &str, show_chars: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= show_chars * 2 {
        return "****".to_string();
    }

    let head: String = chars[..show_chars].iter().collect();
    let tail: String = chars[chars.len() - show_chars..].iter().collect();
    format!(
        "{}{}{}",
        head,
        "*".repeat(chars.len() - show_chars * 2),
        tail
    )
}
