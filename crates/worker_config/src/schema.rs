//! Worker configuration schema.
//!
//! A [`WorkerConfig`] is the root aggregate collected from the form UI (or
//! imported from a previously exported document). It is composed of
//! independent sections, each serialized under its own key:
//!
//! | Key            | Section                 |
//! |----------------|-------------------------|
//! | `basic`        | [`BasicSettings`]       |
//! | `twilio`       | [`TwilioSettings`]      |
//! | `routing`      | [`RoutingSettings`]     |
//! | `rate_limit`   | [`RateLimitSettings`]   |
//! | `logging`      | [`LoggingSettings`]     |
//! | `security`     | [`SecuritySettings`]    |
//! | `retry`        | [`RetrySettings`]       |
//! | `integrations` | [`IntegrationSettings`] |
//! | `cloudflare`   | [`CloudflareSettings`]  |
//! | `features`     | [`FeatureFlags`]        |
//! | `metadata`     | [`GenerationMetadata`]  |
//!
//! Every section carries `#[serde(default)]` so a partial document fills the
//! missing pieces from the defaults below instead of failing.
//!
//! # Examples
//!
//! ```rust
//! use worker_config::WorkerConfig;
//!
//! let mut config = WorkerConfig::default();
//! config.basic.worker_name = "sms-gateway".to_string();
//! config.basic.domain = "example.com".to_string();
//!
//! assert_eq!(config.kv_namespace_name(), "SMS_GATEWAY_KV");
//! assert_eq!(config.parsed_email_pattern(), "*@sms.example.com");
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Default worker name used by a fresh configuration.
pub const DEFAULT_WORKER_NAME: &str = "email-to-sms-worker";

/// Default inbound address pattern. `*` is the wildcard, `{domain}` is
/// replaced by [`BasicSettings::domain`].
pub const DEFAULT_EMAIL_PATTERN: &str = "*@sms.{domain}";

/// Placeholder inside [`BasicSettings::email_pattern`] replaced by the domain.
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// Sample local part substituted for the wildcard in example addresses.
pub const EXAMPLE_PHONE_LOCAL_PART: &str = "15551234567";

/// Default Cloudflare compatibility date written to `wrangler.toml`.
pub const DEFAULT_COMPATIBILITY_DATE: &str = "2024-10-22";

/// Identifier recorded in [`GenerationMetadata::generated_by`].
pub const GENERATOR_ID: &str = "email-to-sms-worker-generator";

// ============================================================================
// Root aggregate
// ============================================================================

/// Complete worker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WorkerConfig {
    pub basic: BasicSettings,
    pub twilio: TwilioSettings,
    pub routing: RoutingSettings,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingSettings,
    pub security: SecuritySettings,
    pub retry: RetrySettings,
    pub integrations: IntegrationSettings,
    pub cloudflare: CloudflareSettings,
    pub features: FeatureFlags,
    pub metadata: GenerationMetadata,
}

impl WorkerConfig {
    /// Name of the KV namespace binding derived from the worker name.
    ///
    /// The worker name is uppercased, hyphens become underscores and `_KV`
    /// is appended: `email-to-sms-worker` becomes `EMAIL_TO_SMS_WORKER_KV`.
    pub fn kv_namespace_name(&self) -> String {
        format!("{}_KV", binding_stem(&self.basic.worker_name))
    }

    /// Name of the Analytics Engine dataset.
    ///
    /// Uses the configured [`CloudflareSettings::analytics_dataset_name`]
    /// when it is not blank, otherwise derives `<STEM>_ANALYTICS` from the
    /// worker name.
    pub fn analytics_dataset_name(&self) -> String {
        let configured = self.cloudflare.analytics_dataset_name.trim();
        if configured.is_empty() {
            format!("{}_ANALYTICS", binding_stem(&self.basic.worker_name))
        } else {
            configured.to_string()
        }
    }

    /// The inbound address pattern with the domain placeholder substituted.
    pub fn parsed_email_pattern(&self) -> String {
        self.basic
            .email_pattern
            .replace(DOMAIN_PLACEHOLDER, &self.basic.domain)
    }

    /// An example inbound address a user can send a test email to.
    pub fn example_email(&self) -> String {
        self.parsed_email_pattern()
            .replace('*', EXAMPLE_PHONE_LOCAL_PART)
    }

    /// Stamps the generation timestamp in ISO-8601 UTC (`2024-10-22T08:30:00Z`).
    pub fn stamp_generation_time(&mut self, at: DateTime<Utc>) {
        self.metadata.generated_at = Some(at.to_rfc3339_opts(SecondsFormat::Secs, true));
    }
}

fn binding_stem(worker_name: &str) -> String {
    worker_name.to_uppercase().replace('-', "_")
}

// ============================================================================
// Sections
// ============================================================================

/// Public-facing naming of the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BasicSettings {
    /// DNS-label-safe worker identifier.
    pub worker_name: String,
    /// Domain receiving the inbound email.
    pub domain: String,
    /// Inbound address pattern, e.g. `*@sms.{domain}`.
    pub email_pattern: String,
}

impl Default for BasicSettings {
    fn default() -> Self {
        Self {
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            domain: String::new(),
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
        }
    }
}

/// Twilio API credentials.
///
/// These values never reach a rendered document. `Debug` masks them so they
/// cannot leak through logging either.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub phone_number: String,
}

impl TwilioSettings {
    /// The credential values that must never appear in generated output.
    pub fn secret_values(&self) -> [&str; 3] {
        [&self.account_sid, &self.auth_token, &self.phone_number]
    }
}

impl fmt::Debug for TwilioSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioSettings")
            .field("account_sid", &crate::mask_sensitive_value(&self.account_sid, 4))
            .field("auth_token", &"****")
            .field("phone_number", &crate::mask_sensitive_value(&self.phone_number, 2))
            .finish()
    }
}

/// How the recipient phone number is determined from an inbound email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhoneExtractionMethod {
    /// `15551234567@sms.example.com`
    #[default]
    EmailPrefix,
    /// `Subject: To: 555-123-4567`
    SubjectLine,
    /// `X-SMS-To: +15551234567`
    CustomHeader,
    /// Try every method in order.
    AllMethods,
}

/// Which part of the email becomes the SMS text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    #[default]
    BodyText,
    BodyHtml,
    Subject,
    SubjectAndBody,
}

/// Inbound-to-outbound message mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RoutingSettings {
    pub phone_extraction_method: PhoneExtractionMethod,
    pub default_country_code: String,
    pub content_source: ContentSource,
    /// Maximum SMS length in characters, 160 to 1600.
    pub max_message_length: i64,
    pub strip_html: bool,
    pub include_sender_info: bool,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            phone_extraction_method: PhoneExtractionMethod::default(),
            default_country_code: "+1".to_string(),
            content_source: ContentSource::default(),
            max_message_length: 160,
            strip_html: true,
            include_sender_info: false,
        }
    }
}

/// Backing store for rate-limit counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStorage {
    /// Workers KV namespace (survives isolate restarts).
    #[default]
    Kv,
    /// Per-isolate memory only.
    Memory,
}

/// Throughput caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    /// Messages per sender per hour.
    pub per_sender: i64,
    /// Messages per recipient per hour.
    pub per_recipient: i64,
    /// Messages per hour across all senders.
    pub global_limit: i64,
    pub storage: RateLimitStorage,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            per_sender: 10,
            per_recipient: 20,
            global_limit: 1000,
            storage: RateLimitStorage::default(),
        }
    }
}

/// Where delivery logs are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogStorage {
    Console,
    Kv,
    #[default]
    AnalyticsEngine,
}

/// Log verbosity of the generated worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Observability of the generated worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingSettings {
    pub enabled: bool,
    pub storage_type: LogStorage,
    pub log_level: LogLevel,
    pub log_sensitive_data: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            storage_type: LogStorage::default(),
            log_level: LogLevel::default(),
            log_sensitive_data: false,
        }
    }
}

/// Sender access control.
///
/// An empty allow-list means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SecuritySettings {
    pub enable_sender_whitelist: bool,
    pub sender_whitelist: Vec<String>,
    pub enable_domain_whitelist: bool,
    pub domain_whitelist: Vec<String>,
    pub enable_content_filtering: bool,
    pub require_spf: bool,
    pub require_dkim: bool,
}

/// Delay growth between retry attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    Fixed,
    #[default]
    Exponential,
    Linear,
}

/// Failure resilience for outbound sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RetrySettings {
    pub enabled: bool,
    /// Attempts after the first failure, 1 to 5.
    pub max_retries: i64,
    /// Base delay in seconds.
    pub retry_delay: i64,
    pub backoff_strategy: BackoffStrategy,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            retry_delay: 5,
            backoff_strategy: BackoffStrategy::default(),
        }
    }
}

/// Link shortening provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UrlShortenerService {
    #[default]
    Bitly,
    Tinyurl,
}

/// Optional add-ons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IntegrationSettings {
    pub enable_url_shortening: bool,
    pub url_shortener_service: UrlShortenerService,
    pub enable_error_notifications: bool,
    /// Required when `enable_error_notifications` is set.
    pub notification_email: Option<String>,
    pub notification_webhook: Option<String>,
    /// Extra headers attached to outbound API calls, ordered by name.
    pub custom_headers: BTreeMap<String, String>,
}

/// Platform bookkeeping for the Cloudflare deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CloudflareSettings {
    pub kv_namespace_id: Option<String>,
    pub analytics_dataset_name: String,
    pub compatibility_date: String,
    pub compatibility_flags: Vec<String>,
}

impl Default for CloudflareSettings {
    fn default() -> Self {
        Self {
            kv_namespace_id: None,
            analytics_dataset_name: "EMAIL_SMS_ANALYTICS".to_string(),
            compatibility_date: DEFAULT_COMPATIBILITY_DATE.to_string(),
            compatibility_flags: vec!["nodejs_compat".to_string()],
        }
    }
}

/// Feature flags for optional functionality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FeatureFlags {
    pub enable_bidirectional: bool,
    pub enable_mms: bool,
    pub enable_scheduling: bool,
    pub enable_templates: bool,
    pub enable_analytics_dashboard: bool,
}

/// Provenance of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GenerationMetadata {
    pub version: String,
    pub generated_by: String,
    /// ISO-8601 UTC, set once at the start of a generation run.
    pub generated_at: Option<String>,
    pub author: Option<String>,
    pub notes: Option<String>,
}

impl Default for GenerationMetadata {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            generated_by: GENERATOR_ID.to_string(),
            generated_at: None,
            author: None,
            notes: None,
        }
    }
}

// ============================================================================
// SMS segmentation
// ============================================================================

/// Character encoding of an SMS body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsEncoding {
    /// 160 characters in a single segment, 153 per concatenated segment.
    Gsm7,
    /// 70 characters in a single segment, 67 per concatenated segment.
    Ucs2,
}

/// Number of SMS segments needed to carry `length` characters.
///
/// An empty message still occupies one segment.
pub fn sms_segments(length: usize, encoding: SmsEncoding) -> usize {
    let (single, multi) = match encoding {
        SmsEncoding::Gsm7 => (160, 153),
        SmsEncoding::Ucs2 => (70, 67),
    };

    if length <= single {
        1
    } else {
        (length - 1) / multi + 1
    }
}
