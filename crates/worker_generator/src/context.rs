//! Projection of a [`WorkerConfig`] into the data bound to templates.
//!
//! The projection drops the credential section entirely, adds a `derived`
//! object with values computed from the configuration, and sanitizes every
//! string so user text can never be re-read as template syntax.

use crate::GenerationResult;
use serde_json::{json, Value};
use template_engine::{sanitize_value, TemplateContext};
use tracing::debug;
use worker_config::{
    sms_segments, LogStorage, RateLimitStorage, SmsEncoding, WorkerConfig,
};

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

/// Written into `wrangler.toml` when no KV namespace id is configured.
pub const KV_NAMESPACE_ID_PLACEHOLDER: &str = "REPLACE_WITH_KV_NAMESPACE_ID";

/// Sections that never reach a template.
const CREDENTIAL_SECTIONS: [&str; 1] = ["twilio"];

/// Build the sanitized render context for `config`.
pub fn build_render_context(config: &WorkerConfig) -> GenerationResult<TemplateContext> {
    let mut value = config.to_value()?;

    if let Value::Object(sections) = &mut value {
        for section in CREDENTIAL_SECTIONS {
            sections.remove(section);
        }
        sections.insert("derived".to_string(), derived_values(config));
    }

    debug!(
        message = "Built render context",
        worker_name = %config.basic.worker_name
    );
    Ok(TemplateContext::new(sanitize_value(value)))
}

/// Values computed from the configuration that templates need as-is.
pub fn derived_values(config: &WorkerConfig) -> Value {
    let security = &config.security;

    let sender_whitelist = active_list(security.enable_sender_whitelist, &security.sender_whitelist);
    let domain_whitelist = active_list(security.enable_domain_whitelist, &security.domain_whitelist);

    let max_length = usize::try_from(config.routing.max_message_length).unwrap_or(0);

    json!({
        "kv_binding": config.kv_namespace_name(),
        "kv_namespace_id": config
            .cloudflare
            .kv_namespace_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(KV_NAMESPACE_ID_PLACEHOLDER),
        "analytics_dataset": config.analytics_dataset_name(),
        "parsed_email_pattern": config.parsed_email_pattern(),
        "example_email": config.example_email(),
        "max_segments": sms_segments(max_length, SmsEncoding::Gsm7),
        "uses_kv": uses_kv(config),
        "uses_analytics": uses_analytics(config),
        "sender_whitelist_active": !sender_whitelist.is_empty(),
        "sender_whitelist_count": sender_whitelist.len(),
        "sender_whitelist": sender_whitelist,
        "domain_whitelist_active": !domain_whitelist.is_empty(),
        "domain_whitelist_count": domain_whitelist.len(),
        "domain_whitelist": domain_whitelist,
    })
}

/// Whether the worker needs a KV namespace binding.
pub fn uses_kv(config: &WorkerConfig) -> bool {
    (config.rate_limit.enabled && config.rate_limit.storage == RateLimitStorage::Kv)
        || (config.logging.enabled && config.logging.storage_type == LogStorage::Kv)
}

/// Whether the worker needs an Analytics Engine dataset binding.
pub fn uses_analytics(config: &WorkerConfig) -> bool {
    config.logging.enabled && config.logging.storage_type == LogStorage::AnalyticsEngine
}

fn active_list(enabled: bool, entries: &[String]) -> Vec<String> {
    if !enabled {
        return Vec::new();
    }

    entries
        .iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}
