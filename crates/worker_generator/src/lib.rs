//! Generation orchestrator for the email-to-SMS worker project.
//!
//! [`WorkerGenerator`] ties the pieces together:
//!
//! 1. [`WorkerGenerator::validate`] runs every configuration rule and returns
//!    all failures as data.
//! 2. [`WorkerGenerator::generate_all`] stamps the generation time, builds
//!    the sanitized render context, renders the eight project documents and
//!    audits them for credential literals.
//! 3. [`WorkerGenerator::generate`] does both, refusing to render an invalid
//!    configuration.
//!
//! A generator holds only read-only state (compiled templates, compiled
//! audit patterns), so one instance can serve concurrent callers.
//!
//! # Examples
//!
//! ```rust
//! use worker_config::WorkerConfig;
//! use worker_generator::WorkerGenerator;
//!
//! let generator = WorkerGenerator::new()?;
//!
//! let mut config = WorkerConfig::default();
//! config.basic.worker_name = "sms-gateway".to_string();
//! config.basic.domain = "example.com".to_string();
//! config.twilio.account_sid = format!("AC{}", "0123456789abcdef".repeat(2));
//! config.twilio.auth_token = "f".repeat(32);
//! config.twilio.phone_number = "+14155552671".to_string();
//!
//! let files = generator.generate(&config)?;
//! assert_eq!(files.len(), 8);
//! assert!(files.contains_key("wrangler.toml"));
//! # Ok::<(), worker_generator::GenerationError>(())
//! ```

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use template_engine::{TemplateCatalog, TemplateId};
use tracing::{debug, info, instrument, warn};
use worker_config::{
    ConfigurationValidator, ValidationResult, WorkerConfig, WorkerConfigValidator,
};

pub mod context;
mod errors;
pub mod secrets;

pub use context::{build_render_context, KV_NAMESPACE_ID_PLACEHOLDER};
pub use errors::{GenerationError, GenerationResult};
pub use secrets::{SecretAuditor, MIN_AUDITED_SECRET_LENGTH};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Generated documents keyed by their path relative to the project root.
pub type GeneratedFiles = BTreeMap<String, String>;

/// Validates configurations and renders worker projects from them.
pub struct WorkerGenerator {
    validator: Box<dyn ConfigurationValidator>,
    catalog: TemplateCatalog,
    auditor: SecretAuditor,
}

impl WorkerGenerator {
    /// Create a generator using the standard configuration rules.
    pub fn new() -> GenerationResult<Self> {
        Self::with_validator(WorkerConfigValidator::new())
    }

    /// Create a generator with a custom validator, for example one built
    /// with provider-specific credential rules.
    pub fn with_validator<V>(validator: V) -> GenerationResult<Self>
    where
        V: ConfigurationValidator + 'static,
    {
        Ok(Self {
            validator: Box::new(validator),
            catalog: TemplateCatalog::new()?,
            auditor: SecretAuditor::new()?,
        })
    }

    /// Check the configuration, collecting every failure.
    #[instrument(skip(self, config), fields(worker_name = %config.basic.worker_name))]
    pub fn validate(&self, config: &WorkerConfig) -> ValidationResult {
        let result = self.validator.validate(config);
        if result.is_valid() {
            debug!(message = "Configuration is valid");
        } else {
            info!(
                message = "Configuration failed validation",
                error_count = result.errors.len()
            );
        }
        result
    }

    /// Render every project document, stamped with the current time.
    ///
    /// Does not validate; see [`WorkerGenerator::generate`].
    pub fn generate_all(&self, config: &WorkerConfig) -> GenerationResult<GeneratedFiles> {
        self.generate_all_at(config, Utc::now())
    }

    /// Render every project document, stamped with `generated_at`.
    ///
    /// Output depends only on `config` and `generated_at`. Either all eight
    /// documents are returned or an error is.
    #[instrument(skip(self, config), fields(worker_name = %config.basic.worker_name))]
    pub fn generate_all_at(
        &self,
        config: &WorkerConfig,
        generated_at: DateTime<Utc>,
    ) -> GenerationResult<GeneratedFiles> {
        let mut stamped = config.clone();
        stamped.stamp_generation_time(generated_at);

        let context = build_render_context(&stamped)?;
        let secrets = stamped.twilio.secret_values();

        let mut files = GeneratedFiles::new();
        for id in TemplateId::ALL {
            let path = id.output_path();
            let content = self.catalog.render(id, &context)?;
            self.auditor.audit(path, &content, &secrets)?;

            debug!(message = "Rendered document", path = path, bytes = content.len());
            files.insert(path.to_string(), content);
        }

        info!(message = "Generated worker project", files = files.len());
        Ok(files)
    }

    /// Validate, then render. An invalid configuration is never rendered.
    pub fn generate(&self, config: &WorkerConfig) -> GenerationResult<GeneratedFiles> {
        let result = self.validate(config);
        if !result.is_valid() {
            warn!(
                message = "Refusing to generate from an invalid configuration",
                error_count = result.errors.len()
            );
            return Err(GenerationError::ValidationFailed {
                errors: result.messages(),
            });
        }

        self.generate_all(config)
    }
}
