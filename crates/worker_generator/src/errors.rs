//! Generation error types.

use thiserror::Error;
use worker_config::ConfigurationError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised while generating a worker project.
///
/// Validation failures only appear here when [`crate::WorkerGenerator::generate`]
/// refuses to render an invalid configuration. None of the variants carry
/// credential values.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Configuration is invalid: {} error(s)", .errors.len())]
    ValidationFailed { errors: Vec<String> },

    #[error("Failed to build render context: {0}")]
    Context(#[from] ConfigurationError),

    #[error(transparent)]
    Template(#[from] template_engine::Error),

    #[error("Credential value found in generated file: {path}")]
    SecretLeak { path: String },

    #[error("Invalid audit pattern '{name}': {reason}")]
    AuditPattern { name: String, reason: String },
}

/// Result type alias for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;
