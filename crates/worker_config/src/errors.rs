//! Configuration system error types.
//!
//! Domain-specific errors for loading, parsing and saving worker
//! configuration documents. Validation problems are not errors; they are
//! reported as data through [`crate::ValidationResult`].

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Configuration system errors.
///
/// These errors occur when a configuration document cannot be read,
/// parsed or written. They never carry credential values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to access configuration file: {path} - {reason}")]
    FileAccessError { path: String, reason: String },

    #[error("Failed to parse configuration: {reason}")]
    ParseError { reason: String },

    #[error("Failed to serialize configuration: {reason}")]
    SerializationError { reason: String },

    #[error("Unsupported configuration format: {extension} (expected .json or .toml)")]
    UnsupportedFormat { extension: String },
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
