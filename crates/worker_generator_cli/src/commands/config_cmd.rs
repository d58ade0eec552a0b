use std::path::Path;

use colored::Colorize;
use tracing::{debug, error, info, instrument};
use worker_config::{
    json_schema, ConfigurationValidator, ValidationResult, WorkerConfig, WorkerConfigValidator,
};

use crate::errors::Error;

#[cfg(test)]
#[path = "config_cmd_tests.rs"]
mod tests;

/// Configuration document used when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "worker-config.json";

/// Write a default configuration document to `path`.
#[instrument]
pub fn init_config(path: &Path, force: bool) -> Result<(), Error> {
    debug!(message = "Initializing configuration", path = ?path);

    if path.exists() && !force {
        let err = Error::OutputExists {
            path: path.display().to_string(),
        };
        error!(message = "Configuration file already exists", path = ?path);
        return Err(err);
    }

    WorkerConfig::default().save(path)?;

    info!(message = "Configuration initialized", path = ?path);
    Ok(())
}

/// Load and check a configuration document, printing every failure.
#[instrument]
pub fn validate_config(path: &Path) -> Result<WorkerConfig, Error> {
    let config = WorkerConfig::load(path)?;
    let result = WorkerConfigValidator::new().validate(&config);

    if !result.is_valid() {
        print_validation_errors(&result);
        return Err(Error::ValidationFailed {
            count: result.errors.len(),
        });
    }

    info!(message = "Configuration is valid", path = ?path);
    Ok(config)
}

/// Print validation failures to stderr, one per line.
pub fn print_validation_errors(result: &ValidationResult) {
    eprintln!(
        "{}",
        format!("{} validation error(s):", result.errors.len())
            .red()
            .bold()
    );
    for e in &result.errors {
        eprintln!("  {} {}", format!("{}:", e.field_path).yellow(), e.message);
        if let Some(suggestion) = &e.suggestion {
            eprintln!("      {}", suggestion.dimmed());
        }
    }
}

/// Normalized JSON form of a configuration document.
///
/// Missing sections come back filled with defaults. With `redact` the
/// credentials and notification address are replaced by placeholders.
#[instrument]
pub fn export_config(path: &Path, redact: bool) -> Result<String, Error> {
    let config = WorkerConfig::load(path)?;
    let config = if redact { config.redacted() } else { config };
    Ok(config.to_json_string_pretty()?)
}

/// JSON Schema of the configuration document, pretty printed.
pub fn schema_document() -> Result<String, Error> {
    let schema = json_schema()?;
    serde_json::to_string_pretty(&schema).map_err(|e| Error::Serialize(e.to_string()))
}
