//! Import and export of configuration documents.
//!
//! Documents are JSON (the export format) or TOML. Missing keys are filled
//! from schema defaults, so a document exported by an older version still
//! loads.

use crate::{ConfigurationError, ConfigurationResult, WorkerConfig};
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;

/// Supported document formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Determine the format from a path's extension.
    pub fn from_path(path: &Path) -> ConfigurationResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigurationError::UnsupportedFormat { extension }),
        }
    }
}

impl WorkerConfig {
    /// Parse a JSON document. Absent keys take their default values.
    pub fn from_json_str(text: &str) -> ConfigurationResult<Self> {
        serde_json::from_str(text).map_err(|e| ConfigurationError::ParseError {
            reason: e.to_string(),
        })
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string_pretty(&self) -> ConfigurationResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigurationError::SerializationError {
            reason: e.to_string(),
        })
    }

    /// Parse a TOML document. Absent keys take their default values.
    pub fn from_toml_str(text: &str) -> ConfigurationResult<Self> {
        toml::from_str(text).map_err(|e| ConfigurationError::ParseError {
            reason: e.to_string(),
        })
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> ConfigurationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigurationError::SerializationError {
            reason: e.to_string(),
        })
    }

    /// Convert into a generic JSON value.
    pub fn to_value(&self) -> ConfigurationResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ConfigurationError::SerializationError {
            reason: e.to_string(),
        })
    }

    /// Build from a generic JSON value. Absent keys take their default values.
    pub fn from_value(value: serde_json::Value) -> ConfigurationResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigurationError::ParseError {
            reason: e.to_string(),
        })
    }

    /// Load a configuration document, picking the parser by extension.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> ConfigurationResult<Self> {
        let format = DocumentFormat::from_path(path)?;

        if !path.exists() {
            return Err(ConfigurationError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let text = fs::read_to_string(path).map_err(|e| ConfigurationError::FileAccessError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!(message = "Parsing configuration document", format = ?format);

        match format {
            DocumentFormat::Json => Self::from_json_str(&text),
            DocumentFormat::Toml => Self::from_toml_str(&text),
        }
    }

    /// Write the configuration to `path` in the format its extension names.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> ConfigurationResult<()> {
        let text = match DocumentFormat::from_path(path)? {
            DocumentFormat::Json => self.to_json_string_pretty()?,
            DocumentFormat::Toml => self.to_toml_string()?,
        };

        fs::write(path, text).map_err(|e| ConfigurationError::FileAccessError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!(message = "Configuration document written");
        Ok(())
    }

    /// A copy safe to share: credentials and the notification address are
    /// replaced by `<FIELD_PLACEHOLDER>` markers.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.twilio.account_sid = placeholder("account_sid");
        copy.twilio.auth_token = placeholder("auth_token");
        copy.twilio.phone_number = placeholder("phone_number");
        if copy.integrations.notification_email.is_some() {
            copy.integrations.notification_email = Some(placeholder("notification_email"));
        }
        copy
    }
}

fn placeholder(field: &str) -> String {
    format!("<{}_PLACEHOLDER>", field.to_uppercase())
}

/// JSON Schema describing the configuration document.
pub fn json_schema() -> ConfigurationResult<serde_json::Value> {
    let schema = schemars::schema_for!(WorkerConfig);
    serde_json::to_value(&schema).map_err(|e| ConfigurationError::SerializationError {
        reason: e.to_string(),
    })
}
