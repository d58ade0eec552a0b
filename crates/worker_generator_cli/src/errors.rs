use std::io;

use thiserror::Error;
use worker_config::ConfigurationError;
use worker_generator::GenerationError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the worker-gen CLI application.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration document could not be read, parsed or written.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    /// The configuration loaded but broke one or more rules.
    ///
    /// The individual messages have already been printed.
    #[error("Configuration is invalid: {count} error(s)")]
    ValidationFailed { count: usize },

    /// Rendering or the post-render audit failed.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The target directory or file exists and `--force` was not given.
    #[error("Refusing to overwrite {path} (use --force)")]
    OutputExists { path: String },

    /// A generated path would escape the output directory.
    #[error("Unsafe output path: {0}")]
    UnsafePath(String),

    /// Failed to write a file or directory.
    #[error("Failed to write {path}.")]
    WriteFile {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to serialize command output.
    #[error("Failed to serialize output: {0}")]
    Serialize(String),
}

impl Error {
    /// Process exit code: 1 for problems with the user's input, 2 for
    /// failures while producing output.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::ValidationFailed { .. }
            | Error::OutputExists { .. } => 1,
            Error::Generation(_)
            | Error::UnsafePath(_)
            | Error::WriteFile { .. }
            | Error::Serialize(_) => 2,
        }
    }
}
