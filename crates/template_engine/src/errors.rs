use crate::HandlebarsError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types that can occur while rendering catalog templates.
///
/// Both variants indicate a defect in the template set or in the caller,
/// never bad user input. They name the template involved and carry the
/// underlying cause, but never any context values.
///
/// # Examples
///
/// ```rust
/// use template_engine::{Error, TemplateId};
///
/// match "worker.py".parse::<TemplateId>() {
///     Ok(id) => println!("known template: {}", id),
///     Err(Error::TemplateNotFound(name)) => eprintln!("no template named {}", name),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The requested template is not part of the catalog.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A catalog template failed to compile or render.
    #[error("Failed to render template '{template}': {source}")]
    TemplateRender {
        /// Identifier of the failing template
        template: String,
        /// Underlying engine failure
        #[source]
        source: HandlebarsError,
    },
}
