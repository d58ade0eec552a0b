//! Template engine for the email-to-SMS worker generator.
//!
//! This crate renders the fixed set of worker project documents from a
//! sanitized context. It knows nothing about the configuration schema; the
//! caller supplies a [`TemplateContext`] and receives text.

pub mod catalog;
mod errors;
pub mod handlebars_engine;
pub mod sanitizer;

pub use catalog::{TemplateCatalog, TemplateId};
pub use errors::Error;
pub use handlebars_engine::{
    comment_text, shell_quote, validate_file_path, HandlebarsError, HandlebarsTemplateEngine,
    TemplateContext, TemplateRenderConfig,
};
pub use sanitizer::{contains_live_delimiter, sanitize_str, sanitize_value};
