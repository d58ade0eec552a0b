//! # Handlebars Template Engine
//!
//! Wraps a Handlebars registry configured for generating source files rather
//! than HTML: output is never HTML-escaped, strict mode turns a reference to
//! a missing variable into an error, and a small set of helpers emits values
//! in the native syntax of the target file.
//!
//! ## Helpers
//!
//! | Helper        | Output                                                   |
//! |---------------|----------------------------------------------------------|
//! | `json`        | JSON literal of any value (also valid TS and TOML)       |
//! | `shell_quote` | Single-quoted POSIX shell word                           |
//! | `upper_case`  | `SOME TEXT`                                              |
//! | `default`     | First parameter, or the second when the first is null    |
//! | `comment`     | One line of text safe inside `#`, `//` and `/* */` notes |
//!
//! The built-in `if`, `unless`, `each`, `eq`, `and`, `or` and `not` helpers
//! remain available.
//!
//! ## Examples
//!
//! ```rust
//! # use template_engine::{HandlebarsTemplateEngine, TemplateContext};
//! # use serde_json::json;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = HandlebarsTemplateEngine::new()?;
//! engine.register_custom_helpers()?;
//!
//! let context = TemplateContext::new(json!({
//!     "worker": "sms-gateway",
//!     "flags": ["nodejs_compat"]
//! }));
//!
//! let result = engine.render_template("name = {{json worker}}\nflags = {{json flags}}", &context)?;
//! assert_eq!(result, "name = \"sms-gateway\"\nflags = [\"nodejs_compat\"]");
//! # Ok(())
//! # }
//! ```

use handlebars::{
    Context, Handlebars, Helper, HelperDef, JsonRender, Output, RenderContext, RenderError,
    RenderErrorReason,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
#[path = "handlebars_tests.rs"]
mod tests;

// ================================
// Custom Handlebars Helpers
// ================================

fn string_param<'a>(h: &'a Helper<'_>, helper: &str) -> Result<&'a str, RenderError> {
    h.param(0).and_then(|v| v.value().as_str()).ok_or_else(|| {
        RenderErrorReason::Other(format!("{} helper requires a string parameter", helper)).into()
    })
}

/// Helper emitting a value as a JSON literal.
///
/// Strings become double-quoted and escaped, arrays and objects become
/// compact JSON. The result is valid in JSON, TypeScript and TOML.
struct JsonHelper;

impl HelperDef for JsonHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> Result<(), RenderError> {
        let value = h
            .param(0)
            .ok_or_else(|| RenderErrorReason::ParamNotFoundForIndex("json", 0))?;

        let literal = serde_json::to_string(value.value())
            .map_err(|e| RenderErrorReason::Other(format!("json helper failed: {}", e)))?;

        out.write(&literal)?;
        Ok(())
    }
}

/// Helper quoting a value as a single POSIX shell word.
struct ShellQuoteHelper;

impl HelperDef for ShellQuoteHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> Result<(), RenderError> {
        let param = string_param(h, "shell_quote")?;
        out.write(&shell_quote(param))?;
        Ok(())
    }
}

/// Quote `text` so a POSIX shell reads it back as exactly one word.
pub fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Helper to convert text to UPPER_CASE format.
struct UpperCaseHelper;

impl HelperDef for UpperCaseHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> Result<(), RenderError> {
        let param = string_param(h, "upper_case")?;
        out.write(&param.to_uppercase())?;
        Ok(())
    }
}

/// Helper emitting text that stays inside a line or block comment.
struct CommentHelper;

impl HelperDef for CommentHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> Result<(), RenderError> {
        let param = string_param(h, "comment")?;
        out.write(&comment_text(param))?;
        Ok(())
    }
}

/// Flatten `text` to a single line and break up block-comment terminators.
///
/// Line breaks and other control characters become spaces, so a `#` or
/// `//` comment cannot spill onto the next line, and `*/` becomes `* /`.
pub fn comment_text(text: &str) -> String {
    let line: String = text
        .chars()
        .map(|c| {
            if c.is_control() || c == '\u{2028}' || c == '\u{2029}' {
                ' '
            } else {
                c
            }
        })
        .collect();

    line.replace("*/", "* /")
}

/// Helper to provide default values for null variables.
struct DefaultHelper;

impl HelperDef for DefaultHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> Result<(), RenderError> {
        let default_value = h
            .param(1)
            .ok_or_else(|| RenderErrorReason::ParamNotFoundForIndex("default", 1))?;

        match h.param(0) {
            Some(val) if !val.value().is_null() => out.write(&val.value().render())?,
            _ => out.write(&default_value.value().render())?,
        }

        Ok(())
    }
}

/// Errors that can occur during Handlebars template processing.
#[derive(Error, Debug)]
pub enum HandlebarsError {
    /// Template compilation failed due to syntax errors.
    ///
    /// Occurs for unclosed blocks, malformed expressions and similar defects
    /// in the template body.
    #[error("Template compilation failed: {message}")]
    CompilationError {
        /// Detailed error message from the Handlebars parser
        message: String,
    },

    /// Template rendering failed during execution.
    ///
    /// Typically a type mismatch in a helper parameter.
    #[error("Template rendering failed: {message}")]
    RenderError {
        /// Detailed error message from the Handlebars renderer
        message: String,
    },

    /// A path produced for an output document is unsafe.
    ///
    /// Generated paths must stay relative to the output root: no `..`, no
    /// absolute or drive-letter paths, no NUL bytes.
    #[error("Invalid file path: {path} - {reason}")]
    InvalidPath {
        /// The problematic path
        path: String,
        /// Specific reason why the path is invalid
        reason: String,
    },

    /// The template referenced a variable the context does not provide.
    #[error("Variable validation failed: {variable} - {reason}")]
    VariableValidation {
        /// Path of the missing variable
        variable: String,
        /// Error message from the renderer
        reason: String,
    },

    /// The context could not be converted into a JSON value.
    #[error("Template context could not be built: {message}")]
    ContextError {
        /// Serialization failure description
        message: String,
    },

    /// Template processing exceeded resource limits.
    #[error("Resource limit exceeded: {limit_type} - {message}")]
    ResourceLimit {
        /// Type of resource limit that was exceeded
        limit_type: String,
        /// Detailed message about the limit violation
        message: String,
    },
}

impl From<RenderError> for HandlebarsError {
    fn from(e: RenderError) -> Self {
        let message = e.to_string();
        match e.reason() {
            RenderErrorReason::MissingVariable(path) => HandlebarsError::VariableValidation {
                variable: path.clone().unwrap_or_else(|| "unknown".to_string()),
                reason: message,
            },
            RenderErrorReason::TemplateError(_) => HandlebarsError::CompilationError { message },
            _ => HandlebarsError::RenderError { message },
        }
    }
}

/// Data bound to a template during rendering.
///
/// Variables are held as a JSON value so nested sections, lists and maps
/// can be addressed with `{{section.field}}` paths.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateContext {
    pub variables: Value,
}

impl TemplateContext {
    /// Creates a new template context with the provided variables.
    pub fn new(variables: Value) -> Self {
        Self { variables }
    }

    /// Creates a context from any serializable value.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, HandlebarsError> {
        let variables = serde_json::to_value(value).map_err(|e| HandlebarsError::ContextError {
            message: e.to_string(),
        })?;
        Ok(Self::new(variables))
    }
}

/// Configuration for template rendering behavior.
#[derive(Debug, Clone)]
pub struct TemplateRenderConfig {
    /// Whether to fail on undefined variables (true) or render them empty (false).
    ///
    /// **Default**: `true`
    pub strict_variables: bool,

    /// Maximum size of template content in bytes.
    ///
    /// **Default**: 1MB (1,048,576 bytes)
    pub max_template_size: usize,
}

impl Default for TemplateRenderConfig {
    fn default() -> Self {
        Self {
            strict_variables: true,
            max_template_size: 1_048_576, // 1MB
        }
    }
}

/// Handlebars engine configured for source-file generation.
///
/// Named templates are compiled once with [`register_template`] and can then
/// be rendered any number of times. The engine holds no mutable state while
/// rendering, so a shared reference can be used from several threads.
///
/// [`register_template`]: HandlebarsTemplateEngine::register_template
pub struct HandlebarsTemplateEngine {
    handlebars: Handlebars<'static>,
    config: TemplateRenderConfig,
}

impl HandlebarsTemplateEngine {
    /// Creates a new engine with default configuration.
    ///
    /// Custom helpers must be registered separately using
    /// [`register_custom_helpers`](Self::register_custom_helpers).
    pub fn new() -> Result<Self, HandlebarsError> {
        Self::with_config(TemplateRenderConfig::default())
    }

    /// Creates a new engine with custom configuration.
    pub fn with_config(config: TemplateRenderConfig) -> Result<Self, HandlebarsError> {
        let mut handlebars = Handlebars::new();

        handlebars.set_strict_mode(config.strict_variables);
        handlebars.register_escape_fn(handlebars::no_escape);

        Ok(Self { handlebars, config })
    }

    /// Registers the source-generation helpers listed in the module docs.
    pub fn register_custom_helpers(&mut self) -> Result<(), HandlebarsError> {
        self.handlebars.register_helper("json", Box::new(JsonHelper));
        self.handlebars
            .register_helper("shell_quote", Box::new(ShellQuoteHelper));
        self.handlebars
            .register_helper("upper_case", Box::new(UpperCaseHelper));
        self.handlebars
            .register_helper("default", Box::new(DefaultHelper));
        self.handlebars
            .register_helper("comment", Box::new(CommentHelper));

        Ok(())
    }

    /// Compiles `source` and stores it under `name`.
    ///
    /// # Errors
    ///
    /// - `HandlebarsError::ResourceLimit`: the body exceeds the size limit
    /// - `HandlebarsError::CompilationError`: the body is not valid Handlebars
    pub fn register_template(&mut self, name: &str, source: &str) -> Result<(), HandlebarsError> {
        self.check_size(source)?;

        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| HandlebarsError::CompilationError {
                message: format!("{}: {}", name, e),
            })?;

        debug!(message = "Registered template", name = name, bytes = source.len());
        Ok(())
    }

    /// Whether a template has been registered under `name`.
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Renders a previously registered template.
    pub fn render_named(
        &self,
        name: &str,
        context: &TemplateContext,
    ) -> Result<String, HandlebarsError> {
        Ok(self.handlebars.render(name, &context.variables)?)
    }

    /// Compiles and renders an ad-hoc template string.
    ///
    /// # Errors
    ///
    /// - `HandlebarsError::CompilationError`: Template syntax is invalid
    /// - `HandlebarsError::RenderError`: Template rendering failed
    /// - `HandlebarsError::VariableValidation`: A referenced variable is missing
    /// - `HandlebarsError::ResourceLimit`: Template exceeds the size limit
    pub fn render_template(
        &self,
        template: &str,
        context: &TemplateContext,
    ) -> Result<String, HandlebarsError> {
        self.check_size(template)?;
        Ok(self
            .handlebars
            .render_template(template, &context.variables)?)
    }

    fn check_size(&self, template: &str) -> Result<(), HandlebarsError> {
        if template.len() > self.config.max_template_size {
            return Err(HandlebarsError::ResourceLimit {
                limit_type: "template_size".to_string(),
                message: format!(
                    "Template size {} bytes exceeds limit of {} bytes",
                    template.len(),
                    self.config.max_template_size
                ),
            });
        }
        Ok(())
    }
}

/// Validates that a generated output path is relative and stays inside the
/// output root.
///
/// # Examples
///
/// ```rust
/// use template_engine::validate_file_path;
///
/// assert!(validate_file_path("src/index.ts").is_ok());
/// assert!(validate_file_path(".env.example").is_ok());
///
/// assert!(validate_file_path("../../../etc/passwd").is_err());
/// assert!(validate_file_path("/absolute/path").is_err());
/// ```
pub fn validate_file_path(path: &str) -> Result<(), HandlebarsError> {
    let invalid = |reason: &str| HandlebarsError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(invalid("Path cannot be empty"));
    }

    if path == "." || path == ".." {
        return Err(invalid("Path cannot be '.' or '..'"));
    }

    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(invalid("Path contains directory traversal sequence '..'"));
    }

    if path.starts_with('/') || path.starts_with('\\') {
        return Err(invalid("Absolute paths are not allowed"));
    }

    if path.len() >= 2 && path.chars().nth(1) == Some(':') {
        return Err(invalid("Windows drive letters are not allowed"));
    }

    if path.contains('\0') {
        return Err(invalid("Path contains null byte"));
    }

    if path.len() > 255 {
        return Err(invalid("Path exceeds maximum length of 255 characters"));
    }

    Ok(())
}
