//! The closed catalog of worker project templates.
//!
//! Each [`TemplateId`] maps to exactly one output path and one embedded
//! template body. The set is fixed at compile time; there is no directory
//! scanning and no way to register further templates through the catalog.

use crate::{Error, HandlebarsError, HandlebarsTemplateEngine, TemplateContext};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;

/// Identifier of one generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateId {
    WorkerSource,
    WranglerToml,
    PackageJson,
    TsConfig,
    EnvExample,
    GitIgnore,
    Readme,
    DeployScript,
}

impl TemplateId {
    /// Every template, in generation order.
    pub const ALL: [TemplateId; 8] = [
        TemplateId::WorkerSource,
        TemplateId::WranglerToml,
        TemplateId::PackageJson,
        TemplateId::TsConfig,
        TemplateId::EnvExample,
        TemplateId::GitIgnore,
        TemplateId::Readme,
        TemplateId::DeployScript,
    ];

    /// Stable name, also the template's registry key.
    pub fn name(&self) -> &'static str {
        match self {
            TemplateId::WorkerSource => "worker_source",
            TemplateId::WranglerToml => "wrangler_toml",
            TemplateId::PackageJson => "package_json",
            TemplateId::TsConfig => "tsconfig",
            TemplateId::EnvExample => "env_example",
            TemplateId::GitIgnore => "gitignore",
            TemplateId::Readme => "readme",
            TemplateId::DeployScript => "deploy_script",
        }
    }

    /// Path of the generated document relative to the project root.
    pub fn output_path(&self) -> &'static str {
        match self {
            TemplateId::WorkerSource => "src/index.ts",
            TemplateId::WranglerToml => "wrangler.toml",
            TemplateId::PackageJson => "package.json",
            TemplateId::TsConfig => "tsconfig.json",
            TemplateId::EnvExample => ".env.example",
            TemplateId::GitIgnore => ".gitignore",
            TemplateId::Readme => "README.md",
            TemplateId::DeployScript => "deploy.sh",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            TemplateId::WorkerSource => include_str!("../templates/index.ts.hbs"),
            TemplateId::WranglerToml => include_str!("../templates/wrangler.toml.hbs"),
            TemplateId::PackageJson => include_str!("../templates/package.json.hbs"),
            TemplateId::TsConfig => include_str!("../templates/tsconfig.json.hbs"),
            TemplateId::EnvExample => include_str!("../templates/env.example.hbs"),
            TemplateId::GitIgnore => include_str!("../templates/gitignore.hbs"),
            TemplateId::Readme => include_str!("../templates/README.md.hbs"),
            TemplateId::DeployScript => include_str!("../templates/deploy.sh.hbs"),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accepts either the template name or its output path.
impl FromStr for TemplateId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.name() == s || id.output_path() == s)
            .ok_or_else(|| Error::TemplateNotFound(s.to_string()))
    }
}

/// All catalog templates compiled into one engine.
///
/// Compilation happens once in [`TemplateCatalog::new`]; afterwards the
/// catalog is read-only and rendering is a pure function of
/// `(template, context)`.
pub struct TemplateCatalog {
    engine: HandlebarsTemplateEngine,
}

impl TemplateCatalog {
    /// Compile every catalog template.
    pub fn new() -> Result<Self, Error> {
        let mut engine = HandlebarsTemplateEngine::new().map_err(render_error("catalog"))?;
        engine
            .register_custom_helpers()
            .map_err(render_error("catalog"))?;

        for id in TemplateId::ALL {
            engine
                .register_template(id.name(), id.source())
                .map_err(render_error(id.name()))?;
        }

        debug!(message = "Template catalog compiled", templates = TemplateId::ALL.len());
        Ok(Self { engine })
    }

    /// Render one document.
    #[instrument(skip(self, context), fields(template = %id))]
    pub fn render(&self, id: TemplateId, context: &TemplateContext) -> Result<String, Error> {
        self.engine
            .render_named(id.name(), context)
            .map_err(render_error(id.name()))
    }

    /// Render a document looked up by name or output path.
    pub fn render_by_name(&self, name: &str, context: &TemplateContext) -> Result<String, Error> {
        let id: TemplateId = name.parse()?;
        self.render(id, context)
    }
}

fn render_error(template: &str) -> impl Fn(HandlebarsError) -> Error + '_ {
    move |source| Error::TemplateRender {
        template: template.to_string(),
        source,
    }
}
