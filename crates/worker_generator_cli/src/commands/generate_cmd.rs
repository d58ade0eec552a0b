use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use template_engine::validate_file_path;
use tracing::{debug, info, instrument};
use worker_config::schema::DEFAULT_WORKER_NAME;
use worker_config::{sanitize_filename, WorkerConfig};
use worker_generator::{GeneratedFiles, WorkerGenerator};

use crate::commands::config_cmd::print_validation_errors;
use crate::errors::Error;

#[cfg(test)]
#[path = "generate_cmd_tests.rs"]
mod tests;

/// Arguments for the generate command
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Configuration document (.json or .toml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Directory in which the project directory is created
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Replace files in an existing project directory
    #[arg(long)]
    pub force: bool,
}

/// Validate the configuration, render the project and write it to disk.
///
/// Returns the project directory. Nothing is written when validation fails.
#[instrument(skip(args), fields(config = ?args.config, out = ?args.out))]
pub fn generate_project(args: &GenerateArgs) -> Result<PathBuf, Error> {
    let config = WorkerConfig::load(&args.config)?;
    let generator = WorkerGenerator::new()?;

    let result = generator.validate(&config);
    if !result.is_valid() {
        print_validation_errors(&result);
        return Err(Error::ValidationFailed {
            count: result.errors.len(),
        });
    }

    let files = generator.generate_all(&config)?;
    let project_dir = args.out.join(project_dir_name(&config));
    write_files(&project_dir, &files, args.force)?;

    info!(
        message = "Project written",
        path = ?project_dir,
        files = files.len()
    );
    Ok(project_dir)
}

/// Directory name for the generated project, derived from the worker name.
///
/// Falls back to the default worker name when nothing survives sanitizing.
pub fn project_dir_name(config: &WorkerConfig) -> String {
    let name = sanitize_filename(&config.basic.worker_name);
    if name.is_empty() {
        DEFAULT_WORKER_NAME.to_string()
    } else {
        name
    }
}

/// Write `files` below `project_dir`.
///
/// Every relative path is checked before anything touches the disk. An
/// existing `project_dir` is only reused when `force` is set. Shell scripts
/// are made executable on Unix.
pub fn write_files(project_dir: &Path, files: &GeneratedFiles, force: bool) -> Result<(), Error> {
    if project_dir.exists() && !force {
        return Err(Error::OutputExists {
            path: project_dir.display().to_string(),
        });
    }

    for relative in files.keys() {
        validate_file_path(relative).map_err(|e| Error::UnsafePath(e.to_string()))?;
    }

    fs::create_dir_all(project_dir).map_err(write_error(project_dir))?;

    for (relative, content) in files {
        let target = project_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(write_error(parent))?;
        }
        fs::write(&target, content).map_err(write_error(&target))?;
        debug!(message = "Wrote file", path = ?target, bytes = content.len());

        if relative.ends_with(".sh") {
            make_executable(&target)?;
        }
    }

    Ok(())
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::WriteFile {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path).map_err(write_error(path))?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions).map_err(write_error(path))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), Error> {
    Ok(())
}
