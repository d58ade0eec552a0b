use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use worker_generator_cli::commands::config_cmd::{
    export_config, init_config, schema_document, validate_config, DEFAULT_CONFIG_PATH,
};
use worker_generator_cli::commands::generate_cmd::{generate_project, GenerateArgs};
use worker_generator_cli::errors::Error;

/// worker-gen: Generate Cloudflare email-to-SMS workers from a configuration
#[derive(Parser)]
#[command(name = "worker-gen")]
#[command(about = "Generate Cloudflare email-to-SMS worker projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration document
    Init {
        /// Where to write the document (.json or .toml)
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,

        /// Replace an existing document
        #[arg(long)]
        force: bool,
    },

    /// Check a configuration document and list every problem
    Validate {
        /// Configuration document (.json or .toml)
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Generate the worker project
    Generate(GenerateArgs),

    /// Print the normalized configuration document as JSON
    Export {
        /// Configuration document (.json or .toml)
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Replace credentials with placeholders
        #[arg(long)]
        redact: bool,
    },

    /// Print the JSON Schema of the configuration document
    Schema,

    /// Show the CLI version
    Version,
}

fn run(command: Commands) -> Result<(), Error> {
    match command {
        Commands::Init { path, force } => {
            init_config(&path, force)?;
            println!("Configuration initialized at {}", path.display());
        }
        Commands::Validate { config } => {
            validate_config(&config)?;
            println!("{}", "Configuration is valid".green());
        }
        Commands::Generate(args) => {
            let project_dir = generate_project(&args)?;
            println!(
                "{} {}",
                "Worker project written to".green(),
                project_dir.display()
            );
        }
        Commands::Export { config, redact } => {
            println!("{}", export_config(&config, redact)?);
        }
        Commands::Schema => {
            println!("{}", schema_document()?);
        }
        Commands::Version => {
            println!(
                "worker-gen version {}",
                option_env!("WORKER_GEN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
        }
    }
    Ok(())
}

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("WORKER_GEN_LOG"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        error!(message = "Command failed", error = %e);
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(e.exit_code());
    }
}
