//! # docform CLI entry point
//!
//! Parses command-line arguments, initializes logging from the verbosity
//! count, loads the optional config file and dispatches to subcommand
//! handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docform_cli::config::CliConfig;
use docform_cli::derive::{run_derive, DeriveArgs};
use docform_cli::transcode::{run_transcode, TranscodeArgs};
use docform_cli::validate::{run_validate, ValidateArgs};

/// docform: insert/update schemas and storage conversion from one
/// annotated master schema.
#[derive(Parser, Debug)]
#[command(name = "docform", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the insert and update schemas derived from a master schema.
    Derive(DeriveArgs),

    /// Validate a document or batch against one mode schema.
    Validate(ValidateArgs),

    /// Convert a document between value form and storage form.
    Transcode(TranscodeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "docform starting");

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Derive(args) => run_derive(args, &config),
        Commands::Validate(args) => run_validate(args, &config),
        Commands::Transcode(args) => run_transcode(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
