//! # Validate Subcommand
//!
//! Validates a document, or a batch given as a JSON array, against one mode
//! schema. Exits 0 when valid and 2 when a document is rejected; other
//! failures (unreadable files, bad schemas) exit 1.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use docform_core::Mode;
use docform_schema::{derive_validation_data_with, DocumentValidationError};

use crate::config::CliConfig;
use crate::input::load_value;
use crate::EXIT_INVALID;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Master schema file (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Write mode to validate for (insert or update).
    #[arg(long)]
    pub mode: Mode,

    /// Document or batch to validate (JSON or YAML).
    pub document: PathBuf,
}

/// Validate without printing. `Ok(Err(_))` is a rejected document.
pub fn check(args: &ValidateArgs, config: &CliConfig) -> Result<Result<(), DocumentValidationError>> {
    let master = load_value(&args.schema)?;
    let document = load_value(&args.document)?;
    let data = derive_validation_data_with(&master, &config.validator)?;
    Ok(data.get(args.mode).validate(&document))
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    match check(args, config)? {
        Ok(()) => {
            println!("OK: {} is valid for {}", args.document.display(), args.mode);
            Ok(0)
        }
        Err(rejected) => {
            println!("FAIL: {}: {rejected}", args.document.display());
            Ok(EXIT_INVALID)
        }
    }
}
