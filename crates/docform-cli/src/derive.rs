//! # Derive Subcommand
//!
//! Prints the mode schema(s) derived from a master schema as pretty JSON.
//! Both schemas are compiled before printing, so a schema the validator
//! cannot use is reported here rather than at first use.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use docform_core::Mode;
use docform_schema::derive_validation_data_with;
use serde_json::{json, Value};

use crate::config::CliConfig;
use crate::input::load_value;

/// Arguments for the derive subcommand.
#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Master schema file (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Print only this mode's schema (insert or update).
    #[arg(long)]
    pub mode: Option<Mode>,
}

/// Derive the requested schema(s) without printing.
pub fn derive_output(args: &DeriveArgs, config: &CliConfig) -> Result<Value> {
    let master = load_value(&args.schema)?;
    let data = derive_validation_data_with(&master, &config.validator)?;
    Ok(match args.mode {
        Some(mode) => data.get(mode).schema().clone(),
        None => json!({
            "insert": data.insert.schema(),
            "update": data.update.schema(),
        }),
    })
}

/// Execute the derive subcommand.
pub fn run_derive(args: &DeriveArgs, config: &CliConfig) -> Result<u8> {
    let output = derive_output(args, config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}
