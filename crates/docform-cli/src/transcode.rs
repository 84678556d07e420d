//! # Transcode Subcommand
//!
//! Converts a document (or batch) with the master schema's `mongoType`
//! annotations and prints the result as pretty JSON.
//!
//! - `--to storage` reads a value-form document and prints the tagged
//!   storage dump (`{"int32": 42}`, `{"objectId": "…"}`, …).
//! - `--to value` reads a storage dump and prints plain value form.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use docform_codec::{transcode, ToStorage, ToValue};
use docform_core::StoredValue;
use serde_json::Value;

use crate::config::CliConfig;
use crate::input::{load_typed, load_value};

/// Direction of a transcode run.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Value form to storage dump.
    Storage,
    /// Storage dump to value form.
    Value,
}

/// Arguments for the transcode subcommand.
#[derive(Args, Debug)]
pub struct TranscodeArgs {
    /// Master schema file (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Form to convert the document into.
    #[arg(long, value_enum)]
    pub to: Target,

    /// Document or batch to convert (JSON or YAML).
    pub document: PathBuf,
}

/// Convert without printing.
pub fn transcode_output(args: &TranscodeArgs, config: &CliConfig) -> Result<Value> {
    let master = load_value(&args.schema)?;
    let registry = config.registry()?;
    match args.to {
        Target::Storage => {
            let document = load_value(&args.document)?;
            let stored = transcode::<ToStorage>(&registry, &document, Some(&master))
                .with_context(|| format!("cannot convert {} to storage form", args.document.display()))?;
            Ok(serde_json::to_value(&stored)?)
        }
        Target::Value => {
            let stored: StoredValue = load_typed(&args.document)?;
            let value = transcode::<ToValue>(&registry, &stored, Some(&master))
                .with_context(|| format!("cannot convert {} to value form", args.document.display()))?;
            Ok(value)
        }
    }
}

/// Execute the transcode subcommand.
pub fn run_transcode(args: &TranscodeArgs, config: &CliConfig) -> Result<u8> {
    let output = transcode_output(args, config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn fixture(dir: &Path, name: &str, content: &Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(content).unwrap()).unwrap();
        path
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "n": {"type": "string", "mongoType": "int32"},
                "blob": {"type": "string", "mongoType": "binary"}
            }
        })
    }

    #[test]
    fn test_to_storage_then_back() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = fixture(dir.path(), "schema.json", &schema());
        let to_storage = TranscodeArgs {
            schema: schema_path.clone(),
            to: Target::Storage,
            document: fixture(dir.path(), "doc.json", &json!({"n": "42", "blob": "hi"})),
        };
        let dump = transcode_output(&to_storage, &CliConfig::default()).unwrap();
        assert_eq!(dump["document"]["n"], json!({"int32": 42}));
        assert_eq!(dump["document"]["blob"], json!({"binary": "6869"}));

        let to_value = TranscodeArgs {
            schema: schema_path,
            to: Target::Value,
            document: fixture(dir.path(), "dump.json", &dump),
        };
        let value = transcode_output(&to_value, &CliConfig::default()).unwrap();
        assert_eq!(value, json!({"n": 42, "blob": "hi"}));
    }

    #[test]
    fn test_default_encoding_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = TranscodeArgs {
            schema: fixture(dir.path(), "schema.json", &schema()),
            to: Target::Storage,
            document: fixture(dir.path(), "doc.json", &json!({"blob": "aGk="})),
        };
        let config = CliConfig {
            default_encoding: Some("base64".into()),
            ..CliConfig::default()
        };
        let dump = transcode_output(&args, &config).unwrap();
        assert_eq!(dump["document"]["blob"], json!({"binary": "6869"}));
    }

    #[test]
    fn test_bad_leaf_reports_document() {
        let dir = tempfile::tempdir().unwrap();
        let args = TranscodeArgs {
            schema: fixture(dir.path(), "schema.json", &schema()),
            to: Target::Storage,
            document: fixture(dir.path(), "doc.json", &json!({"n": "forty-two"})),
        };
        let err = transcode_output(&args, &CliConfig::default()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("doc.json"), "{message}");
        assert!(message.contains("$.n"), "{message}");
    }
}
