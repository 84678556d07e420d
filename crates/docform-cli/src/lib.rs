//! # docform-cli: Command-Line Interface
//!
//! Provides the `docform` binary for working with annotated master schemas
//! outside an application.
//!
//! ## Subcommands
//!
//! - `docform derive`: print the insert and/or update schema.
//! - `docform validate`: check a document or batch against a mode schema.
//! - `docform transcode`: convert a document between value form and the
//!   tagged storage dump format.
//!
//! ```bash
//! docform derive --schema user.schema.yaml --mode update
//! docform validate --schema user.schema.yaml --mode insert new-users.json
//! docform transcode --schema user.schema.yaml --to storage user.json
//! ```
//!
//! Schema and document files are read as YAML when their extension is
//! `.yaml`/`.yml` and as JSON otherwise.

pub mod config;
pub mod derive;
pub mod input;
pub mod transcode;
pub mod validate;

/// Exit code for a document that failed validation.
pub const EXIT_INVALID: u8 = 2;
