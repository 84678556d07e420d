//! # docform-schema: Mode Schemas & Validation
//!
//! Turns one annotated master schema into the two schemas writes are checked
//! against, and applies them.
//!
//! ## Derivation (`derive`, `field_spec`)
//!
//! [`derive_mode_schema`] specializes the master schema for a [`Mode`]:
//! `$ref`s are inlined, `required` is narrowed to the `upsert` branch plus
//! the mode's own branch, and properties listed in `unmodifiableProperties`
//! are removed. A property both required and unmodifiable in the same mode
//! is rejected rather than silently dropping one of the two constraints.
//!
//! ## Validation (`validate`, `config`)
//!
//! [`derive_validation_data`] derives and compiles both modes once. Each
//! [`ModeSchema`] validates a single document or a batch; a batch stops at
//! its first failing element and reports that element's index.
//!
//! ## Façade (`model`)
//!
//! [`DocumentModel`] bundles the master schema with its validation data:
//! `prepare` validates then converts to storage form, `present` converts
//! back.
//!
//! ## Crate Policy
//!
//! - Depends on `docform-core` and `docform-codec` internally.
//! - Derivation never mutates the master schema; transcoding always uses the
//!   master schema, never a mode schema.
//!
//! [`Mode`]: docform_core::Mode

pub mod config;
pub mod derive;
pub mod error;
pub mod field_spec;
pub mod model;
pub mod validate;

pub use config::{SchemaDraft, ValidatorConfig};
pub use derive::{derive_mode_schema, UNMODIFIABLE_KEY};
pub use error::SchemaError;
pub use field_spec::FieldSpec;
pub use model::{DocumentModel, ModelError};
pub use validate::{
    derive_validation_data, derive_validation_data_with, validate, DocumentValidationError,
    ModeSchema, ValidationData, ValidationViolations, Violation,
};
