//! # Document Validation
//!
//! Compiles derived mode schemas with the `jsonschema` crate and applies
//! them to documents in value form.
//!
//! ## Batches
//!
//! A JSON array is a batch: every element is checked against the same
//! validator, in order. The first failing element stops the batch and is
//! reported with its index; later elements are not examined. A single
//! document that fails is reported without an index.
//!
//! Validation never modifies the document. The failing document is cloned
//! into the error so callers can log or return it.

use std::fmt;
use std::sync::Arc;

use docform_core::Mode;
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::config::ValidatorConfig;
use crate::derive::derive_mode_schema;
use crate::error::SchemaError;

/// A document (or batch element) failed validation.
#[derive(Error, Debug, Clone)]
#[error("{} failed {mode} validation:\n{violations}", describe_target(.index))]
pub struct DocumentValidationError {
    /// Mode whose schema rejected the document.
    pub mode: Mode,
    /// Position of the failing element when validating a batch.
    pub index: Option<usize>,
    /// Structured list of individual violations.
    pub violations: ValidationViolations,
    /// The rejected document.
    pub document: Value,
}

fn describe_target(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("batch element {i}"),
        None => "document".to_string(),
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl FromIterator<Violation> for ValidationViolations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A derived mode schema together with its compiled validator.
///
/// Cheap to clone; the compiled validator is shared.
#[derive(Clone)]
pub struct ModeSchema {
    mode: Mode,
    schema: Value,
    validator: Arc<Validator>,
}

impl ModeSchema {
    /// Compile an already derived schema for `mode`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ValidatorBuild`] if `jsonschema` rejects the schema.
    pub fn compile(mode: Mode, schema: Value, config: &ValidatorConfig) -> Result<Self, SchemaError> {
        let validator = config
            .options()
            .build(&schema)
            .map_err(|e| SchemaError::ValidatorBuild {
                mode,
                reason: e.to_string(),
            })?;
        Ok(Self {
            mode,
            schema,
            validator: Arc::new(validator),
        })
    }

    /// Derive the schema for `mode` from `master` and compile it.
    ///
    /// # Errors
    ///
    /// Any derivation error, or [`SchemaError::ValidatorBuild`].
    pub fn derive(master: &Value, mode: Mode, config: &ValidatorConfig) -> Result<Self, SchemaError> {
        Self::compile(mode, derive_mode_schema(master, mode)?, config)
    }

    /// The mode this schema was derived for.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The derived schema.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// True if a single document satisfies the schema.
    pub fn is_valid(&self, document: &Value) -> bool {
        self.validator.is_valid(document)
    }

    /// Every violation of a single document, empty when it is valid.
    pub fn violations(&self, document: &Value) -> ValidationViolations {
        self.validator
            .iter_errors(document)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }

    /// Validate a document, or each element of a batch.
    ///
    /// # Errors
    ///
    /// [`DocumentValidationError`] for the single document, or for the first
    /// failing batch element (with its index).
    pub fn validate(&self, document: &Value) -> Result<(), DocumentValidationError> {
        match document {
            Value::Array(batch) => {
                for (index, element) in batch.iter().enumerate() {
                    self.check(element, Some(index))?;
                }
                Ok(())
            }
            single => self.check(single, None),
        }
    }

    fn check(&self, document: &Value, index: Option<usize>) -> Result<(), DocumentValidationError> {
        let violations = self.violations(document);
        if violations.is_empty() {
            return Ok(());
        }
        tracing::debug!(mode = %self.mode, ?index, count = violations.len(), "document rejected");
        Err(DocumentValidationError {
            mode: self.mode,
            index,
            violations,
            document: document.clone(),
        })
    }
}

impl fmt::Debug for ModeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeSchema")
            .field("mode", &self.mode)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Validate `document` against an optional mode schema.
///
/// With no schema there is nothing to check and the call succeeds.
///
/// # Errors
///
/// See [`ModeSchema::validate`].
pub fn validate(document: &Value, schema: Option<&ModeSchema>) -> Result<(), DocumentValidationError> {
    match schema {
        Some(schema) => schema.validate(document),
        None => Ok(()),
    }
}

/// Compiled schemas for both write modes.
#[derive(Debug, Clone)]
pub struct ValidationData {
    /// Schema for creating documents.
    pub insert: ModeSchema,
    /// Schema for modifying documents.
    pub update: ModeSchema,
}

impl ValidationData {
    /// The schema for `mode`.
    pub fn get(&self, mode: Mode) -> &ModeSchema {
        match mode {
            Mode::Insert => &self.insert,
            Mode::Update => &self.update,
        }
    }
}

/// Derive and compile both mode schemas with the default configuration.
///
/// # Errors
///
/// The first derivation or compilation error, insert mode first.
pub fn derive_validation_data(master: &Value) -> Result<ValidationData, SchemaError> {
    derive_validation_data_with(master, &ValidatorConfig::default())
}

/// Derive and compile both mode schemas.
///
/// # Errors
///
/// The first derivation or compilation error, insert mode first.
pub fn derive_validation_data_with(
    master: &Value,
    config: &ValidatorConfig,
) -> Result<ValidationData, SchemaError> {
    Ok(ValidationData {
        insert: ModeSchema::derive(master, Mode::Insert, config)?,
        update: ModeSchema::derive(master, Mode::Update, config)?,
    })
}
