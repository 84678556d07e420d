//! # Document Model
//!
//! Binds a master schema to its derived validation data so callers handle
//! one object per collection:
//!
//! - [`DocumentModel::prepare`] validates a value-form document (or batch)
//!   against the mode schema, then converts it to storage form with the
//!   master schema.
//! - [`DocumentModel::present`] converts storage-form results back to value
//!   form.
//!
//! Conversions use the process-wide type registry unless the model was
//! built with [`DocumentModel::with_registry`].

use std::sync::Arc;

use docform_codec::{transcode, ToStorage, ToValue, TranscodeError, TypeRegistry};
use docform_core::{Mode, StoredValue};
use serde_json::Value;
use thiserror::Error;

use crate::config::ValidatorConfig;
use crate::error::SchemaError;
use crate::validate::{derive_validation_data_with, DocumentValidationError, ValidationData};

/// Error from a [`DocumentModel`] operation.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The master schema could not be derived or compiled.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The document was rejected by the mode schema.
    #[error("{0}")]
    Validation(#[from] DocumentValidationError),

    /// The document could not be converted.
    #[error("transcode error: {0}")]
    Transcode(#[from] TranscodeError),
}

/// A master schema with both compiled mode schemas.
#[derive(Debug, Clone)]
pub struct DocumentModel {
    master: Value,
    validation: ValidationData,
    registry: Option<Arc<TypeRegistry>>,
}

impl DocumentModel {
    /// Derive and compile both mode schemas for `master`.
    ///
    /// # Errors
    ///
    /// [`ModelError::Schema`] if either mode fails to derive or compile.
    pub fn new(master: Value) -> Result<Self, ModelError> {
        Self::with_config(master, &ValidatorConfig::default())
    }

    /// Like [`DocumentModel::new`] with explicit validator settings.
    ///
    /// # Errors
    ///
    /// [`ModelError::Schema`] if either mode fails to derive or compile.
    pub fn with_config(master: Value, config: &ValidatorConfig) -> Result<Self, ModelError> {
        let validation = derive_validation_data_with(&master, config)?;
        Ok(Self {
            master,
            validation,
            registry: None,
        })
    }

    /// Use `registry` for conversions instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The master schema.
    pub fn master(&self) -> &Value {
        &self.master
    }

    /// Both compiled mode schemas.
    pub fn validation(&self) -> &ValidationData {
        &self.validation
    }

    /// Validate `document` for `mode`, then convert it to storage form.
    ///
    /// # Errors
    ///
    /// [`ModelError::Validation`] if the document (or a batch element) is
    /// rejected; [`ModelError::Transcode`] if conversion fails.
    pub fn prepare(&self, document: &Value, mode: Mode) -> Result<StoredValue, ModelError> {
        self.validation.get(mode).validate(document)?;
        let stored = transcode::<ToStorage>(self.registry(), document, Some(&self.master))?;
        Ok(stored)
    }

    /// Convert a storage-form document (or batch) back to value form.
    ///
    /// # Errors
    ///
    /// [`ModelError::Transcode`] if conversion fails.
    pub fn present(&self, stored: &StoredValue) -> Result<Value, ModelError> {
        Ok(transcode::<ToValue>(self.registry(), stored, Some(&self.master))?)
    }

    fn registry(&self) -> &TypeRegistry {
        match &self.registry {
            Some(registry) => registry.as_ref(),
            None => docform_codec::registry::global(),
        }
    }
}
