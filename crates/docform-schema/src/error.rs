//! Errors raised while deriving and compiling mode schemas.

use docform_core::{Mode, ReferenceError};
use thiserror::Error;

/// Error deriving a mode schema from a master schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A property is both required and unmodifiable in the same mode.
    #[error("property '{property}' at {path} is both required and unmodifiable in {mode} mode")]
    RequiredUnmodifiable {
        /// The conflicting property name.
        property: String,
        /// Schema path of the node declaring both constraints.
        path: String,
        /// Mode in which the conflict arises.
        mode: Mode,
    },

    /// `unmodifiableProperties` is declared on a node that allows extra
    /// properties, so removing a property would not forbid it.
    #[error("unmodifiableProperties at {path} requires additionalProperties to be false")]
    UnmodifiableWithoutClosedProperties {
        /// Schema path of the offending node.
        path: String,
    },

    /// A `required` or `unmodifiableProperties` value has the wrong shape.
    #[error("invalid {keyword} at {path}: {reason}")]
    InvalidFieldSpec {
        /// The keyword being read.
        keyword: &'static str,
        /// Schema path of the node carrying the keyword.
        path: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A `$ref` could not be inlined.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// The derived schema could not be compiled into a validator.
    #[error("{mode} schema does not compile: {reason}")]
    ValidatorBuild {
        /// Mode whose schema failed.
        mode: Mode,
        /// Compiler message.
        reason: String,
    },
}
