//! Errors raised while converting leaves and walking documents.

use docform_core::{InvalidObjectId, RadixError, ReferenceError};
use thiserror::Error;

/// A single leaf could not be converted by its registered type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The value's JSON/storage kind is not accepted by the type.
    #[error("{type_name} expects {expected}, got {found}")]
    UnexpectedValue {
        /// Registered type name.
        type_name: String,
        /// What the type accepts.
        expected: &'static str,
        /// Kind of the rejected value.
        found: &'static str,
    },

    /// The value has the right kind but an unacceptable content.
    #[error("{type_name}: {reason}")]
    Invalid {
        /// Registered type name.
        type_name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A prefixed numeric string failed to decode.
    #[error(transparent)]
    Radix(#[from] RadixError),

    /// An identifier string was malformed.
    #[error(transparent)]
    ObjectId(#[from] InvalidObjectId),

    /// The schema named a binary encoding this crate does not know.
    #[error("unknown binary encoding {0:?}")]
    UnknownEncoding(String),
}

/// A document walk failed; no partially converted output is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscodeError {
    /// The node at this position must be an object or an array.
    #[error("only composite objects and arrays are supported at this level: found {found} at {path}")]
    UnsupportedShape {
        /// Document path of the offending node.
        path: String,
        /// Kind of the offending node.
        found: &'static str,
    },

    /// A leaf failed to convert.
    #[error("cannot convert {path} as {type_name}: {source}")]
    Leaf {
        /// Document path of the leaf.
        path: String,
        /// The `mongoType` applied.
        type_name: String,
        /// The underlying conversion failure.
        #[source]
        source: ConversionError,
    },

    /// The schema contains a `$ref` that cannot be resolved.
    #[error("schema reference error: {0}")]
    Reference(#[from] ReferenceError),
}
