//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared by every docform crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Numeric decoding errors carry the offending input verbatim.
//! - Reference errors carry the `$ref` string and the schema path where
//!   resolution was attempted.
//! - Downstream crates define their own enums (`ConversionError`,
//!   `TranscodeError`, `SchemaError`) that wrap these with `#[from]`.
//!   `docform_schema::ModelError` is the aggregate seen by callers of the
//!   document model.

use thiserror::Error;

/// Error decoding a `0x`/`b` prefixed numeric string into bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadixError {
    /// The string starts with neither `0x` nor `b`.
    #[error("unsupported radix in numeric string {input:?}: expected a '0x' or 'b' prefix")]
    UnsupportedRadix {
        /// The rejected input.
        input: String,
    },

    /// The prefix is present but no digits follow it.
    #[error("numeric string {input:?} has no digits after its prefix")]
    Empty {
        /// The rejected input.
        input: String,
    },

    /// A character is not a digit in the selected radix.
    #[error("invalid digit {digit:?} in numeric string {input:?}")]
    InvalidDigit {
        /// The rejected input.
        input: String,
        /// The first offending character.
        digit: char,
    },

    /// The decoded value does not fit the target width.
    #[error("numeric string {input:?} needs {needed} bytes but the target holds {capacity}")]
    Overflow {
        /// The rejected input.
        input: String,
        /// Bytes required by the digits.
        needed: usize,
        /// Bytes available in the target type.
        capacity: usize,
    },
}

/// Error resolving a `$ref` against a schema root.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// A path segment does not exist in the root schema.
    #[error("unresolved reference {reference:?} at {path}")]
    Unresolved {
        /// The `$ref` value.
        reference: String,
        /// Schema path of the node carrying the reference.
        path: String,
    },

    /// The reference target is not a schema object.
    #[error("reference {reference:?} at {path} does not point to a schema object")]
    NotAnObject {
        /// The `$ref` value.
        reference: String,
        /// Schema path of the node carrying the reference.
        path: String,
    },

    /// The reference is already being expanded further up the same path.
    #[error("reference cycle through {reference:?} at {path}")]
    Cycle {
        /// The `$ref` value that closes the cycle.
        reference: String,
        /// Schema path where the cycle was detected.
        path: String,
    },
}
