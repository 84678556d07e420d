//! # docform-core: Foundational Types
//!
//! Leaf crate of the docform workspace. Every other crate depends on it; it
//! depends on nothing internal.
//!
//! ## Contents
//!
//! - [`StoredValue`]: the storage-form document tree, with 12-byte
//!   [`ObjectId`]s, 16-byte [`Decimal128`] slots, raw binary and UTC dates.
//! - [`Mode`]: `insert` or `update`, selecting which branch of a
//!   `required`/`unmodifiableProperties` declaration applies.
//! - [`radix`]: `0x`/`b` prefixed numeric strings to little-endian bytes
//!   and back.
//! - [`reference`]: local `$ref` resolution shared by schema derivation and
//!   transcoding.
//! - [`Shape`]/[`Tree`]: closed leaf/list/map classification used by every
//!   recursive document walk.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `docform-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod mode;
pub mod radix;
pub mod reference;
pub mod shape;
pub mod stored;

// Re-export primary types for ergonomic imports.
pub use error::{RadixError, ReferenceError};
pub use mode::Mode;
pub use radix::{decode_prefixed, decode_prefixed_fixed, encode_trimmed_hex};
pub use reference::{resolve as resolve_ref, Resolved, REF_KEY};
pub use shape::{Shape, Tree};
pub use stored::{format_instant, Decimal128, InvalidObjectId, ObjectId, StoredDocument, StoredValue};
