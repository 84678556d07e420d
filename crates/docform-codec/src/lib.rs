//! # docform-codec: Type Registry & Transcoder
//!
//! Converts documents between their plain JSON *value form* and typed
//! *storage form* ([`docform_core::StoredValue`]), guided by the
//! `mongoType`/`encoding` annotations of a master schema.
//!
//! ## Type Registry (`registry`, `builtin`)
//!
//! [`TypeRegistry`] maps a type name to a pair of leaf conversions. The
//! process-wide instance ([`registry::global`]) is created with the six
//! built-in types (`objectId`, `int32`, `int64`, `int128`, `binary`,
//! `date`) and accepts more through [`register_type`]. Unknown type names
//! pass values through untouched.
//!
//! ## Transcoder (`transcode`)
//!
//! [`to_storage_format`] and [`to_value_format`] walk a document and its
//! schema together, resolving `$ref`s, selecting per-property and
//! per-position item schemas, and converting leaves through the registry.
//! [`transcode`] does the same against an explicit registry.
//!
//! ## Crate Policy
//!
//! - Depends only on `docform-core` internally.
//! - Conversion is all-or-nothing: errors never leave a partially
//!   converted document behind.

pub mod builtin;
pub mod encoding;
pub mod error;
pub mod registry;
pub mod transcode;

pub use encoding::BinaryEncoding;
pub use error::{ConversionError, TranscodeError};
pub use registry::{register_type, TypeCodec, TypeRegistry};
pub use transcode::{to_storage_format, to_value_format, transcode, Direction, ToStorage, ToValue};
