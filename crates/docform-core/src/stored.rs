//! # Storage Value Tree
//!
//! `StoredValue` is the storage-form counterpart of `serde_json::Value`: the
//! same composite shape (ordered documents and arrays) with a richer set of
//! leaf types: 32/64-bit integers, 128-bit decimal slots, 12-byte object
//! identifiers, raw binary and UTC timestamps.
//!
//! ## Plain Embeddings
//!
//! Subtrees without a matching schema node are carried across unchanged.
//! Because the two forms are distinct Rust types, "unchanged" means the
//! lossless plain embedding in each direction:
//!
//! - JSON → storage: integers become `Int64`, other numbers `Double`;
//!   everything else maps to the variant of the same name.
//! - storage → JSON: `ObjectId` becomes its 24-character hex string,
//!   `Decimal128` its trimmed `0x` hex string, `Binary` lowercase hex,
//!   `DateTime` RFC 3339 with millisecond precision and a `Z` suffix.
//!   Non-finite doubles have no JSON form and become `null`.
//!
//! ## Dump Format
//!
//! `StoredValue` serializes externally tagged in camelCase
//! (`{"int32": 42}`, `{"objectId": "65f0…"}`), so storage-form documents can
//! be written out and read back without losing their leaf types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::radix::encode_trimmed_hex;

/// An ordered storage-form document.
pub type StoredDocument = IndexMap<String, StoredValue>;

/// A storage-form value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoredValue {
    /// Explicit null.
    Null,
    /// Boolean leaf.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// IEEE 754 double.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// 12-byte object identifier.
    ObjectId(ObjectId),
    /// 16-byte decimal slot.
    Decimal128(Decimal128),
    /// Raw bytes.
    Binary(#[serde(with = "hex_bytes")] Vec<u8>),
    /// UTC instant.
    DateTime(DateTime<Utc>),
    /// Ordered list.
    Array(Vec<StoredValue>),
    /// Ordered map.
    Document(StoredDocument),
}

impl StoredValue {
    /// Returns a short name for the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::ObjectId(_) => "objectId",
            Self::Decimal128(_) => "decimal128",
            Self::Binary(_) => "binary",
            Self::DateTime(_) => "date",
            Self::Array(_) => "array",
            Self::Document(_) => "document",
        }
    }

    /// Returns the inner document if this value is one.
    pub fn as_document(&self) -> Option<&StoredDocument> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Returns the inner elements if this value is an array.
    pub fn as_array(&self) -> Option<&[StoredValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this value is a document.
    pub fn get(&self, key: &str) -> Option<&StoredValue> {
        self.as_document().and_then(|doc| doc.get(key))
    }

    /// Convert to value form through the plain embedding, recursively.
    pub fn to_plain_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int32(n) => Value::from(*n),
            Self::Int64(n) => Value::from(*n),
            Self::Double(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::ObjectId(oid) => Value::String(oid.to_hex()),
            Self::Decimal128(d) => Value::String(d.to_trimmed_hex()),
            Self::Binary(bytes) => Value::String(hex::encode(bytes)),
            Self::DateTime(dt) => Value::String(format_instant(dt)),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_plain_json).collect()),
            Self::Document(doc) => Value::Object(
                doc.iter()
                    .map(|(k, v)| (k.clone(), v.to_plain_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for StoredValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int64(i),
                None => Self::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Document(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for StoredValue {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

impl From<StoredDocument> for StoredValue {
    fn from(doc: StoredDocument) -> Self {
        Self::Document(doc)
    }
}

/// Render an instant the way value-form dates are written: RFC 3339,
/// millisecond precision, `Z` suffix.
pub fn format_instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Error parsing an [`ObjectId`] from its value form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid ObjectId {input:?}: expected 24 hex characters or a 12-byte string")]
pub struct InvalidObjectId {
    /// The rejected input.
    pub input: String,
}

/// A 12-byte object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Wrap raw identifier bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Access the raw identifier bytes.
    pub fn bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Canonical 24-character lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the value form: 24 hex characters, or a string of exactly 12
    /// bytes taken verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidObjectId`] for any other input.
    pub fn parse_str(s: &str) -> Result<Self, InvalidObjectId> {
        let mut bytes = [0u8; 12];
        if s.len() == 24 {
            if hex::decode_to_slice(s, &mut bytes).is_ok() {
                return Ok(Self(bytes));
            }
        } else if s.len() == 12 {
            bytes.copy_from_slice(s.as_bytes());
            return Ok(Self(bytes));
        }
        Err(InvalidObjectId {
            input: s.to_string(),
        })
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

/// A 16-byte decimal slot holding little-endian integer bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal128([u8; 16]);

impl Decimal128 {
    /// Wrap 16 little-endian bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Store a signed integer in two's-complement little-endian layout.
    pub fn from_i128(n: i128) -> Self {
        Self(n.to_le_bytes())
    }

    /// Access the raw little-endian bytes.
    pub fn bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// `0x` rendering with high-order zero bytes trimmed; `"0x00"` when zero.
    pub fn to_trimmed_hex(&self) -> String {
        encode_trimmed_hex(&self.0)
    }
}

impl Serialize for Decimal128 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Decimal128 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
