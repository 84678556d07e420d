//! # Binary String Encodings
//!
//! The `binary` type stores raw bytes but exposes them to application code
//! as a string. The schema's `encoding` annotation picks how the string is
//! read and written; the same encoding is used in both directions.
//!
//! | name(s)                     | value form                               |
//! |-----------------------------|------------------------------------------|
//! | `utf8`, `utf-8`, *(empty)*  | the bytes as UTF-8 text                  |
//! | `hex`                       | two lowercase hex digits per byte        |
//! | `base64`                    | standard alphabet, padded                |
//! | `base64url`                 | URL-safe alphabet, unpadded              |
//! | `latin1`, `binary`          | one char per byte (low 8 bits)           |
//! | `ascii`                     | one char per byte (low 7 bits on output) |
//! | `utf16le`, `ucs2`           | UTF-16 code units, little-endian         |
//!
//! Names are case-insensitive.

use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};

use crate::error::ConversionError;

/// A string ↔ bytes encoding for `binary` leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BinaryEncoding {
    /// UTF-8 text.
    #[default]
    Utf8,
    /// Hexadecimal digits.
    Hex,
    /// Standard base64.
    Base64,
    /// URL-safe base64 without padding.
    Base64Url,
    /// ISO-8859-1, one byte per char.
    Latin1,
    /// 7-bit ASCII.
    Ascii,
    /// UTF-16 little-endian.
    Utf16Le,
}

impl FromStr for BinaryEncoding {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "utf8" | "utf-8" => Ok(Self::Utf8),
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "latin1" | "binary" => Ok(Self::Latin1),
            "ascii" => Ok(Self::Ascii),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Self::Utf16Le),
            _ => Err(ConversionError::UnknownEncoding(s.to_string())),
        }
    }
}

impl BinaryEncoding {
    /// Read a value-form string into bytes.
    ///
    /// # Errors
    ///
    /// [`ConversionError::Invalid`] when the string is not well-formed for a
    /// strict encoding (`hex`, `base64`, `base64url`).
    pub fn decode(&self, s: &str) -> Result<Vec<u8>, ConversionError> {
        let invalid = |reason: String| ConversionError::Invalid {
            type_name: "binary".to_string(),
            reason,
        };
        match self {
            Self::Utf8 => Ok(s.as_bytes().to_vec()),
            Self::Hex => hex::decode(s).map_err(|e| invalid(format!("invalid hex: {e}"))),
            Self::Base64 => general_purpose::STANDARD
                .decode(s)
                .map_err(|e| invalid(format!("invalid base64: {e}"))),
            Self::Base64Url => general_purpose::URL_SAFE_NO_PAD
                .decode(s.trim_end_matches('='))
                .map_err(|e| invalid(format!("invalid base64url: {e}"))),
            Self::Latin1 | Self::Ascii => Ok(s.chars().map(|c| (u32::from(c) & 0xff) as u8).collect()),
            Self::Utf16Le => Ok(s.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        }
    }

    /// Render bytes as a value-form string.
    ///
    /// Invalid UTF-8/UTF-16 sequences are replaced with U+FFFD; a trailing
    /// odd byte is dropped for `utf16le`.
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Hex => hex::encode(bytes),
            Self::Base64 => general_purpose::STANDARD.encode(bytes),
            Self::Base64Url => general_purpose::URL_SAFE_NO_PAD.encode(bytes),
            Self::Latin1 => bytes.iter().map(|b| char::from(*b)).collect(),
            Self::Ascii => bytes.iter().map(|b| char::from(*b & 0x7f)).collect(),
            Self::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
        }
    }
}
