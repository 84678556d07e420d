//! # Write Modes
//!
//! A write either creates a document (`insert`) or changes an existing one
//! (`update`). The mode selects which branch of a `required` or
//! `unmodifiableProperties` declaration applies; the `upsert` branch applies
//! to both.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of write a document is being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Creating a new document.
    Insert,
    /// Modifying an existing document.
    Update,
}

impl Mode {
    /// Every mode, in derivation order.
    pub const ALL: [Mode; 2] = [Mode::Insert, Mode::Update];

    /// Returns the key used for this mode in field specs and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            other => Err(format!("unknown mode {other:?}: expected 'insert' or 'update'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_mode_rejects_upsert() {
        // upsert is a field-spec branch, not a write mode.
        assert!("upsert".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Update).unwrap(), "\"update\"");
        let m: Mode = serde_json::from_str("\"insert\"").unwrap();
        assert_eq!(m, Mode::Insert);
    }
}
