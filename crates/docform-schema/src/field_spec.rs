//! # Field Specs
//!
//! `required` and `unmodifiableProperties` share one syntax:
//!
//! ```text
//! "name"                                   one property, every mode
//! ["a", "b"]                               several properties, every mode
//! {"upsert": …, "insert": …, "update": …}  per mode; each branch is a
//!                                          name or a list of names
//! ```
//!
//! [`FieldSpec::normalize`] flattens a spec for one mode into an ordered
//! list of unique names: `upsert` entries first, then the mode's own
//! entries, keeping the first occurrence of each name.

use docform_core::Mode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// One name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Names {
    /// A single property name.
    One(String),
    /// Several property names.
    Many(Vec<String>),
}

impl Names {
    fn as_slice(&self) -> &[String] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }
}

/// Per-mode branches of a field spec. Any other key is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeBranches {
    /// Applies in both modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsert: Option<Names>,
    /// Applies only when inserting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<Names>,
    /// Applies only when updating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Names>,
}

/// A `required` or `unmodifiableProperties` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    /// A single property name for every mode.
    One(String),
    /// A list of property names for every mode.
    Many(Vec<String>),
    /// Separate branches per mode.
    ByMode(ModeBranches),
}

impl FieldSpec {
    /// Read a field spec from the schema value under `keyword`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidFieldSpec`] if the value is not a name, a list
    /// of names, or a map of per-mode branches.
    pub fn from_schema(value: &Value, keyword: &'static str, path: &str) -> Result<Self, SchemaError> {
        Self::deserialize(value).map_err(|e| SchemaError::InvalidFieldSpec {
            keyword,
            path: path.to_string(),
            reason: format!("expected a name, a list of names or an upsert/insert/update map ({e})"),
        })
    }

    /// The names that apply in `mode`, in declaration order, without
    /// duplicates.
    pub fn normalize(&self, mode: Mode) -> Vec<String> {
        let sources: Vec<&[String]> = match self {
            Self::One(name) => vec![std::slice::from_ref(name)],
            Self::Many(names) => vec![names.as_slice()],
            Self::ByMode(branches) => {
                let own = match mode {
                    Mode::Insert => &branches.insert,
                    Mode::Update => &branches.update,
                };
                [&branches.upsert, own]
                    .into_iter()
                    .flatten()
                    .map(Names::as_slice)
                    .collect()
            }
        };

        let mut out: Vec<String> = Vec::new();
        for name in sources.into_iter().flatten() {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        out
    }
}
