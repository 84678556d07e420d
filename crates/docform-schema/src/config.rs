//! # Validator Configuration
//!
//! Selects the JSON Schema draft mode validators are compiled with. Loaded
//! from YAML or JSON; every field has a default.
//!
//! ```yaml
//! draft: draft7
//! ```
//!
//! The default is draft 7: tuple-style `items` with `additionalItems` is
//! draft 7 syntax, and later drafts replace it with `prefixItems`.

use serde::{Deserialize, Serialize};

/// JSON Schema draft used to compile mode validators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDraft {
    /// Draft 4.
    Draft4,
    /// Draft 6.
    Draft6,
    /// Draft 7.
    #[default]
    Draft7,
    /// Draft 2019-09.
    Draft201909,
    /// Draft 2020-12.
    Draft202012,
}

impl From<SchemaDraft> for jsonschema::Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
            SchemaDraft::Draft6 => jsonschema::Draft::Draft6,
            SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
            SchemaDraft::Draft201909 => jsonschema::Draft::Draft201909,
            SchemaDraft::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

/// Settings for compiling mode validators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Draft the derived schemas are interpreted under.
    pub draft: SchemaDraft,
}

impl ValidatorConfig {
    /// `jsonschema` options for this configuration.
    pub fn options(&self) -> jsonschema::ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(self.draft.into());
        opts
    }
}
