//! # Mode Schema Derivation
//!
//! Specializes a master schema for one write [`Mode`]. The master schema is
//! never modified; the output is a fresh tree.
//!
//! ## Per-Node Rules
//!
//! 1. Inline the node's `$ref` chain (referring keys win over referenced
//!    ones). A reference already being expanded higher up the same path is
//!    a [`ReferenceError::Cycle`].
//! 2. Normalize `required` for the mode.
//! 3. If `unmodifiableProperties` is present: normalize it, require
//!    `additionalProperties: false`, reject any name that is also required,
//!    and drop the unmodifiable names from `properties`.
//! 4. Rebuild the node: `properties`, `items` and `additionalItems` are
//!    derived recursively; `required` becomes the normalized list (omitted
//!    when empty); `definitions` and `unmodifiableProperties` are dropped;
//!    every other keyword is copied as is.
//!
//! The conflict check in step 3 compares against the full normalized
//! `required` list, so a derived `required` can never name a property the
//! same node removed.
//!
//! ## Paths
//!
//! Error paths start at `#` and append `.properties.<name>`, `.items`,
//! `.items[<i>]` or `.additionalItems`, e.g. `#.properties.address.items[0]`.

use docform_core::reference::resolve;
use docform_core::{Mode, ReferenceError};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::field_spec::FieldSpec;

/// Keyword listing properties a mode may not write.
pub const UNMODIFIABLE_KEY: &str = "unmodifiableProperties";

const REQUIRED_KEY: &str = "required";
const DEFINITIONS_KEY: &str = "definitions";
const PROPERTIES_KEY: &str = "properties";
const ITEMS_KEY: &str = "items";
const ADDITIONAL_ITEMS_KEY: &str = "additionalItems";
const ADDITIONAL_PROPERTIES_KEY: &str = "additionalProperties";

/// Derive the schema documents are validated against in `mode`.
///
/// # Errors
///
/// - [`SchemaError::RequiredUnmodifiable`] if a property is required and
///   unmodifiable in `mode` on the same node.
/// - [`SchemaError::UnmodifiableWithoutClosedProperties`] if a node with
///   `unmodifiableProperties` does not set `additionalProperties: false`.
/// - [`SchemaError::InvalidFieldSpec`] for a malformed `required` or
///   `unmodifiableProperties`.
/// - [`SchemaError::Reference`] for unresolvable or cyclic `$ref`s.
pub fn derive_mode_schema(master: &Value, mode: Mode) -> Result<Value, SchemaError> {
    tracing::debug!(%mode, "deriving mode schema");
    let mut deriver = Deriver {
        root: master,
        mode,
        active: Vec::new(),
    };
    deriver.node(master, "#")
}

struct Deriver<'a> {
    root: &'a Value,
    mode: Mode,
    /// References being expanded on the current path, outermost first.
    active: Vec<String>,
}

impl Deriver<'_> {
    fn node(&mut self, node: &Value, path: &str) -> Result<Value, SchemaError> {
        let Value::Object(map) = node else {
            return Ok(node.clone());
        };

        let resolved = resolve(self.root, map, path)?;
        if let Some(reference) = resolved
            .references
            .iter()
            .find(|r| self.active.contains(r))
        {
            return Err(ReferenceError::Cycle {
                reference: reference.clone(),
                path: path.to_string(),
            }
            .into());
        }

        let depth = self.active.len();
        self.active.extend(resolved.references.iter().cloned());
        let derived = self.object(&resolved.node, path);
        self.active.truncate(depth);
        derived.map(Value::Object)
    }

    fn object(&mut self, node: &Map<String, Value>, path: &str) -> Result<Map<String, Value>, SchemaError> {
        let required = match node.get(REQUIRED_KEY) {
            Some(spec) => FieldSpec::from_schema(spec, REQUIRED_KEY, path)?.normalize(self.mode),
            None => Vec::new(),
        };

        let unmodifiable = match node.get(UNMODIFIABLE_KEY) {
            Some(spec) => self.unmodifiable(node, spec, &required, path)?,
            None => Vec::new(),
        };

        let mut out = Map::new();
        for (key, value) in node {
            match key.as_str() {
                DEFINITIONS_KEY | UNMODIFIABLE_KEY | REQUIRED_KEY => {}
                PROPERTIES_KEY => {
                    out.insert(key.clone(), self.properties(value, &unmodifiable, path)?);
                }
                ITEMS_KEY => {
                    out.insert(key.clone(), self.items(value, path)?);
                }
                ADDITIONAL_ITEMS_KEY => {
                    let derived = self.node(value, &format!("{path}.{ADDITIONAL_ITEMS_KEY}"))?;
                    out.insert(key.clone(), derived);
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }

        if !required.is_empty() {
            out.insert(
                REQUIRED_KEY.to_string(),
                Value::Array(required.into_iter().map(Value::String).collect()),
            );
        }
        Ok(out)
    }

    /// Normalized unmodifiable names for a node, after the policy and
    /// conflict checks.
    fn unmodifiable(
        &self,
        node: &Map<String, Value>,
        spec: &Value,
        required: &[String],
        path: &str,
    ) -> Result<Vec<String>, SchemaError> {
        let names = FieldSpec::from_schema(spec, UNMODIFIABLE_KEY, path)?.normalize(self.mode);

        if node.get(ADDITIONAL_PROPERTIES_KEY) != Some(&Value::Bool(false)) {
            return Err(SchemaError::UnmodifiableWithoutClosedProperties {
                path: path.to_string(),
            });
        }

        if let Some(property) = required.iter().find(|r| names.contains(r)) {
            return Err(SchemaError::RequiredUnmodifiable {
                property: property.clone(),
                path: path.to_string(),
                mode: self.mode,
            });
        }

        if !names.is_empty() {
            tracing::debug!(path, mode = %self.mode, hidden = ?names, "hiding unmodifiable properties");
        }
        Ok(names)
    }

    fn properties(&mut self, value: &Value, hidden: &[String], path: &str) -> Result<Value, SchemaError> {
        let Value::Object(properties) = value else {
            return Ok(value.clone());
        };
        let mut out = Map::new();
        for (name, schema) in properties {
            if hidden.contains(name) {
                continue;
            }
            let derived = self.node(schema, &format!("{path}.{PROPERTIES_KEY}.{name}"))?;
            out.insert(name.clone(), derived);
        }
        Ok(Value::Object(out))
    }

    fn items(&mut self, value: &Value, path: &str) -> Result<Value, SchemaError> {
        match value {
            Value::Array(tuple) => tuple
                .iter()
                .enumerate()
                .map(|(i, schema)| self.node(schema, &format!("{path}.{ITEMS_KEY}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            single => self.node(single, &format!("{path}.{ITEMS_KEY}")),
        }
    }
}
