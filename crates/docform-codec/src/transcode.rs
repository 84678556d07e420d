//! # Schema-Guided Transcoding
//!
//! Converts whole documents between value form (`serde_json::Value`) and
//! storage form ([`StoredValue`]) by walking the document and the master
//! schema side by side. Leaves are handed to the [`TypeRegistry`] with the
//! `mongoType` and `encoding` of their schema node.
//!
//! ## Walk Rules
//!
//! - No schema, or a null document: the document passes through unchanged
//!   (via the plain embedding). A "no match" response is never mistaken
//!   for data to convert.
//! - Top level: an array is a batch, each element converted against the
//!   whole schema; an object is converted directly; anything else is
//!   [`TranscodeError::UnsupportedShape`].
//! - Every schema node is `$ref`-resolved against the *unfiltered* master
//!   schema before use, leaf property nodes included.
//! - Object children use `properties[key]`. Array children use `items`
//!   when it is a single schema, `items[i]` when it is a tuple, and
//!   `additionalItems` past the end of the tuple.
//! - A composite child with no schema node passes through untouched.
//! - An array child whose schema carries a `mongoType` but no `items` is a
//!   single typed leaf (an `int128` raw byte buffer, for instance).
//!
//! The schema given here is the master schema, never a mode schema: type
//! and encoding annotations are structural and apply to every property,
//! including ones a mode hides.
//!
//! Conversion is all-or-nothing. The output tree is built fresh and only
//! returned once every leaf converted.

use std::marker::PhantomData;

use docform_core::reference::resolve;
use docform_core::{Shape, StoredValue, Tree};
use serde_json::{Map, Value};

use crate::error::{ConversionError, TranscodeError};
use crate::registry::{self, TypeRegistry};

/// Schema keyword naming a leaf's registered type.
pub const MONGO_TYPE_KEY: &str = "mongoType";
/// Schema keyword naming a leaf's string encoding.
pub const ENCODING_KEY: &str = "encoding";

/// One conversion direction: which tree is read, which is built, and which
/// registry function converts a leaf.
pub trait Direction {
    /// Tree being read.
    type Input: Tree;
    /// Tree being built.
    type Output: Tree;

    /// Convert one leaf through the registry.
    ///
    /// # Errors
    ///
    /// Whatever the registered type rejects.
    fn convert_leaf(
        registry: &TypeRegistry,
        leaf: &Self::Input,
        type_name: &str,
        encoding: &str,
    ) -> Result<Self::Output, ConversionError>;

    /// Carry a subtree across without schema guidance.
    fn pass_through(node: &Self::Input) -> Self::Output;
}

/// Value form → storage form.
#[derive(Debug, Clone, Copy)]
pub struct ToStorage;

/// Storage form → value form.
#[derive(Debug, Clone, Copy)]
pub struct ToValue;

impl Direction for ToStorage {
    type Input = Value;
    type Output = StoredValue;

    fn convert_leaf(
        registry: &TypeRegistry,
        leaf: &Value,
        type_name: &str,
        encoding: &str,
    ) -> Result<StoredValue, ConversionError> {
        registry.to_storage(leaf, type_name, encoding)
    }

    fn pass_through(node: &Value) -> StoredValue {
        StoredValue::from(node)
    }
}

impl Direction for ToValue {
    type Input = StoredValue;
    type Output = Value;

    fn convert_leaf(
        registry: &TypeRegistry,
        leaf: &StoredValue,
        type_name: &str,
        encoding: &str,
    ) -> Result<Value, ConversionError> {
        registry.from_storage(leaf, type_name, encoding)
    }

    fn pass_through(node: &StoredValue) -> Value {
        node.to_plain_json()
    }
}

/// Convert a document (or batch) to storage form using the global registry.
///
/// # Errors
///
/// See [`transcode`].
pub fn to_storage_format(document: &Value, schema: Option<&Value>) -> Result<StoredValue, TranscodeError> {
    transcode::<ToStorage>(registry::global(), document, schema)
}

/// Convert a document (or batch) to value form using the global registry.
///
/// # Errors
///
/// See [`transcode`].
pub fn to_value_format(document: &StoredValue, schema: Option<&Value>) -> Result<Value, TranscodeError> {
    transcode::<ToValue>(registry::global(), document, schema)
}

/// Convert `document` in direction `D`, guided by the master `schema`.
///
/// # Errors
///
/// - [`TranscodeError::UnsupportedShape`] if the document (or a batch
///   element) is not an object or array.
/// - [`TranscodeError::Leaf`] if a typed leaf fails to convert.
/// - [`TranscodeError::Reference`] if a schema `$ref` cannot be resolved.
pub fn transcode<D: Direction>(
    registry: &TypeRegistry,
    document: &D::Input,
    schema: Option<&Value>,
) -> Result<D::Output, TranscodeError> {
    let schema = match schema {
        Some(s) if !s.is_null() => s,
        _ => return Ok(D::pass_through(document)),
    };
    if document.is_null() {
        return Ok(D::pass_through(document));
    }

    let walker = Walker::<D> {
        registry,
        root: schema,
        direction: PhantomData,
    };

    match document.shape() {
        Shape::Sequence(items) => {
            tracing::debug!(count = items.len(), "transcoding document batch");
            let converted = items
                .iter()
                .enumerate()
                .map(|(i, item)| walker.element(item, schema, &format!("$[{i}]")))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(<D::Output as Tree>::from_sequence(converted))
        }
        shape @ Shape::Mapping(_) => walker.composite(shape, Some(schema), "$"),
        Shape::Scalar(leaf) => Err(TranscodeError::UnsupportedShape {
            path: "$".to_string(),
            found: leaf.kind(),
        }),
    }
}

struct Walker<'r, D> {
    registry: &'r TypeRegistry,
    root: &'r Value,
    direction: PhantomData<D>,
}

impl<D: Direction> Walker<'_, D> {
    /// A batch element: must itself be an object or array.
    fn element(&self, node: &D::Input, schema: &Value, path: &str) -> Result<D::Output, TranscodeError> {
        match node.shape() {
            Shape::Scalar(leaf) => Err(TranscodeError::UnsupportedShape {
                path: path.to_string(),
                found: leaf.kind(),
            }),
            shape => self.composite(shape, Some(schema), path),
        }
    }

    /// Any node below the top level.
    fn node(&self, node: &D::Input, schema: Option<&Value>, path: &str) -> Result<D::Output, TranscodeError> {
        match node.shape() {
            Shape::Scalar(leaf) => self.leaf(leaf, schema, path),
            _ if schema.is_none() => Ok(D::pass_through(node)),
            Shape::Sequence(_) if self.is_typed_sequence(schema, path)? => {
                self.leaf(node, schema, path)
            }
            shape => self.composite(shape, schema, path),
        }
    }

    /// A sequence whose schema names a `mongoType` and has no `items` is one
    /// typed leaf, such as an `int128` raw byte buffer.
    fn is_typed_sequence(&self, schema: Option<&Value>, path: &str) -> Result<bool, TranscodeError> {
        let Some(map) = schema.and_then(Value::as_object) else {
            return Ok(false);
        };
        let resolved = resolve(self.root, map, path)?;
        let typed = resolved
            .node
            .get(MONGO_TYPE_KEY)
            .and_then(Value::as_str)
            .is_some_and(|t| !t.is_empty());
        Ok(typed && !resolved.node.contains_key("items"))
    }

    fn composite(
        &self,
        shape: Shape<'_, D::Input>,
        schema: Option<&Value>,
        path: &str,
    ) -> Result<D::Output, TranscodeError> {
        let resolved = match schema.and_then(Value::as_object) {
            Some(map) => Some(resolve(self.root, map, path)?),
            None => None,
        };
        let schema: Option<&Map<String, Value>> = resolved.as_ref().map(|r| r.node.as_ref());

        match shape {
            Shape::Mapping(entries) => {
                let properties = schema
                    .and_then(|s| s.get("properties"))
                    .and_then(Value::as_object);
                let mut out = Vec::with_capacity(entries.len());
                for (key, child) in entries {
                    let child_schema = properties.and_then(|p| p.get(key));
                    let converted = self.node(child, child_schema, &format!("{path}.{key}"))?;
                    out.push((key.to_string(), converted));
                }
                Ok(<D::Output as Tree>::from_mapping(out))
            }
            Shape::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, child) in items.iter().enumerate() {
                    let child_schema = item_schema(schema, i);
                    out.push(self.node(child, child_schema, &format!("{path}[{i}]"))?);
                }
                Ok(<D::Output as Tree>::from_sequence(out))
            }
            Shape::Scalar(leaf) => Err(TranscodeError::UnsupportedShape {
                path: path.to_string(),
                found: leaf.kind(),
            }),
        }
    }

    fn leaf(&self, leaf: &D::Input, schema: Option<&Value>, path: &str) -> Result<D::Output, TranscodeError> {
        let (type_name, encoding) = self.annotations(schema, path)?;
        if !type_name.is_empty() {
            tracing::trace!(path, type_name = %type_name, "converting leaf");
        }
        D::convert_leaf(self.registry, leaf, &type_name, &encoding).map_err(|source| {
            TranscodeError::Leaf {
                path: path.to_string(),
                type_name: type_name.clone(),
                source,
            }
        })
    }

    /// `mongoType` and `encoding` of a leaf's schema node; empty when absent.
    fn annotations(&self, schema: Option<&Value>, path: &str) -> Result<(String, String), TranscodeError> {
        let Some(map) = schema.and_then(Value::as_object) else {
            return Ok((String::new(), String::new()));
        };
        let resolved = resolve(self.root, map, path)?;
        let text = |key: &str| {
            resolved
                .node
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok((text(MONGO_TYPE_KEY), text(ENCODING_KEY)))
    }
}

/// Schema for element `index` of an array governed by `schema`.
fn item_schema<'s>(schema: Option<&'s Map<String, Value>>, index: usize) -> Option<&'s Value> {
    let schema = schema?;
    match schema.get("items")? {
        Value::Array(tuple) => tuple
            .get(index)
            .or_else(|| schema.get("additionalItems")),
        single => Some(single),
    }
}
