//! # Value Shapes
//!
//! Recursive walks over documents need one decision per node: is this a
//! leaf, a list, or a map? [`Tree::shape`] makes that decision once and
//! hands back a closed [`Shape`] so the walker can `match` exhaustively
//! instead of probing the value repeatedly.
//!
//! Both document representations (`serde_json::Value` for value form,
//! [`StoredValue`] for storage form) implement [`Tree`], which lets a single
//! generic walker serve both conversion directions.

use serde_json::Value;

use crate::stored::StoredValue;

/// The composite shape of one node in a document tree.
#[derive(Debug)]
pub enum Shape<'a, T> {
    /// A non-composite leaf (including null).
    Scalar(&'a T),
    /// An ordered list of child nodes.
    Sequence(&'a [T]),
    /// Keyed child nodes, in document order.
    Mapping(Vec<(&'a str, &'a T)>),
}

impl<T> Shape<'_, T> {
    /// True for sequences and mappings.
    pub fn is_composite(&self) -> bool {
        !matches!(self, Shape::Scalar(_))
    }
}

/// A document tree that can be walked and rebuilt.
pub trait Tree: Sized {
    /// Classify this node.
    fn shape(&self) -> Shape<'_, Self>;

    /// True if this node is an explicit null.
    fn is_null(&self) -> bool;

    /// Short name of the node's type, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Build a list node.
    fn from_sequence(items: Vec<Self>) -> Self;

    /// Build a map node, preserving entry order where the representation can.
    fn from_mapping(entries: Vec<(String, Self)>) -> Self;
}

impl Tree for Value {
    fn shape(&self) -> Shape<'_, Self> {
        match self {
            Value::Array(items) => Shape::Sequence(items),
            Value::Object(map) => Shape::Mapping(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            _ => Shape::Scalar(self),
        }
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    fn from_sequence(items: Vec<Self>) -> Self {
        Value::Array(items)
    }

    fn from_mapping(entries: Vec<(String, Self)>) -> Self {
        Value::Object(entries.into_iter().collect())
    }
}

impl Tree for StoredValue {
    fn shape(&self) -> Shape<'_, Self> {
        match self {
            StoredValue::Array(items) => Shape::Sequence(items),
            StoredValue::Document(doc) => {
                Shape::Mapping(doc.iter().map(|(k, v)| (k.as_str(), v)).collect())
            }
            _ => Shape::Scalar(self),
        }
    }

    fn is_null(&self) -> bool {
        matches!(self, StoredValue::Null)
    }

    fn kind(&self) -> &'static str {
        StoredValue::kind(self)
    }

    fn from_sequence(items: Vec<Self>) -> Self {
        StoredValue::Array(items)
    }

    fn from_mapping(entries: Vec<(String, Self)>) -> Self {
        StoredValue::Document(entries.into_iter().collect())
    }
}
