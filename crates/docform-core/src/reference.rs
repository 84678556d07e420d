//! # Schema `$ref` Resolution
//!
//! Both schema derivation and document transcoding resolve local `$ref`
//! pointers the same way:
//!
//! 1. Strip a leading `#/` (a bare `#` is the root itself).
//! 2. Split the remainder on `/`, unescaping `~1` → `/` and `~0` → `~`.
//! 3. Walk the segments from the *root* of the master schema. Array
//!    segments are decimal indices.
//! 4. Merge the referenced node's keys underneath the referring node's own
//!    keys (the referring node wins on conflict) and drop `$ref`.
//!
//! If the referenced node itself carries a `$ref`, the chain is followed.
//! A chain that revisits a reference is a [`ReferenceError::Cycle`].
//! Recursion *across* nested nodes is not tracked here; callers that walk
//! the whole schema tree keep their own stack of active references (see
//! [`Resolved::references`]).

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::error::ReferenceError;

/// Key carrying a reference in a schema node.
pub const REF_KEY: &str = "$ref";

/// A schema node with its `$ref` chain merged in.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    /// The effective node. Borrowed when the input had no `$ref`.
    pub node: Cow<'a, Map<String, Value>>,
    /// Every reference followed, in chain order.
    pub references: Vec<String>,
}

/// Look up the schema object a reference points to.
///
/// `path` is the diagnostic location of the referring node.
///
/// # Errors
///
/// [`ReferenceError::Unresolved`] if a segment is missing,
/// [`ReferenceError::NotAnObject`] if the target is not a schema object.
pub fn lookup<'a>(
    root: &'a Value,
    reference: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ReferenceError> {
    let pointer = reference
        .strip_prefix("#/")
        .or_else(|| reference.strip_prefix('#'))
        .unwrap_or(reference);

    let mut current = root;
    if !pointer.is_empty() {
        for raw in pointer.split('/') {
            let segment = raw.replace("~1", "/").replace("~0", "~");
            let next = match current {
                Value::Object(map) => map.get(&segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| ReferenceError::Unresolved {
                reference: reference.to_string(),
                path: path.to_string(),
            })?;
        }
    }

    current.as_object().ok_or_else(|| ReferenceError::NotAnObject {
        reference: reference.to_string(),
        path: path.to_string(),
    })
}

/// Resolve the `$ref` chain on `node` against `root`.
///
/// Returns the node unchanged (borrowed) when it carries no reference.
///
/// # Errors
///
/// Any [`lookup`] error, a non-string `$ref` value (reported as
/// unresolved), or [`ReferenceError::Cycle`] when the chain loops.
pub fn resolve<'a>(
    root: &Value,
    node: &'a Map<String, Value>,
    path: &str,
) -> Result<Resolved<'a>, ReferenceError> {
    if !node.contains_key(REF_KEY) {
        return Ok(Resolved {
            node: Cow::Borrowed(node),
            references: Vec::new(),
        });
    }

    let mut merged = node.clone();
    let mut next = take_reference(&mut merged, path)?;
    let mut references: Vec<String> = Vec::new();

    while let Some(reference) = next {
        if references.contains(&reference) {
            return Err(ReferenceError::Cycle { reference, path: path.to_string() });
        }
        let mut base = lookup(root, &reference, path)?.clone();
        next = take_reference(&mut base, path)?;
        for (key, value) in merged {
            base.insert(key, value);
        }
        merged = base;
        references.push(reference);
    }

    Ok(Resolved {
        node: Cow::Owned(merged),
        references,
    })
}

fn take_reference(node: &mut Map<String, Value>, path: &str) -> Result<Option<String>, ReferenceError> {
    match node.remove(REF_KEY) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ReferenceError::Unresolved {
            reference: other.to_string(),
            path: path.to_string(),
        }),
    }
}
