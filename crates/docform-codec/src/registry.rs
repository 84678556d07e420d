//! # Type Registry
//!
//! Maps a `mongoType` name to the pair of functions converting a leaf to its
//! storage form and back. The transcoder consults the registry at every
//! leaf that has a matching schema node.
//!
//! ## Contract
//!
//! - [`TypeRegistry::register`] overwrites any previous registration for
//!   the same name (last writer wins).
//! - Looking up a name that is empty or unregistered is not an error: the
//!   value passes through via the plain embedding. Schemas may freely mix
//!   typed and untyped leaves.
//!
//! ## Process-Wide Instance
//!
//! [`global()`] returns the process-wide registry. It is created, with all
//! built-in types registered, on first access; that first access is the
//! defined initialization point. Custom types added through
//! [`register_type`] should be registered at startup, but the registry is
//! guarded by a read-write lock so late registration is safe: conversions
//! take the read lock only long enough to clone the codec handle, so a
//! codec never runs while the lock is held.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use docform_core::StoredValue;
use parking_lot::RwLock;
use serde_json::Value;

use crate::builtin;
use crate::error::ConversionError;

/// Value form → storage form conversion for one type.
pub type ToStorageFn =
    Arc<dyn Fn(&Value, &str) -> Result<StoredValue, ConversionError> + Send + Sync>;

/// Storage form → value form conversion for one type.
pub type FromStorageFn =
    Arc<dyn Fn(&StoredValue, &str) -> Result<Value, ConversionError> + Send + Sync>;

/// The registered conversion pair for one type name.
#[derive(Clone)]
pub struct TypeCodec {
    to_storage: ToStorageFn,
    from_storage: FromStorageFn,
}

impl TypeCodec {
    /// Build a codec from two conversion functions.
    pub fn new<F, G>(to_storage: F, from_storage: G) -> Self
    where
        F: Fn(&Value, &str) -> Result<StoredValue, ConversionError> + Send + Sync + 'static,
        G: Fn(&StoredValue, &str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Self {
            to_storage: Arc::new(to_storage),
            from_storage: Arc::new(from_storage),
        }
    }

    /// Convert a value-form leaf to storage form.
    ///
    /// # Errors
    ///
    /// Whatever the registered function rejects.
    pub fn to_storage(&self, value: &Value, encoding: &str) -> Result<StoredValue, ConversionError> {
        (self.to_storage)(value, encoding)
    }

    /// Convert a storage-form leaf to value form.
    ///
    /// # Errors
    ///
    /// Whatever the registered function rejects.
    pub fn from_storage(&self, value: &StoredValue, encoding: &str) -> Result<Value, ConversionError> {
        (self.from_storage)(value, encoding)
    }
}

impl fmt::Debug for TypeCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCodec").finish_non_exhaustive()
    }
}

/// Thread-safe map from type name to [`TypeCodec`].
pub struct TypeRegistry {
    codecs: RwLock<HashMap<String, TypeCodec>>,
}

impl TypeRegistry {
    /// Creates a registry with no types registered.
    pub fn new() -> Self {
        Self {
            codecs: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry holding every built-in type
    /// (`objectId`, `int32`, `int64`, `int128`, `binary`, `date`).
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        builtin::register_builtins(&registry);
        registry
    }

    /// Registers a conversion pair under `name`, replacing any existing one.
    ///
    /// Returns `true` if an earlier registration was replaced.
    pub fn register<F, G>(&self, name: impl Into<String>, to_storage: F, from_storage: G) -> bool
    where
        F: Fn(&Value, &str) -> Result<StoredValue, ConversionError> + Send + Sync + 'static,
        G: Fn(&StoredValue, &str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.register_codec(name, TypeCodec::new(to_storage, from_storage))
    }

    /// Registers a prebuilt codec under `name`, replacing any existing one.
    ///
    /// Returns `true` if an earlier registration was replaced.
    pub fn register_codec(&self, name: impl Into<String>, codec: TypeCodec) -> bool {
        let name = name.into();
        let replaced = self.codecs.write().insert(name.clone(), codec).is_some();
        if replaced {
            tracing::warn!(type_name = %name, "replaced existing type registration");
        } else {
            tracing::debug!(type_name = %name, "registered type");
        }
        replaced
    }

    /// Gets the codec for a type, if registered.
    pub fn get(&self, name: &str) -> Option<TypeCodec> {
        self.codecs.read().get(name).cloned()
    }

    /// Removes and returns the codec for `name`, if registered.
    ///
    /// Lets a caller wrap a codec and register the wrapper as a fresh entry.
    pub fn remove(&self, name: &str) -> Option<TypeCodec> {
        let removed = self.codecs.write().remove(name);
        if removed.is_some() {
            tracing::debug!(type_name = name, "removed type registration");
        }
        removed
    }

    /// True if `name` has a registration.
    pub fn contains(&self, name: &str) -> bool {
        self.codecs.read().contains_key(name)
    }

    /// Names of all registered types, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.codecs.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Convert a leaf to storage form using `type_name`.
    ///
    /// An empty or unregistered `type_name` passes the value through.
    ///
    /// # Errors
    ///
    /// Whatever the registered function rejects.
    pub fn to_storage(
        &self,
        value: &Value,
        type_name: &str,
        encoding: &str,
    ) -> Result<StoredValue, ConversionError> {
        match self.lookup(type_name) {
            Some(codec) => codec.to_storage(value, encoding),
            None => Ok(StoredValue::from(value)),
        }
    }

    /// Convert a leaf to value form using `type_name`.
    ///
    /// An empty or unregistered `type_name` passes the value through.
    ///
    /// # Errors
    ///
    /// Whatever the registered function rejects.
    pub fn from_storage(
        &self,
        value: &StoredValue,
        type_name: &str,
        encoding: &str,
    ) -> Result<Value, ConversionError> {
        match self.lookup(type_name) {
            Some(codec) => codec.from_storage(value, encoding),
            None => Ok(value.to_plain_json()),
        }
    }

    fn lookup(&self, type_name: &str) -> Option<TypeCodec> {
        if type_name.is_empty() {
            return None;
        }
        let codec = self.get(type_name);
        if codec.is_none() {
            tracing::trace!(type_name, "unregistered type; passing value through");
        }
        codec
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

/// The process-wide registry, created with all built-in types on first use.
pub fn global() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TypeRegistry::with_builtins)
}

/// Register a type in the process-wide registry, replacing any existing
/// registration under the same name.
///
/// Returns `true` if an earlier registration was replaced.
pub fn register_type<F, G>(name: impl Into<String>, to_storage: F, from_storage: G) -> bool
where
    F: Fn(&Value, &str) -> Result<StoredValue, ConversionError> + Send + Sync + 'static,
    G: Fn(&StoredValue, &str) -> Result<Value, ConversionError> + Send + Sync + 'static,
{
    global().register(name, to_storage, from_storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upper_codec(registry: &TypeRegistry, name: &str) {
        registry.register(
            name,
            |v: &Value, _: &str| Ok(StoredValue::String(v.as_str().unwrap_or("").to_uppercase())),
            |v: &StoredValue, _: &str| Ok(v.to_plain_json()),
        );
    }

    #[test]
    fn test_unregistered_type_passes_through() {
        let registry = TypeRegistry::new();
        let stored = registry.to_storage(&json!("abc"), "nope", "").unwrap();
        assert_eq!(stored, StoredValue::String("abc".into()));
        let back = registry.from_storage(&StoredValue::Int32(5), "nope", "").unwrap();
        assert_eq!(back, json!(5));
    }

    #[test]
    fn test_empty_type_passes_through() {
        let registry = TypeRegistry::with_builtins();
        let stored = registry.to_storage(&json!("42"), "", "").unwrap();
        assert_eq!(stored, StoredValue::String("42".into()));
    }

    #[test]
    fn test_register_overwrites() {
        let registry = TypeRegistry::new();
        upper_codec(&registry, "shout");
        let replaced = registry.register(
            "shout",
            |_: &Value, _: &str| Ok(StoredValue::Bool(true)),
            |_: &StoredValue, _: &str| Ok(json!(true)),
        );
        assert!(replaced);
        assert_eq!(
            registry.to_storage(&json!("x"), "shout", "").unwrap(),
            StoredValue::Bool(true)
        );
    }

    #[test]
    fn test_remove_then_register_is_not_a_replacement() {
        let registry = TypeRegistry::with_builtins();
        let codec = registry.remove("binary").unwrap();
        assert!(!registry.contains("binary"));
        assert!(registry.remove("binary").is_none());
        assert!(!registry.register_codec("binary", codec));
        assert!(registry.contains("binary"));
    }

    #[test]
    fn test_custom_type_used() {
        let registry = TypeRegistry::new();
        assert!(!registry.contains("shout"));
        upper_codec(&registry, "shout");
        assert!(registry.contains("shout"));
        assert_eq!(
            registry.to_storage(&json!("hey"), "shout", "").unwrap(),
            StoredValue::String("HEY".into())
        );
    }

    #[test]
    fn test_builtins_present() {
        let names = TypeRegistry::with_builtins().type_names();
        assert_eq!(names, vec!["binary", "date", "int128", "int32", "int64", "objectId"]);
    }

    #[test]
    fn test_global_registry_has_builtins() {
        assert!(global().contains("int128"));
        assert!(global().contains("objectId"));
    }

    #[test]
    fn test_codec_may_reenter_registry() {
        // Codecs run outside the lock, so one type can delegate to another.
        let registry = Arc::new(TypeRegistry::with_builtins());
        let inner = Arc::clone(&registry);
        registry.register(
            "counter",
            move |v: &Value, enc: &str| inner.to_storage(v, "int32", enc),
            |v: &StoredValue, _: &str| Ok(v.to_plain_json()),
        );
        assert_eq!(
            registry.to_storage(&json!("7"), "counter", "").unwrap(),
            StoredValue::Int32(7)
        );
    }
}
