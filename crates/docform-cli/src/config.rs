//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! validator:
//!   draft: draft7
//! default_encoding: base64
//! ```
//!
//! `default_encoding` applies to `binary` leaves whose schema node has no
//! `encoding` annotation.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use docform_codec::builtin::BINARY;
use docform_codec::{BinaryEncoding, TypeRegistry};
use docform_schema::ValidatorConfig;
use serde::{Deserialize, Serialize};

/// Settings read from the `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// How mode validators are compiled.
    pub validator: ValidatorConfig,
    /// Encoding for `binary` leaves without an `encoding` annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_encoding: Option<String>,
}

impl CliConfig {
    /// Load the config file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        if let Some(encoding) = &config.default_encoding {
            encoding
                .parse::<BinaryEncoding>()
                .with_context(|| format!("invalid default_encoding in {}", path.display()))?;
        }
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// A registry with every built-in type, with `binary` falling back to
    /// `default_encoding` when a leaf has no encoding of its own.
    pub fn registry(&self) -> Result<Arc<TypeRegistry>> {
        let registry = TypeRegistry::with_builtins();
        if let Some(fallback) = &self.default_encoding {
            let codec = registry
                .remove(BINARY)
                .context("binary type missing from built-in registry")?;
            let to_fallback = fallback.clone();
            let from_fallback = fallback.clone();
            let from_codec = codec.clone();
            let replaced = registry.register(
                BINARY,
                move |value, encoding| {
                    let encoding = if encoding.is_empty() { to_fallback.as_str() } else { encoding };
                    codec.to_storage(value, encoding)
                },
                move |value, encoding| {
                    let encoding = if encoding.is_empty() { from_fallback.as_str() } else { encoding };
                    from_codec.from_storage(value, encoding)
                },
            );
            tracing::debug!(encoding = %fallback, replaced, "binary falls back to default encoding");
        }
        Ok(Arc::new(registry))
    }
}
