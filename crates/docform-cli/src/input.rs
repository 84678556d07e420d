//! Reading schema and document files.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// True if `path` names a YAML file.
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Load a JSON or YAML file as a JSON value.
pub fn load_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    if is_yaml(path) {
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        yaml_to_json_value(&yaml)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("YAML-to-JSON conversion failed for {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

/// Load a JSON or YAML file into `T`.
pub fn load_typed<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let value = load_value(path)?;
    serde_json::from_value(value).with_context(|| format!("unexpected structure in {}", path.display()))
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Scalar map keys are stringified and tags are ignored; anything without a
/// JSON equivalent is an error.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extension_selects_format() {
        assert!(is_yaml(Path::new("a.yaml")));
        assert!(is_yaml(Path::new("dir/a.yml")));
        assert!(!is_yaml(Path::new("a.json")));
        assert!(!is_yaml(Path::new("yaml")));
    }

    #[test]
    fn test_yaml_keys_and_scalars() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\nok: true\nn: 2.5\nlist: [a, 3]").unwrap();
        assert_eq!(
            yaml_to_json_value(&yaml).unwrap(),
            json!({"1": "one", "ok": true, "n": 2.5, "list": ["a", 3]})
        );
    }

    #[test]
    fn test_load_json_and_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("doc.json");
        let yaml_path = dir.path().join("doc.yaml");
        std::fs::write(&json_path, r#"{"a": [1, 2]}"#).unwrap();
        std::fs::write(&yaml_path, "a:\n  - 1\n  - 2\n").unwrap();
        assert_eq!(load_value(&json_path).unwrap(), load_value(&yaml_path).unwrap());
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_value(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }
}
