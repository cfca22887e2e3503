use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use super::ResolveError;
use crate::engine::{ListConfig, Mapping, Value};

/// Loads a mapping from a JSON object of `token -> value`.
///
/// Strings follow the list sentinel convention, arrays are lists, numbers
/// and booleans are plain text. Key order in the file is kept.
pub fn load_mapping_json(path: impl AsRef<Path>, config: &ListConfig) -> Result<Mapping, ResolveError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ResolveError::FileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let object: Map<String, JsonValue> =
        serde_json::from_str(&text).map_err(|e| ResolveError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    mapping_from_json(object, config)
}

pub fn mapping_from_json(object: Map<String, JsonValue>, config: &ListConfig) -> Result<Mapping, ResolveError> {
    let mut mapping = Mapping::new();
    for (key, value) in object {
        let value = match value {
            JsonValue::String(s) => Value::decode(&s, config),
            JsonValue::Number(n) => Value::Text(n.to_string()),
            JsonValue::Bool(b) => Value::Text(b.to_string()),
            JsonValue::Array(items) => Value::List(
                items
                    .iter()
                    .map(|item| list_item(&key, item))
                    .collect::<Result<_, _>>()?,
            ),
            JsonValue::Null | JsonValue::Object(_) => {
                return Err(ResolveError::UnsupportedValue {
                    key,
                    message: "expected a string, number, boolean or array".to_string(),
                })
            }
        };
        mapping.insert(key, value);
    }
    Ok(mapping)
}

fn list_item(key: &str, item: &JsonValue) -> Result<String, ResolveError> {
    match item {
        JsonValue::String(s) => Ok(s.trim().to_string()),
        JsonValue::Number(n) => Ok(n.to_string()),
        _ => Err(ResolveError::UnsupportedValue {
            key: key.to_string(),
            message: "list items must be strings or numbers".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Mapping, ResolveError> {
        let object = serde_json::from_str(text).unwrap();
        mapping_from_json(object, &ListConfig::default())
    }

    #[test]
    fn test_values_of_each_shape() {
        let mapping = parse(
            r#"{"договоры.номер": "2024.000001", "список_работ": "LIST:A|B", "услуги": ["x", 2], "сумма": 12.5}"#,
        )
        .unwrap();

        assert_eq!(mapping.get("договоры.номер"), Some(&Value::from("2024.000001")));
        assert_eq!(mapping.get("список_работ"), Some(&Value::list(["A", "B"])));
        assert_eq!(mapping.get("услуги"), Some(&Value::list(["x", "2"])));
        assert_eq!(mapping.get("сумма"), Some(&Value::from("12.5")));
    }

    #[test]
    fn test_file_order_is_kept() {
        let mapping = parse(r#"{"z": "1", "a": "2", "m": "3"}"#).unwrap();
        let keys: Vec<&str> = mapping.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_nested_object_is_rejected() {
        let err = parse(r#"{"a": {"b": 1}}"#).unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedValue { key, .. } if key == "a"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, r#"{"a": "LIST:"}"#).unwrap();

        let mapping = load_mapping_json(&path, &ListConfig::default()).unwrap();
        assert_eq!(mapping.get("a"), Some(&Value::list([""])));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(
            load_mapping_json(&path, &ListConfig::default()),
            Err(ResolveError::Parse { .. })
        ));
    }
}
