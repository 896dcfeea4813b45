//! Dot-path access into JSON documents.
//!
//! A path like `"permissions.allow"` walks object keys one segment at a
//! time. Keys containing dots cannot be addressed.

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

/// The value at `path`, or `None` if any segment is missing or a non-object
/// sits in the way.
pub fn get_nested_value<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

pub fn get_nested_value_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object_mut()?.get_mut(key))
}

/// Store `new_value` at `path`.
///
/// Missing intermediate segments are created as empty objects. Any
/// intermediate that is not an object (including the root) is replaced by
/// one, discarding what was there.
pub fn set_nested_value(value: &mut Value, path: &str, new_value: Value) {
    let mut keys: Vec<&str> = path.split('.').collect();
    // `split` always yields at least one segment.
    let last = keys.pop().unwrap_or_default();

    let mut current = value;
    for key in keys {
        current = ensure_object(current)
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert(last.to_string(), new_value);
}

/// Append `item` to the array at `path` unless an equal element is already
/// there.
///
/// A missing (or `null`) target becomes a one-element array. Returns `true`
/// if the document changed.
pub fn append_unique(value: &mut Value, path: &str, item: Value) -> ConfigResult<bool> {
    match get_nested_value_mut(value, path) {
        None | Some(Value::Null) => {
            set_nested_value(value, path, Value::Array(vec![item]));
            Ok(true)
        }
        Some(Value::Array(items)) => {
            if items.contains(&item) {
                Ok(false)
            } else {
                items.push(item);
                Ok(true)
            }
        }
        Some(other) => Err(ConfigError::NotAnArray {
            path: path.to_string(),
            found: type_name(other),
        }),
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // get / set
    // -----------------------------------------------------------------------

    #[test]
    fn get_walks_objects() {
        let doc = json!({"permissions": {"allow": ["a"]}, "n": 1});
        assert_eq!(get_nested_value(&doc, "permissions.allow"), Some(&json!(["a"])));
        assert_eq!(get_nested_value(&doc, "n"), Some(&json!(1)));
    }

    #[test]
    fn get_missing_segments_yield_none() {
        let doc = json!({"a": {"b": 1}, "s": "text"});
        assert_eq!(get_nested_value(&doc, "a.c"), None);
        assert_eq!(get_nested_value(&doc, "x.y.z"), None);
        assert_eq!(get_nested_value(&doc, "s.len"), None);
        assert_eq!(get_nested_value(&json!([1, 2]), "0"), None);
    }

    #[test]
    fn set_creates_intermediates() {
        let mut doc = json!({});
        set_nested_value(&mut doc, "a.b.c", json!(true));
        assert_eq!(doc, json!({"a": {"b": {"c": true}}}));
    }

    #[test]
    fn set_overwrites_non_object_intermediates() {
        let mut doc = json!({"a": 5, "keep": 1});
        set_nested_value(&mut doc, "a.b", json!("x"));
        assert_eq!(doc, json!({"a": {"b": "x"}, "keep": 1}));

        let mut root = json!("scalar");
        set_nested_value(&mut root, "k", json!(1));
        assert_eq!(root, json!({"k": 1}));
    }

    // -----------------------------------------------------------------------
    // append_unique
    // -----------------------------------------------------------------------

    #[test]
    fn append_is_idempotent() {
        let mut doc = json!({"instructions": ["a"]});
        assert!(!append_unique(&mut doc, "instructions", json!("a")).unwrap());
        assert!(!append_unique(&mut doc, "instructions", json!("a")).unwrap());
        assert_eq!(doc, json!({"instructions": ["a"]}));
    }

    #[test]
    fn append_adds_new_values_in_order() {
        let mut doc = json!({"instructions": ["a"]});
        assert!(append_unique(&mut doc, "instructions", json!("b")).unwrap());
        assert_eq!(doc["instructions"], json!(["a", "b"]));
    }

    #[test]
    fn append_creates_missing_array() {
        let mut doc = json!({"other": true});
        assert!(append_unique(&mut doc, "permissions.allow", json!("Bash(ls)")).unwrap());
        assert_eq!(
            doc,
            json!({"other": true, "permissions": {"allow": ["Bash(ls)"]}})
        );

        let mut doc = json!({"list": null});
        assert!(append_unique(&mut doc, "list", json!(1)).unwrap());
        assert_eq!(doc, json!({"list": [1]}));
    }

    #[test]
    fn append_to_non_array_fails() {
        let mut doc = json!({"instructions": "a"});
        let err = append_unique(&mut doc, "instructions", json!("b")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotAnArray { ref path, found: "a string" } if path == "instructions"
        ));
        assert_eq!(doc, json!({"instructions": "a"}));
    }
}
