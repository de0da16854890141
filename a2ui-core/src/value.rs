//! Value descriptor resolution and wire-contents parsing
//!
//! A descriptor is either a literal (`literalString`, `literalNumber`,
//! `literalBoolean`, `literalArray`) or a `path` reference into the owning
//! surface's data model. Resolution is a pure read; it never mutates the
//! model. Relative paths resolve against an ambient context path, which is
//! how list templates bind row-scoped data.

use crate::path;
use a2ui_types::{DataEntry, ValueDescriptor};
use serde_json::{Map, Value};
use tracing::warn;

/// Tag names checked on loose descriptors, in priority order.
const DESCRIPTOR_TAGS: [&str; 5] = [
    "literalString",
    "literalNumber",
    "literalBoolean",
    "literalArray",
    "path",
];

/// Resolves a loose JSON descriptor against `model`.
///
/// Non-object inputs are already concrete and pass through unchanged. An
/// object carrying none of the five descriptor tags resolves to null. When
/// several tags are present the first in priority order wins.
pub fn resolve(descriptor: &Value, model: &Value, context_path: Option<&str>) -> Value {
    let map = match descriptor {
        Value::Object(map) => map,
        other => return other.clone(),
    };

    for tag in DESCRIPTOR_TAGS {
        if let Some(tagged) = map.get(tag) {
            if tag == "path" {
                return resolve_path_tag(tagged, model, context_path);
            }
            return tagged.clone();
        }
    }

    Value::Null
}

fn resolve_path_tag(tagged: &Value, model: &Value, context_path: Option<&str>) -> Value {
    let Some(raw) = tagged.as_str() else {
        warn!(?tagged, "path tag is not a string");
        return Value::Null;
    };

    let target = contextualize(raw, context_path);
    match path::get(model, &target) {
        Some(value) => value.clone(),
        None => Value::Null,
    }
}

/// Joins a relative path onto the ambient context path. Absolute paths and
/// empty contexts pass through untouched.
pub fn contextualize(raw: &str, context_path: Option<&str>) -> String {
    if raw.starts_with('/') {
        return raw.to_string();
    }
    match context_path {
        Some(base) if !base.trim().is_empty() => {
            format!("{}/{raw}", base.trim_end_matches('/'))
        }
        _ => raw.to_string(),
    }
}

/// Resolves a typed descriptor against `model`.
pub fn resolve_descriptor(
    descriptor: &ValueDescriptor,
    model: &Value,
    context_path: Option<&str>,
) -> Value {
    match descriptor {
        ValueDescriptor::LiteralString(s) => Value::String(s.clone()),
        ValueDescriptor::LiteralNumber(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueDescriptor::LiteralBoolean(b) => Value::Bool(*b),
        ValueDescriptor::LiteralArray(items) => Value::Array(items.clone()),
        ValueDescriptor::Path(raw) => {
            let target = contextualize(raw, context_path);
            path::get(model, &target).cloned().unwrap_or(Value::Null)
        }
    }
}

/// Applies [`resolve`] to every value of a key→descriptor mapping,
/// preserving keys.
pub fn resolve_map(
    descriptors: &Map<String, Value>,
    model: &Value,
    context_path: Option<&str>,
) -> Map<String, Value> {
    descriptors
        .iter()
        .map(|(key, descriptor)| (key.clone(), resolve(descriptor, model, context_path)))
        .collect()
}

/// True when a loose descriptor is a `path` reference. Rendering uses this
/// to detect two-way-bindable fields.
pub fn is_path_reference(descriptor: &Value) -> bool {
    descriptor
        .as_object()
        .is_some_and(|map| map.contains_key("path"))
}

/// The raw path string of a loose `path` descriptor, if any.
pub fn path_of(descriptor: &Value) -> Option<&str> {
    descriptor.as_object()?.get("path")?.as_str()
}

/// Parses wire `contents` entries into a native value tree.
///
/// Scalar fields pass through; `valueMap` recurses. Entries missing a key
/// or carrying no value field are skipped with a warning, matching the
/// partial-success posture of the rest of the pipeline.
pub fn parse_data_contents(contents: &[DataEntry]) -> Map<String, Value> {
    let mut result = Map::new();

    for entry in contents {
        if entry.key.is_empty() {
            warn!("data entry missing key, skipping");
            continue;
        }

        let value = if let Some(s) = &entry.value_string {
            Value::String(s.clone())
        } else if let Some(n) = entry.value_number {
            serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        } else if let Some(b) = entry.value_boolean {
            Value::Bool(b)
        } else if let Some(items) = &entry.value_array {
            Value::Array(items.clone())
        } else if let Some(nested) = &entry.value_map {
            Value::Object(parse_data_contents(nested))
        } else {
            warn!(key = %entry.key, "data entry carries no value field, skipping");
            continue;
        };

        result.insert(entry.key.clone(), value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_literals_in_priority_order() {
        let model = json!({});

        assert_eq!(
            resolve(&json!({ "literalString": "Hi" }), &model, None),
            json!("Hi")
        );
        assert_eq!(
            resolve(&json!({ "literalNumber": 3.5 }), &model, None),
            json!(3.5)
        );
        assert_eq!(
            resolve(&json!({ "literalBoolean": true }), &model, None),
            json!(true)
        );
        assert_eq!(
            resolve(&json!({ "literalArray": [1, 2] }), &model, None),
            json!([1, 2])
        );

        // First tag in priority order wins on malformed multi-tag input.
        assert_eq!(
            resolve(
                &json!({ "literalNumber": 1, "literalString": "s" }),
                &model,
                None
            ),
            json!("s")
        );
    }

    #[test]
    fn test_resolve_passes_through_concrete_values() {
        let model = json!({});
        assert_eq!(resolve(&json!("plain"), &model, None), json!("plain"));
        assert_eq!(resolve(&json!(7), &model, None), json!(7));
        assert_eq!(resolve(&Value::Null, &model, None), Value::Null);
    }

    #[test]
    fn test_resolve_untagged_object_is_null() {
        let model = json!({});
        assert_eq!(resolve(&json!({ "other": 1 }), &model, None), Value::Null);
    }

    #[test]
    fn test_resolve_absolute_path() {
        let model = json!({ "user": { "name": "Ada" } });
        assert_eq!(
            resolve(&json!({ "path": "/user/name" }), &model, None),
            json!("Ada")
        );
        assert_eq!(
            resolve(&json!({ "path": "/user/missing" }), &model, None),
            Value::Null
        );
    }

    #[test]
    fn test_resolve_relative_path_against_context() {
        let model = json!({ "users": { "1": { "age": 36 } }, "age": 99 });

        assert_eq!(
            resolve(&json!({ "path": "age" }), &model, Some("/users/1")),
            json!(36)
        );
        // Without a context the relative path reads from the root.
        assert_eq!(resolve(&json!({ "path": "age" }), &model, None), json!(99));
        // Absolute paths ignore the context.
        assert_eq!(
            resolve(&json!({ "path": "/age" }), &model, Some("/users/1")),
            json!(99)
        );
    }

    #[test]
    fn test_resolve_descriptor_typed() {
        let model = json!({ "count": 2 });
        assert_eq!(
            resolve_descriptor(&ValueDescriptor::Path("/count".into()), &model, None),
            json!(2)
        );
        assert_eq!(
            resolve_descriptor(
                &ValueDescriptor::LiteralString("Hi".into()),
                &model,
                None
            ),
            json!("Hi")
        );
    }

    #[test]
    fn test_resolve_map_preserves_keys() {
        let model = json!({ "name": "Ada" });
        let descriptors = json!({
            "label": { "literalString": "Name" },
            "value": { "path": "/name" }
        });

        let resolved = resolve_map(descriptors.as_object().unwrap(), &model, None);
        assert_eq!(resolved.get("label"), Some(&json!("Name")));
        assert_eq!(resolved.get("value"), Some(&json!("Ada")));
    }

    #[test]
    fn test_path_introspection() {
        assert!(is_path_reference(&json!({ "path": "/x" })));
        assert!(!is_path_reference(&json!({ "literalString": "x" })));
        assert!(!is_path_reference(&json!("x")));
        assert_eq!(path_of(&json!({ "path": "/x" })), Some("/x"));
        assert_eq!(path_of(&json!({ "literalString": "x" })), None);
    }

    #[test]
    fn test_parse_data_contents_nested() {
        let contents = vec![
            DataEntry::string("name", "Ada"),
            DataEntry::number("age", 36.0),
            DataEntry::boolean("active", true),
            DataEntry::map(
                "address",
                vec![DataEntry::string("city", "London")],
            ),
        ];

        let parsed = parse_data_contents(&contents);
        assert_eq!(
            Value::Object(parsed),
            json!({
                "name": "Ada",
                "age": 36.0,
                "active": true,
                "address": { "city": "London" }
            })
        );
    }

    #[test]
    fn test_parse_data_contents_skips_invalid_entries() {
        let contents = vec![
            DataEntry::string("ok", "v"),
            DataEntry {
                key: String::new(),
                value_string: Some("dropped".into()),
                ..Default::default()
            },
            DataEntry {
                key: "no_value".into(),
                ..Default::default()
            },
        ];

        let parsed = parse_data_contents(&contents);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("ok"), Some(&json!("v")));
    }
}
