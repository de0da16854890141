//! Slash-delimited path access into a data model
//!
//! Pure helpers for reading, writing, and deleting values at paths like
//! `/user/name` inside a nested `serde_json::Value`. All functions work on
//! the normalized form: leading `/`, no trailing `/`, with the bare root
//! normalizing to the empty string (meaning "the whole model").
//!
//! Writes mutate in place under `&mut Value`; exclusive borrows make a
//! copy-on-write discipline unnecessary here.

use serde_json::{Map, Value};

/// Normalizes a path: trims whitespace, ensures a leading `/`, strips the
/// trailing `/`. The root path (`/`, empty, or whitespace) normalizes to
/// the empty string.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return String::new();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };

    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    if normalized == "/" {
        return String::new();
    }

    normalized
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Reads the value at `path`, or `None` the instant a segment is missing or
/// the current value is not indexable. The root path returns the whole
/// model. Arrays are indexable by numeric segments.
pub fn get<'a>(model: &'a Value, path: &str) -> Option<&'a Value> {
    let normalized = normalize(path);
    if normalized.is_empty() {
        return Some(model);
    }

    let mut current = model;
    for key in segments(&normalized) {
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// True when a value exists at `path`.
pub fn has(model: &Value, path: &str) -> bool {
    get(model, path).is_some()
}

/// Writes `value` at `path`, creating intermediate mapping nodes as needed
/// and overwriting any non-mapping intermediate with an empty mapping. The
/// root path replaces the entire model.
pub fn set(model: &mut Value, path: &str, value: Value) {
    let normalized = normalize(path);
    if normalized.is_empty() {
        *model = value;
        return;
    }

    let keys: Vec<&str> = segments(&normalized).collect();

    if !model.is_object() {
        *model = Value::Object(Map::new());
    }

    let mut current = model;
    for key in &keys[..keys.len() - 1] {
        let map = current.as_object_mut().unwrap();
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry;
    }

    let last = keys[keys.len() - 1];
    current
        .as_object_mut()
        .unwrap()
        .insert(last.to_string(), value);
}

/// Deletes the value at `path`, returning whether a value was removed.
///
/// A multi-segment path whose parent chain is not fully present leaves the
/// model unchanged. The root path is a no-op; clearing the whole model is
/// the store's job, not the resolver's.
pub fn delete_at(model: &mut Value, path: &str) -> bool {
    let normalized = normalize(path);
    if normalized.is_empty() {
        return false;
    }

    let keys: Vec<&str> = segments(&normalized).collect();

    let mut current = model;
    for key in &keys[..keys.len() - 1] {
        current = match current {
            Value::Object(map) => match map.get_mut(*key) {
                Some(next) => next,
                None => return false,
            },
            _ => return false,
        };
    }

    match current {
        Value::Object(map) => map.remove(keys[keys.len() - 1]).is_some(),
        _ => false,
    }
}

/// Concatenates two normalized paths.
pub fn join(base: &str, relative: &str) -> String {
    let base = normalize(base);
    let relative = normalize(relative);

    if base.is_empty() {
        return relative;
    }
    if relative.is_empty() {
        return base;
    }
    format!("{base}{relative}")
}
