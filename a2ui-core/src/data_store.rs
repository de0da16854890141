//! Per-surface data model store
//!
//! Each surface owns one arbitrary-depth JSON mapping addressed by
//! slash-delimited paths. The store never panics for missing state:
//! operations on an absent model log a warning and return a safe default.

use crate::path;
use crate::value;
use a2ui_types::DataEntry;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Store of data models keyed by surface id.
#[derive(Debug, Default)]
pub struct DataModelStore {
    models: HashMap<String, Value>,
}

impl DataModelStore {
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Idempotently creates an empty model for `surface_id`.
    pub fn init(&mut self, surface_id: &str) -> bool {
        if surface_id.is_empty() {
            warn!("cannot init data model: empty surface id");
            return false;
        }
        if !self.models.contains_key(surface_id) {
            self.models
                .insert(surface_id.to_string(), Value::Object(Map::new()));
            debug!(surface_id, "data model initialized");
        }
        true
    }

    pub fn has_model(&self, surface_id: &str) -> bool {
        self.models.contains_key(surface_id)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// The whole model for a surface, if one exists.
    pub fn model(&self, surface_id: &str) -> Option<&Value> {
        self.models.get(surface_id)
    }

    /// Replaces the entire model with `data`.
    pub fn replace_all(&mut self, surface_id: &str, data: Value) -> bool {
        if surface_id.is_empty() {
            warn!("cannot replace data model: empty surface id");
            return false;
        }
        self.models.insert(surface_id.to_string(), data);
        true
    }

    /// Parses wire `contents` and applies them at `path`. The root path
    /// replaces the whole model; any other path point-sets the parsed
    /// subtree. The model is created on first write.
    pub fn update(&mut self, surface_id: &str, target_path: Option<&str>, contents: &[DataEntry]) -> bool {
        if !self.init(surface_id) {
            return false;
        }

        let parsed = Value::Object(value::parse_data_contents(contents));
        let normalized = path::normalize(target_path.unwrap_or("/"));

        // init above guarantees the entry exists
        let Some(model) = self.models.get_mut(surface_id) else {
            return false;
        };

        if normalized.is_empty() {
            *model = parsed;
        } else {
            path::set(model, &normalized, parsed);
        }

        debug!(surface_id, path = %normalized, "data model updated");
        true
    }

    /// Point-sets an already-native value at `path`.
    pub fn set_value(&mut self, surface_id: &str, target_path: &str, data: Value) -> bool {
        if !self.init(surface_id) {
            return false;
        }
        let Some(model) = self.models.get_mut(surface_id) else {
            return false;
        };
        path::set(model, target_path, data);
        true
    }

    /// Reads the value at `path`, or `None` (with a diagnostic) when the
    /// surface has no model. The root path returns the full model.
    pub fn get(&self, surface_id: &str, target_path: &str) -> Option<&Value> {
        let Some(model) = self.models.get(surface_id) else {
            warn!(surface_id, "data model not found");
            return None;
        };
        path::get(model, target_path)
    }

    /// Recursively merges `data` into the value at `path`.
    ///
    /// When both sides are non-array mappings the merge is key-wise and
    /// recursive; anything else falls back to a plain set.
    pub fn merge(&mut self, surface_id: &str, target_path: &str, data: Value) -> bool {
        if !self.init(surface_id) {
            return false;
        }

        let current = self
            .models
            .get(surface_id)
            .and_then(|model| path::get(model, target_path));

        let merged = match current {
            Some(existing) => merge_values(existing, &data),
            None => data,
        };

        let normalized = path::normalize(target_path);
        let Some(model) = self.models.get_mut(surface_id) else {
            return false;
        };
        if normalized.is_empty() {
            *model = merged;
        } else {
            path::set(model, &normalized, merged);
        }
        true
    }

    /// Removes the value at `path`; false when the model is absent or the
    /// path is not present.
    pub fn delete(&mut self, surface_id: &str, target_path: &str) -> bool {
        let Some(model) = self.models.get_mut(surface_id) else {
            warn!(surface_id, "data model not found");
            return false;
        };
        path::delete_at(model, target_path)
    }

    /// Drops the surface's model entirely.
    pub fn destroy(&mut self, surface_id: &str) -> bool {
        if self.models.remove(surface_id).is_some() {
            debug!(surface_id, "data model destroyed");
            true
        } else {
            false
        }
    }

    pub fn clear_all(&mut self) {
        self.models.clear();
    }
}

/// Key-wise recursive merge: for every key in `incoming`, if both sides are
/// non-array mappings the merge recurses, otherwise the incoming value
/// replaces the old one. Non-mapping inputs replace wholesale.
pub fn merge_values(existing: &Value, incoming: &Value) -> Value {
    let (Value::Object(old), Value::Object(new)) = (existing, incoming) else {
        return incoming.clone();
    };

    let mut result = old.clone();
    for (key, new_value) in new {
        let merged = match (old.get(key), new_value) {
            (Some(old_value @ Value::Object(_)), Value::Object(_)) => {
                merge_values(old_value, new_value)
            }
            _ => new_value.clone(),
        };
        result.insert(key.clone(), merged);
    }
    Value::Object(result)
}
