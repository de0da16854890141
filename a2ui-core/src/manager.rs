//! Manager facade
//!
//! Composition root owning one surface store, one data model store, and one
//! event bus. All external mutation routes through here; lifecycle events
//! are published only after the corresponding store mutation has fully
//! applied, so a listener always observes post-mutation state.
//!
//! The manager never panics across its API: failures are logged and
//! reported as falsy returns, with an `error` event as the second,
//! subscription-based detection channel.

use crate::data_store::DataModelStore;
use crate::dispatch::{self, BatchReport};
use crate::error::A2uiError;
use crate::events::{EventBus, EventPayload, ListenerId};
use crate::surface::{Surface, SurfaceStore};
use a2ui_types::{ComponentDefinition, Message, SurfaceStyles};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Counts reported by [`A2uiManager::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerState {
    pub surface_count: usize,
    pub data_model_count: usize,
    pub destroyed: bool,
}

/// Owns the per-session protocol state and the dispatch pipeline.
#[derive(Debug, Default)]
pub struct A2uiManager {
    surfaces: SurfaceStore,
    data: DataModelStore,
    bus: EventBus,
    destroyed: bool,
}

impl A2uiManager {
    pub fn new() -> Self {
        Self {
            surfaces: SurfaceStore::new(),
            data: DataModelStore::new(),
            bus: EventBus::new(),
            destroyed: false,
        }
    }

    fn guard_destroyed(&self, operation: &str) -> bool {
        if self.destroyed {
            error!(operation, "manager is destroyed");
        }
        self.destroyed
    }

    // ===== Surface management =====

    /// Creates a surface (idempotent) and its empty data model.
    pub fn create_surface(
        &mut self,
        surface_id: &str,
        root_component_id: &str,
        styles: Option<SurfaceStyles>,
    ) -> bool {
        if self.guard_destroyed("create_surface") {
            return false;
        }

        let existed = self.surfaces.has(surface_id);
        if !self.surfaces.create(surface_id, root_component_id, styles) {
            return false;
        }
        self.data.init(surface_id);

        if !existed {
            self.bus.emit(&EventPayload::SurfaceCreated {
                surface_id: surface_id.to_string(),
            });
        }
        true
    }

    pub fn surface(&self, surface_id: &str) -> Option<&Surface> {
        self.surfaces.get(surface_id)
    }

    pub fn has_surface(&self, surface_id: &str) -> bool {
        self.surfaces.has(surface_id)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.count()
    }

    /// Deletes a surface and its data model.
    pub fn delete_surface(&mut self, surface_id: &str) -> bool {
        if self.guard_destroyed("delete_surface") {
            return false;
        }

        if !self.surfaces.delete(surface_id) {
            return false;
        }
        self.data.destroy(surface_id);

        self.bus.emit(&EventPayload::SurfaceDeleted {
            surface_id: surface_id.to_string(),
        });
        true
    }

    /// Adds components to a surface; true when at least one was accepted.
    pub fn update_components(
        &mut self,
        surface_id: &str,
        components: &[ComponentDefinition],
    ) -> bool {
        if self.guard_destroyed("update_components") {
            return false;
        }

        let Some(applied) = self.surfaces.add_components(surface_id, components) else {
            return false;
        };

        self.bus.emit(&EventPayload::SurfaceUpdated {
            surface_id: surface_id.to_string(),
            component_count: applied,
        });
        debug!(surface_id, applied, "components updated");
        applied > 0
    }

    /// Shallow-merges styles into an existing surface's record.
    pub fn update_styles(&mut self, surface_id: &str, styles: &SurfaceStyles) -> bool {
        if self.guard_destroyed("update_styles") {
            return false;
        }
        let Some(surface) = self.surfaces.get_mut(surface_id) else {
            error!(surface_id, "surface not found");
            return false;
        };
        surface.update_styles(styles)
    }

    // ===== Data model management =====

    pub fn init_data_model(&mut self, surface_id: &str) -> bool {
        if self.guard_destroyed("init_data_model") {
            return false;
        }
        self.data.init(surface_id)
    }

    pub fn has_data_model(&self, surface_id: &str) -> bool {
        self.data.has_model(surface_id)
    }

    /// Read-only view of a surface's whole data model.
    pub fn data_model(&self, surface_id: &str) -> Option<&Value> {
        self.data.model(surface_id)
    }

    /// Writes `value` at `path`, creating the model on first write. The
    /// root path replaces the whole model.
    pub fn update_data(&mut self, surface_id: &str, path: &str, value: Value) -> bool {
        if self.guard_destroyed("update_data") {
            return false;
        }

        let normalized = crate::path::normalize(path);
        let event_value = value.clone();
        let ok = if normalized.is_empty() {
            self.data.replace_all(surface_id, value)
        } else {
            self.data.set_value(surface_id, &normalized, value)
        };
        if !ok {
            return false;
        }

        self.bus.emit(&EventPayload::DataUpdated {
            surface_id: surface_id.to_string(),
            path: normalized,
            value: event_value,
        });
        true
    }

    /// Snapshot of the value at `path`, or `None` when absent.
    pub fn get_data(&self, surface_id: &str, path: &str) -> Option<Value> {
        self.data.get(surface_id, path).cloned()
    }

    /// Recursively merges `value` into the mapping at `path`.
    pub fn merge_data(&mut self, surface_id: &str, path: &str, value: Value) -> bool {
        if self.guard_destroyed("merge_data") {
            return false;
        }

        let event_value = value.clone();
        if !self.data.merge(surface_id, path, value) {
            return false;
        }

        self.bus.emit(&EventPayload::DataUpdated {
            surface_id: surface_id.to_string(),
            path: crate::path::normalize(path),
            value: event_value,
        });
        true
    }

    /// Removes the value at `path`.
    pub fn delete_data(&mut self, surface_id: &str, path: &str) -> bool {
        if self.guard_destroyed("delete_data") {
            return false;
        }

        if !self.data.delete(surface_id, path) {
            return false;
        }

        self.bus.emit(&EventPayload::DataDeleted {
            surface_id: surface_id.to_string(),
            path: crate::path::normalize(path),
        });
        true
    }

    // ===== Message processing =====

    /// Applies one message; failures are logged, reported on the `error`
    /// channel, and returned as `false`.
    pub fn process_message(&mut self, message: &Message) -> bool {
        if self.guard_destroyed("process_message") {
            return false;
        }

        match dispatch::apply_message(message, &mut self.surfaces, &mut self.data) {
            Ok(event) => {
                if let Some(event) = event {
                    self.bus.emit(&event);
                }
                true
            }
            Err(err) => {
                self.report_error(&err);
                false
            }
        }
    }

    /// Applies messages strictly in input order; one failure does not abort
    /// the remainder of the batch.
    pub fn process_messages(&mut self, messages: &[Message]) -> BatchReport {
        let mut report = BatchReport::default();
        if self.guard_destroyed("process_messages") {
            return report;
        }

        for message in messages {
            report.record(self.process_message(message));
        }

        debug!(
            total = report.total,
            success = report.success,
            failed = report.failed,
            "batch processed"
        );
        report
    }

    pub(crate) fn report_error(&mut self, err: &A2uiError) {
        warn!(%err, "operation failed");
        self.bus.emit(&EventPayload::Error {
            kind: err.kind().to_string(),
            surface_id: err.surface_id().map(str::to_string),
            message: err.to_string(),
        });
    }

    // ===== Events =====

    pub fn on<F>(&mut self, channel: &str, handler: F) -> ListenerId
    where
        F: FnMut(&EventPayload) + Send + 'static,
    {
        self.bus.on(channel, handler)
    }

    pub fn once<F>(&mut self, channel: &str, handler: F) -> ListenerId
    where
        F: FnMut(&EventPayload) + Send + 'static,
    {
        self.bus.once(channel, handler)
    }

    pub fn off(&mut self, channel: &str, id: ListenerId) -> bool {
        self.bus.off(channel, id)
    }

    pub fn emit(&mut self, payload: &EventPayload) -> bool {
        self.bus.emit(payload)
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.bus.listener_count(channel)
    }

    // ===== Lifecycle =====

    /// Clears all surfaces, data models, and listeners without destroying
    /// the manager.
    pub fn reset(&mut self) {
        if self.guard_destroyed("reset") {
            return;
        }
        self.surfaces.clear();
        self.data.clear_all();
        self.bus.remove_all_listeners(None);
        debug!("manager reset");
    }

    /// Terminal teardown; every further mutating call fails. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.reset();
        self.destroyed = true;
        debug!("manager destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn state(&self) -> ManagerState {
        ManagerState {
            surface_count: self.surfaces.count(),
            data_model_count: self.data.model_count(),
            destroyed: self.destroyed,
        }
    }
}

/// Cloneable handle to a manager shared between an update-pushing task and
/// readers. Writes serialize on the inner lock; readers take value
/// snapshots via [`A2uiManager::get_data`].
///
/// This is the explicit replacement for a process-wide singleton: callers
/// construct one and pass clones to whoever needs the shared instance.
#[derive(Clone)]
pub struct SharedManager {
    inner: Arc<Mutex<A2uiManager>>,
}

impl SharedManager {
    pub fn new() -> Self {
        Self::from_manager(A2uiManager::new())
    }

    pub fn from_manager(manager: A2uiManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Runs `f` with exclusive access to the manager.
    pub fn with<R>(&self, f: impl FnOnce(&mut A2uiManager) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn reset(&self) {
        self.with(A2uiManager::reset);
    }

    pub fn destroy(&self) {
        self.with(A2uiManager::destroy);
    }
}

impl Default for SharedManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2ui_types::{BeginRendering, DataEntry, DataModelUpdate};
    use serde_json::json;
    use std::sync::{Arc as StdArc, Mutex as StdMutex};

    fn text_component(id: &str, text: &str) -> ComponentDefinition {
        ComponentDefinition::new(id, "Text", json!({ "text": { "literalString": text } }))
    }

    fn data_update(surface_id: &str, path: Option<&str>, contents: Vec<DataEntry>) -> Message {
        Message::DataModelUpdate(DataModelUpdate {
            surface_id: surface_id.into(),
            path: path.map(str::to_string),
            contents,
        })
    }

    #[test]
    fn test_create_surface_emits_once() {
        let mut manager = A2uiManager::new();
        let events = StdArc::new(StdMutex::new(0));

        let e = StdArc::clone(&events);
        manager.on("surface:created", move |_| *e.lock().unwrap() += 1);

        assert!(manager.create_surface("s1", "root", None));
        assert!(manager.create_surface("s1", "root", None));
        assert_eq!(*events.lock().unwrap(), 1);
        assert!(manager.has_data_model("s1"));
    }

    #[test]
    fn test_listener_sees_post_mutation_payload() {
        let mut manager = A2uiManager::new();
        let seen = StdArc::new(StdMutex::new(None));

        let s = StdArc::clone(&seen);
        manager.on("data:updated", move |payload| {
            if let EventPayload::DataUpdated { path, value, .. } = payload {
                *s.lock().unwrap() = Some((path.clone(), value.clone()));
            }
        });

        manager.update_data("s1", "/count", json!(1));
        // The event fires after the store mutation completed.
        assert_eq!(manager.get_data("s1", "/count"), Some(json!(1)));
        assert_eq!(
            *seen.lock().unwrap(),
            Some(("/count".to_string(), json!(1)))
        );
    }

    #[test]
    fn test_order_sensitivity_within_batch() {
        let mut manager = A2uiManager::new();
        let report = manager.process_messages(&[
            data_update("s1", Some("/user"), vec![DataEntry::string("name", "A")]),
            data_update("s1", Some("/user"), vec![DataEntry::string("name", "B")]),
        ]);

        assert_eq!(report.success, 2);
        assert_eq!(manager.get_data("s1", "/user/name"), Some(json!("B")));
    }

    #[test]
    fn test_batch_failure_does_not_abort() {
        let mut manager = A2uiManager::new();
        let errors = StdArc::new(StdMutex::new(Vec::new()));

        let e = StdArc::clone(&errors);
        manager.on("error", move |payload| {
            if let EventPayload::Error { kind, .. } = payload {
                e.lock().unwrap().push(kind.clone());
            }
        });

        let report = manager.process_messages(&[
            Message::SurfaceUpdate(a2ui_types::SurfaceUpdate {
                surface_id: "ghost".into(),
                components: vec![text_component("a", "x")],
            }),
            Message::BeginRendering(BeginRendering {
                surface_id: "s1".into(),
                root: "root".into(),
                styles: None,
            }),
        ]);

        assert_eq!(report.total, 2);
        assert_eq!(report.success, 1);
        assert_eq!(report.failed, 1);
        assert!(manager.has_surface("s1"));
        assert_eq!(*errors.lock().unwrap(), vec!["surface_not_found"]);
    }

    #[test]
    fn test_update_data_root_replaces() {
        let mut manager = A2uiManager::new();
        manager.update_data("s1", "/old", json!(1));
        manager.update_data("s1", "/", json!({ "fresh": true }));
        assert_eq!(manager.get_data("s1", "/"), Some(json!({ "fresh": true })));
    }

    #[test]
    fn test_merge_data_deep() {
        let mut manager = A2uiManager::new();
        manager.update_data("s1", "/", json!({ "a": { "y": 2 } }));
        assert!(manager.merge_data("s1", "/", json!({ "a": { "x": 1 } })));
        assert_eq!(
            manager.get_data("s1", "/"),
            Some(json!({ "a": { "x": 1, "y": 2 } }))
        );
    }

    #[test]
    fn test_delete_data_emits_event() {
        let mut manager = A2uiManager::new();
        manager.update_data("s1", "/a/b", json!(1));

        let seen = StdArc::new(StdMutex::new(Vec::new()));
        let s = StdArc::clone(&seen);
        manager.on("data:deleted", move |payload| {
            if let EventPayload::DataDeleted { path, .. } = payload {
                s.lock().unwrap().push(path.clone());
            }
        });

        assert!(manager.delete_data("s1", "/a/b"));
        assert!(!manager.delete_data("s1", "/a/b"));
        assert_eq!(*seen.lock().unwrap(), vec!["/a/b".to_string()]);
    }

    #[test]
    fn test_destroy_is_terminal_and_idempotent() {
        let mut manager = A2uiManager::new();
        manager.create_surface("s1", "root", None);

        manager.destroy();
        manager.destroy();

        assert!(manager.is_destroyed());
        assert!(!manager.create_surface("s2", "root", None));
        assert!(!manager.update_data("s1", "/a", json!(1)));
        assert!(!manager.delete_surface("s1"));
        assert_eq!(manager.process_messages(&[]).total, 0);
        assert_eq!(manager.state().surface_count, 0);
    }

    #[test]
    fn test_reset_clears_without_destroying() {
        let mut manager = A2uiManager::new();
        manager.create_surface("s1", "root", None);
        manager.on("surface:created", |_| {});

        manager.reset();

        assert!(!manager.is_destroyed());
        assert_eq!(manager.surface_count(), 0);
        assert_eq!(manager.listener_count("surface:created"), 0);
        assert!(manager.create_surface("s2", "root", None));
    }

    #[test]
    fn test_shared_manager_clones_share_state() {
        let shared = SharedManager::new();
        let clone = shared.clone();

        shared.with(|m| m.create_surface("s1", "root", None));
        assert!(clone.with(|m| m.has_surface("s1")));

        clone.destroy();
        assert!(shared.with(|m| m.is_destroyed()));
    }
}
