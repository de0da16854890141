//! Action dispatch
//!
//! User interaction comes back into the core as an [`ActionDescriptor`]:
//! a name plus an ordered sequence of context entries whose values are
//! literals or data-model path references. Dispatching resolves every
//! context value against the owning surface's data model and publishes a
//! structured `action` event for the host application — the system's only
//! outbound surface.

use crate::events::EventPayload;
use crate::manager::A2uiManager;
use crate::value;
use a2ui_types::ActionDescriptor;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Outbound `(name, context)` event delivered to the host application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEvent {
    pub name: String,
    pub context: Map<String, Value>,
}

impl A2uiManager {
    /// Resolves an action's context against `surface_id`'s data model and
    /// emits the `action` event. Relative context paths resolve against
    /// `context_path` (the ambient path of e.g. a list row).
    ///
    /// Returns the resolved event, or `None` for a nameless action.
    pub fn dispatch_action(
        &mut self,
        surface_id: &str,
        action: &ActionDescriptor,
        context_path: Option<&str>,
    ) -> Option<ActionEvent> {
        if action.name.is_empty() {
            warn!(surface_id, "ignoring action without a name");
            return None;
        }

        let empty = Value::Null;
        let model = self.data_model(surface_id).unwrap_or(&empty);

        let mut context = Map::new();
        for entry in &action.context {
            if entry.key.is_empty() {
                warn!(surface_id, action = %action.name, "skipping context entry without a key");
                continue;
            }
            let resolved = value::resolve_descriptor(&entry.value, model, context_path);
            context.insert(entry.key.clone(), resolved);
        }

        debug!(surface_id, action = %action.name, "action dispatched");

        let event = ActionEvent {
            name: action.name.clone(),
            context,
        };
        self.emit(&EventPayload::Action {
            name: event.name.clone(),
            context: event.context.clone(),
        });
        Some(event)
    }
}
