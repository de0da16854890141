//! Message dispatch
//!
//! Stateless routing of the four inbound message kinds onto the two stores.
//! Each application returns the lifecycle event to publish, so the caller
//! can guarantee mutation-before-event ordering. Failures come back as
//! typed errors; nothing in here panics for malformed input.

use crate::data_store::DataModelStore;
use crate::error::{A2uiError, A2uiResult};
use crate::events::EventPayload;
use crate::surface::SurfaceStore;
use crate::value;
use a2ui_types::{
    BeginRendering, DataModelUpdate, DeleteSurface, Message, SurfaceUpdate,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Aggregate result of one `process_messages` batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record(&mut self, success: bool) {
        self.total += 1;
        if success {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Applies one message to the stores, returning the event to emit.
/// `Ok(None)` is a successful no-op, e.g. re-creating an existing surface.
pub(crate) fn apply_message(
    message: &Message,
    surfaces: &mut SurfaceStore,
    data: &mut DataModelStore,
) -> A2uiResult<Option<EventPayload>> {
    match message {
        Message::BeginRendering(m) => apply_begin_rendering(m, surfaces, data),
        Message::SurfaceUpdate(m) => apply_surface_update(m, surfaces),
        Message::DataModelUpdate(m) => apply_data_model_update(m, data),
        Message::DeleteSurface(m) => apply_delete_surface(m, surfaces, data),
    }
}

fn apply_begin_rendering(
    message: &BeginRendering,
    surfaces: &mut SurfaceStore,
    data: &mut DataModelStore,
) -> A2uiResult<Option<EventPayload>> {
    if message.surface_id.is_empty() || message.root.is_empty() {
        return Err(A2uiError::InvalidMessage(
            "beginRendering requires surfaceId and root".into(),
        ));
    }

    debug!(surface_id = %message.surface_id, "begin rendering");

    let existed = surfaces.has(&message.surface_id);
    if !surfaces.create(&message.surface_id, &message.root, message.styles.clone()) {
        return Err(A2uiError::InvalidMessage(format!(
            "could not create surface: {}",
            message.surface_id
        )));
    }
    data.init(&message.surface_id);

    if existed {
        return Ok(None);
    }
    Ok(Some(EventPayload::SurfaceCreated {
        surface_id: message.surface_id.clone(),
    }))
}

fn apply_surface_update(
    message: &SurfaceUpdate,
    surfaces: &mut SurfaceStore,
) -> A2uiResult<Option<EventPayload>> {
    if message.surface_id.is_empty() {
        return Err(A2uiError::InvalidMessage(
            "surfaceUpdate requires surfaceId".into(),
        ));
    }

    debug!(
        surface_id = %message.surface_id,
        components = message.components.len(),
        "surface update"
    );

    let applied = surfaces
        .add_components(&message.surface_id, &message.components)
        .ok_or_else(|| A2uiError::SurfaceNotFound(message.surface_id.clone()))?;

    if applied == 0 {
        return Err(A2uiError::NoComponentsAccepted(message.surface_id.clone()));
    }

    Ok(Some(EventPayload::SurfaceUpdated {
        surface_id: message.surface_id.clone(),
        component_count: applied,
    }))
}

fn apply_data_model_update(
    message: &DataModelUpdate,
    data: &mut DataModelStore,
) -> A2uiResult<Option<EventPayload>> {
    if message.surface_id.is_empty() {
        return Err(A2uiError::InvalidMessage(
            "dataModelUpdate requires surfaceId".into(),
        ));
    }

    let target_path = message.path.as_deref().unwrap_or("/");
    debug!(surface_id = %message.surface_id, path = target_path, "data model update");

    if !data.update(&message.surface_id, message.path.as_deref(), &message.contents) {
        return Err(A2uiError::InvalidMessage(format!(
            "could not update data model: {}",
            message.surface_id
        )));
    }

    let value = data
        .get(&message.surface_id, target_path)
        .cloned()
        .unwrap_or(Value::Null);

    Ok(Some(EventPayload::DataUpdated {
        surface_id: message.surface_id.clone(),
        path: crate::path::normalize(target_path),
        value,
    }))
}

fn apply_delete_surface(
    message: &DeleteSurface,
    surfaces: &mut SurfaceStore,
    data: &mut DataModelStore,
) -> A2uiResult<Option<EventPayload>> {
    if message.surface_id.is_empty() {
        return Err(A2uiError::InvalidMessage(
            "deleteSurface requires surfaceId".into(),
        ));
    }

    debug!(surface_id = %message.surface_id, "delete surface");

    let surface_deleted = surfaces.delete(&message.surface_id);
    let model_deleted = data.destroy(&message.surface_id);

    // Success when either store held state for this id.
    if !surface_deleted && !model_deleted {
        return Err(A2uiError::SurfaceNotFound(message.surface_id.clone()));
    }

    Ok(Some(EventPayload::SurfaceDeleted {
        surface_id: message.surface_id.clone(),
    }))
}

/// Parses a `dataModelUpdate`'s contents without applying them. Exposed for
/// hosts that stage updates before committing.
pub fn parse_contents(message: &DataModelUpdate) -> Value {
    Value::Object(value::parse_data_contents(&message.contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2ui_types::{ComponentDefinition, DataEntry};
    use serde_json::json;

    fn stores() -> (SurfaceStore, DataModelStore) {
        (SurfaceStore::new(), DataModelStore::new())
    }

    fn begin(surface_id: &str, root: &str) -> Message {
        Message::BeginRendering(BeginRendering {
            surface_id: surface_id.into(),
            root: root.into(),
            styles: None,
        })
    }

    #[test]
    fn test_begin_rendering_creates_surface_and_model() {
        let (mut surfaces, mut data) = stores();

        let event = apply_message(&begin("s1", "root"), &mut surfaces, &mut data).unwrap();
        assert_eq!(
            event,
            Some(EventPayload::SurfaceCreated {
                surface_id: "s1".into()
            })
        );

        // Idempotent re-create succeeds without a second created event.
        let event = apply_message(&begin("s1", "other"), &mut surfaces, &mut data).unwrap();
        assert_eq!(event, None);
        assert!(surfaces.has("s1"));
        assert!(data.has_model("s1"));
    }

    #[test]
    fn test_begin_rendering_missing_root_fails() {
        let (mut surfaces, mut data) = stores();
        let message = Message::BeginRendering(BeginRendering {
            surface_id: "s1".into(),
            root: String::new(),
            styles: None,
        });

        let err = apply_message(&message, &mut surfaces, &mut data).unwrap_err();
        assert!(matches!(err, A2uiError::InvalidMessage(_)));
        assert!(!surfaces.has("s1"));
    }

    #[test]
    fn test_surface_update_requires_one_accepted_component() {
        let (mut surfaces, mut data) = stores();
        apply_message(&begin("s1", "root"), &mut surfaces, &mut data).unwrap();

        let invalid = ComponentDefinition {
            id: "bad".into(),
            component: serde_json::Map::new(),
            weight: None,
        };
        let message = Message::SurfaceUpdate(SurfaceUpdate {
            surface_id: "s1".into(),
            components: vec![invalid],
        });

        let err = apply_message(&message, &mut surfaces, &mut data).unwrap_err();
        assert!(matches!(err, A2uiError::NoComponentsAccepted(_)));
    }

    #[test]
    fn test_surface_update_unknown_surface() {
        let (mut surfaces, mut data) = stores();
        let message = Message::SurfaceUpdate(SurfaceUpdate {
            surface_id: "ghost".into(),
            components: vec![ComponentDefinition::new("a", "Text", json!({}))],
        });

        let err = apply_message(&message, &mut surfaces, &mut data).unwrap_err();
        assert_eq!(err, A2uiError::SurfaceNotFound("ghost".into()));
    }

    #[test]
    fn test_data_model_update_defaults_to_root() {
        let (mut surfaces, mut data) = stores();

        let message = Message::DataModelUpdate(DataModelUpdate {
            surface_id: "s1".into(),
            path: None,
            contents: vec![DataEntry::number("count", 0.0)],
        });
        let event = apply_message(&message, &mut surfaces, &mut data).unwrap().unwrap();

        match event {
            EventPayload::DataUpdated { path, value, .. } => {
                assert_eq!(path, "");
                assert_eq!(value, json!({ "count": 0.0 }));
            }
            other => panic!("wrong event: {other:?}"),
        }
        assert_eq!(data.get("s1", "/count"), Some(&json!(0.0)));
    }

    #[test]
    fn test_delete_surface_succeeds_if_either_store_held_state() {
        let (mut surfaces, mut data) = stores();

        // Data model only, no surface.
        data.init("s1");
        let message = Message::DeleteSurface(DeleteSurface {
            surface_id: "s1".into(),
        });
        assert!(apply_message(&message, &mut surfaces, &mut data).is_ok());

        // Nothing left anywhere.
        let err = apply_message(&message, &mut surfaces, &mut data).unwrap_err();
        assert_eq!(err, A2uiError::SurfaceNotFound("s1".into()));
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::default();
        report.record(true);
        report.record(false);
        report.record(true);
        assert_eq!(
            report,
            BatchReport {
                total: 3,
                success: 2,
                failed: 1
            }
        );
    }
}
