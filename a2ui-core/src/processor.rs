//! Message processor
//!
//! Thin session facade over an [`A2uiManager`]: the single entry point a
//! transport feeds decoded messages into, plus read-only surface summaries
//! for the host. A processor owns its manager for the lifetime of one
//! processing session and tears it down on destroy.

use crate::dispatch::BatchReport;
use crate::manager::A2uiManager;
use crate::surface::SurfaceSummary;
use a2ui_types::Message;
use serde_json::Value;
use tracing::{error, warn};

/// Per-call processing options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Delete every existing surface before applying the batch.
    pub clear_before: bool,
}

/// Owns one manager and feeds message batches through it.
#[derive(Debug, Default)]
pub struct MessageProcessor {
    manager: A2uiManager,
    destroyed: bool,
}

impl MessageProcessor {
    pub fn new() -> Self {
        Self::from_manager(A2uiManager::new())
    }

    /// Wraps an existing manager, e.g. one with listeners already attached.
    pub fn from_manager(manager: A2uiManager) -> Self {
        Self {
            manager,
            destroyed: false,
        }
    }

    /// Applies a batch of decoded messages in order.
    pub fn process_messages(&mut self, messages: &[Message], options: ProcessOptions) -> BatchReport {
        if self.destroyed {
            error!("cannot process messages: processor is destroyed");
            return BatchReport::default();
        }

        if options.clear_before {
            let cleared = self.clear_surfaces();
            tracing::debug!(cleared, "cleared surfaces before processing");
        }

        self.manager.process_messages(messages)
    }

    /// Decodes loose JSON messages and applies them in order. Messages that
    /// fail to decode (unknown tag, malformed body) count as failures but
    /// do not abort the batch.
    pub fn process_json(&mut self, messages: &[Value], options: ProcessOptions) -> BatchReport {
        if self.destroyed {
            error!("cannot process messages: processor is destroyed");
            return BatchReport::default();
        }

        if options.clear_before {
            let cleared = self.clear_surfaces();
            tracing::debug!(cleared, "cleared surfaces before processing");
        }

        let mut report = BatchReport::default();
        for raw in messages {
            match Message::from_json(raw.clone()) {
                Ok(message) => report.record(self.manager.process_message(&message)),
                Err(err) => {
                    warn!(%err, "unknown or malformed message");
                    report.record(false);
                }
            }
        }
        report
    }

    /// Read-only summaries of every active surface.
    pub fn surfaces(&self) -> Vec<SurfaceSummary> {
        if self.destroyed {
            warn!("cannot get surfaces: processor is destroyed");
            return Vec::new();
        }

        self.manager
            .surfaces()
            .map(|surface| {
                let mut summary = surface.summary();
                summary.has_data_model = self.manager.has_data_model(surface.id());
                summary
            })
            .collect()
    }

    /// Deletes every surface, returning how many were removed.
    pub fn clear_surfaces(&mut self) -> usize {
        if self.destroyed {
            warn!("cannot clear surfaces: processor is destroyed");
            return 0;
        }

        let ids: Vec<String> = self
            .manager
            .surfaces()
            .map(|surface| surface.id().to_string())
            .collect();
        let count = ids.len();
        for id in ids {
            self.manager.delete_surface(&id);
        }
        count
    }

    pub fn manager(&self) -> &A2uiManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut A2uiManager {
        &mut self.manager
    }

    /// Destroys the processor and its manager. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            warn!("processor already destroyed");
            return;
        }
        self.clear_surfaces();
        self.manager.destroy();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2ui_types::{BeginRendering, DataEntry, DataModelUpdate};
    use serde_json::json;

    fn begin(surface_id: &str) -> Message {
        Message::BeginRendering(BeginRendering {
            surface_id: surface_id.into(),
            root: "root".into(),
            styles: None,
        })
    }

    #[test]
    fn test_process_and_summarize() {
        let mut processor = MessageProcessor::new();
        let report = processor.process_messages(
            &[
                begin("s1"),
                Message::DataModelUpdate(DataModelUpdate {
                    surface_id: "s1".into(),
                    path: None,
                    contents: vec![DataEntry::number("count", 0.0)],
                }),
            ],
            ProcessOptions::default(),
        );

        assert_eq!(report.success, 2);
        let surfaces = processor.surfaces();
        assert_eq!(surfaces.len(), 1);
        assert_eq!(surfaces[0].id, "s1");
        assert_eq!(surfaces[0].root_component_id, "root");
        assert!(surfaces[0].has_data_model);
    }

    #[test]
    fn test_clear_before_drops_existing_surfaces() {
        let mut processor = MessageProcessor::new();
        processor.process_messages(&[begin("old")], ProcessOptions::default());

        processor.process_messages(
            &[begin("new")],
            ProcessOptions { clear_before: true },
        );

        let ids: Vec<String> = processor.surfaces().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["new".to_string()]);
    }

    #[test]
    fn test_process_json_counts_undecodable_as_failed() {
        let mut processor = MessageProcessor::new();
        let report = processor.process_json(
            &[
                json!({ "beginRendering": { "surfaceId": "s1", "root": "r" } }),
                json!({ "unknownKind": {} }),
                json!("not even an object"),
            ],
            ProcessOptions::default(),
        );

        assert_eq!(report.total, 3);
        assert_eq!(report.success, 1);
        assert_eq!(report.failed, 2);
        assert!(processor.manager().has_surface("s1"));
    }

    #[test]
    fn test_destroy_is_terminal() {
        let mut processor = MessageProcessor::new();
        processor.process_messages(&[begin("s1")], ProcessOptions::default());

        processor.destroy();
        processor.destroy();

        assert!(processor.is_destroyed());
        assert!(processor.surfaces().is_empty());
        let report = processor.process_messages(&[begin("s2")], ProcessOptions::default());
        assert_eq!(report.total, 0);
    }
}
