//! A2UI core - protocol and state engine for server-driven surfaces
//!
//! A remote agent streams declarative messages describing a tree of UI
//! components and an associated data model; this crate incrementally
//! builds, mutates, and exposes that state, and reflects user interaction
//! back as data updates and named actions. It deliberately excludes the
//! visual rendering of components, the transport delivering messages, and
//! styling details: a renderer consumes the core only through read-only
//! views and [`value::resolve`], and a transport only calls
//! [`MessageProcessor::process_messages`].
//!
//! ## Architecture
//!
//! - [`path`]: pure slash-delimited path access into a nested value
//! - [`value`]: literal/path descriptor resolution and wire-contents parsing
//! - [`data_store`]: per-surface data models
//! - [`surface`]: per-surface component trees and styles
//! - [`events`]: synchronous pub/sub with wildcard channel
//! - [`dispatch`]: routing of the four message kinds onto the stores
//! - [`manager`]: the composition root external callers hold
//! - [`processor`]: per-session entry point for message batches
//! - [`action`]: outbound `(name, context)` action events
//!
//! ## Example
//!
//! ```rust
//! use a2ui_core::{MessageProcessor, ProcessOptions};
//! use a2ui_types::Message;
//! use serde_json::json;
//!
//! let mut processor = MessageProcessor::new();
//!
//! let messages: Vec<Message> = serde_json::from_value(json!([
//!     { "beginRendering": { "surfaceId": "s1", "root": "r" } },
//!     { "surfaceUpdate": { "surfaceId": "s1", "components": [
//!         { "id": "r", "component": { "Text": { "text": { "literalString": "Hi" } } } }
//!     ] } },
//!     { "dataModelUpdate": { "surfaceId": "s1", "contents": [
//!         { "key": "count", "valueNumber": 0 }
//!     ] } }
//! ]))
//! .unwrap();
//!
//! let report = processor.process_messages(&messages, ProcessOptions::default());
//! assert_eq!(report.success, 3);
//!
//! let count = processor.manager().get_data("s1", "/count");
//! assert_eq!(count, Some(json!(0.0)));
//! ```

pub mod action;
pub mod data_store;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod manager;
pub mod path;
pub mod processor;
pub mod surface;
pub mod value;

pub use action::ActionEvent;
pub use data_store::DataModelStore;
pub use dispatch::BatchReport;
pub use error::{A2uiError, A2uiResult};
pub use events::{EventBus, EventPayload, ListenerId, WILDCARD};
pub use manager::{A2uiManager, ManagerState, SharedManager};
pub use processor::{MessageProcessor, ProcessOptions};
pub use surface::{Surface, SurfaceStore, SurfaceSummary};
