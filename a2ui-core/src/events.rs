//! Synchronous publish/subscribe event bus
//!
//! Lifecycle events are typed payloads published on named channels, plus a
//! `*` wildcard channel that observes every emission. Handlers run in
//! registration order; a panicking handler is contained and logged so it
//! cannot block siblings or the emitting call.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::error;

/// Wildcard channel name receiving every emission.
pub const WILDCARD: &str = "*";

/// Handle for unsubscribing a registered listener.
pub type ListenerId = u64;

/// Lifecycle event published by the manager after each successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    SurfaceCreated {
        surface_id: String,
    },
    SurfaceUpdated {
        surface_id: String,
        component_count: usize,
    },
    SurfaceDeleted {
        surface_id: String,
    },
    DataUpdated {
        surface_id: String,
        path: String,
        value: Value,
    },
    DataDeleted {
        surface_id: String,
        path: String,
    },
    /// User-triggered action forwarded to the host application.
    Action {
        name: String,
        context: Map<String, Value>,
    },
    /// Internal failure surfaced for telemetry; mirrors the falsy return.
    Error {
        kind: String,
        surface_id: Option<String>,
        message: String,
    },
}

impl EventPayload {
    /// Channel this payload publishes on.
    pub fn channel(&self) -> &'static str {
        match self {
            EventPayload::SurfaceCreated { .. } => "surface:created",
            EventPayload::SurfaceUpdated { .. } => "surface:updated",
            EventPayload::SurfaceDeleted { .. } => "surface:deleted",
            EventPayload::DataUpdated { .. } => "data:updated",
            EventPayload::DataDeleted { .. } => "data:deleted",
            EventPayload::Action { .. } => "action",
            EventPayload::Error { .. } => "error",
        }
    }
}

type Handler = Box<dyn FnMut(&EventPayload) + Send>;

struct Listener {
    id: ListenerId,
    once: bool,
    handler: Handler,
}

/// Synchronous pub/sub keyed by channel name.
#[derive(Default)]
pub struct EventBus {
    channels: HashMap<String, Vec<Listener>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a handler on `channel`; returns an id usable with [`off`].
    ///
    /// [`off`]: EventBus::off
    pub fn on<F>(&mut self, channel: &str, handler: F) -> ListenerId
    where
        F: FnMut(&EventPayload) + Send + 'static,
    {
        self.register(channel, Box::new(handler), false)
    }

    /// Registers a handler that is removed after its first invocation.
    pub fn once<F>(&mut self, channel: &str, handler: F) -> ListenerId
    where
        F: FnMut(&EventPayload) + Send + 'static,
    {
        self.register(channel, Box::new(handler), true)
    }

    fn register(&mut self, channel: &str, handler: Handler, once: bool) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.channels
            .entry(channel.to_string())
            .or_default()
            .push(Listener { id, once, handler });
        id
    }

    /// Removes one listener; false when the id is unknown on that channel.
    pub fn off(&mut self, channel: &str, id: ListenerId) -> bool {
        let Some(listeners) = self.channels.get_mut(channel) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        let removed = listeners.len() < before;
        if listeners.is_empty() {
            self.channels.remove(channel);
        }
        removed
    }

    /// Publishes `payload` on its channel and on the wildcard channel.
    /// Returns whether any handler ran.
    pub fn emit(&mut self, payload: &EventPayload) -> bool {
        let direct = self.invoke(payload.channel(), payload);
        let wildcard = self.invoke(WILDCARD, payload);
        direct || wildcard
    }

    fn invoke(&mut self, channel: &str, payload: &EventPayload) -> bool {
        let Some(listeners) = self.channels.get_mut(channel) else {
            return false;
        };
        if listeners.is_empty() {
            return false;
        }

        for listener in listeners.iter_mut() {
            let result = catch_unwind(AssertUnwindSafe(|| (listener.handler)(payload)));
            if result.is_err() {
                error!(channel, "event handler panicked");
            }
        }

        listeners.retain(|listener| !listener.once);
        if listeners.is_empty() {
            self.channels.remove(channel);
        }
        true
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, Vec::len)
    }

    pub fn event_names(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Ids of the listeners registered on `channel`, in registration order.
    pub fn listeners(&self, channel: &str) -> Vec<ListenerId> {
        self.channels
            .get(channel)
            .map(|listeners| listeners.iter().map(|l| l.id).collect())
            .unwrap_or_default()
    }

    /// Clears one channel, or every channel when `channel` is `None`.
    pub fn remove_all_listeners(&mut self, channel: Option<&str>) {
        match channel {
            Some(name) => {
                self.channels.remove(name);
            }
            None => self.channels.clear(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("channels", &self.event_names())
            .finish()
    }
}
