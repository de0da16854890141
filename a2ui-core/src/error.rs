//! Error types for the A2UI core
//!
//! Failures inside the dispatch pipeline are typed so the manager can sort
//! them into the right log level and `error` event payload. None of these
//! ever cross the public facade as a panic; callers see falsy returns plus
//! an optional `error` event.

use thiserror::Error;

/// Error raised while applying a message to the stores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum A2uiError {
    /// Malformed message: missing required field or wrong shape.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Referenced surface does not exist.
    #[error("surface not found: {0}")]
    SurfaceNotFound(String),

    /// A surface update where every component definition was rejected.
    #[error("no components accepted for surface: {0}")]
    NoComponentsAccepted(String),
}

impl A2uiError {
    /// Stable machine-readable tag carried on `error` events.
    pub fn kind(&self) -> &'static str {
        match self {
            A2uiError::InvalidMessage(_) => "invalid_message",
            A2uiError::SurfaceNotFound(_) => "surface_not_found",
            A2uiError::NoComponentsAccepted(_) => "no_components_accepted",
        }
    }

    /// Surface id the failure relates to, when one exists.
    pub fn surface_id(&self) -> Option<&str> {
        match self {
            A2uiError::SurfaceNotFound(id) | A2uiError::NoComponentsAccepted(id) => Some(id),
            A2uiError::InvalidMessage(_) => None,
        }
    }
}

pub type A2uiResult<T> = Result<T, A2uiError>;
