//! Error types for the events crate.

use alm_calendar::CalendarError;

/// Errors that can occur while loading or resolving world events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// One or more event definitions failed validation with errors.
    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// A definition source failed to produce definitions.
    #[error("event source error: {0}")]
    Source(String),

    /// A calendar definition was invalid or a date was out of range.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// A definition document failed to deserialize.
    #[error("definition parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience result type for event operations.
pub type EventResult<T> = Result<T, EventError>;
