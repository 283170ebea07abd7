//! Error types for the calendar crate.

/// Errors that can occur when building or querying a calendar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// The calendar definition is structurally invalid.
    #[error("invalid calendar definition: {0}")]
    InvalidDefinition(String),

    /// A date component is out of range for the calendar.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Convenience result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
