//! Error types for the condition crate.

/// Errors produced while parsing a condition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConditionError {
    /// The source failed to lex or parse.
    #[error("parse error at offset {offset}: {message}")]
    Parse {
        /// Byte offset of the problem in the source string.
        offset: usize,
        /// Human-readable description of the problem.
        message: String,
    },
}

/// Convenience result type for condition operations.
pub type ConditionResult<T> = Result<T, ConditionError>;
