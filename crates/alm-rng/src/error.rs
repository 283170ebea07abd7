//! Error types for the RNG crate.

/// Errors that can occur during RNG operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RngError {
    /// A choice was requested from an empty collection.
    #[error("cannot choose from an empty collection")]
    EmptyCollection,

    /// The item and weight slices passed to a weighted choice differ in length.
    #[error("weighted choice length mismatch: {items} items, {weights} weights")]
    WeightMismatch {
        /// Number of items supplied.
        items: usize,
        /// Number of weights supplied.
        weights: usize,
    },

    /// A weight was negative or non-finite.
    #[error("invalid weight: {0}")]
    InvalidWeight(f64),

    /// All weights were zero, leaving nothing to choose.
    #[error("total weight is zero")]
    ZeroTotalWeight,
}

/// Convenience result type for RNG operations.
pub type RngResult<T> = Result<T, RngError>;
