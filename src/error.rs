//! Error types for chains and sets.

use thiserror::Error;

/// Failures reported by positional and value-based [`Chain`](crate::Chain) operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainError {
    /// `index` does not address an existing entry.
    #[error("index {index} out of range for chain of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// `position` is past the end of the chain (`position > len`).
    #[error("position {position} is not a valid insert position for chain of length {len}")]
    InvalidPosition { position: usize, len: usize },
    /// No entry holds the requested value.
    #[error("value not found in chain")]
    NotFound,
}

/// Failures reported by [`DynamicHashSet`](crate::DynamicHashSet) and its configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SetError {
    #[error("key is not in the set")]
    KeyNotFound,
    #[error("initial capacity must be greater than zero")]
    InvalidCapacity,
    #[error("load factor threshold {threshold} is not within (0, 1)")]
    InvalidLoadFactor { threshold: f64 },
}
