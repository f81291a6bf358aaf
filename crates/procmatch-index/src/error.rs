//! Error types for the index layer.

use thiserror::Error;

/// Errors that can occur while encoding text or searching the index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The index holds no documents.
    #[error("index is empty")]
    EmptyIndex,

    /// The text produced no features (no letters or digits).
    #[error("text produced an empty encoding: {0:?}")]
    EmptyEncoding(String),

    /// A vector does not have the dimension the index was built with.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Encoder or index configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
