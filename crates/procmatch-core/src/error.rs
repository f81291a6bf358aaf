//! Error types for the procmatch-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the procmatch library.
#[derive(Error, Debug)]
pub enum ProcmatchError {
    /// The procedure catalog could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogLoadError),

    /// The similarity provider failed while matching.
    #[error("similarity provider error: {0}")]
    Similarity(#[from] SimilarityProviderError),

    /// Error from the vector index layer.
    #[error("index error: {0}")]
    Index(#[from] procmatch_index::IndexError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to loading the procedure catalog.
#[derive(Error, Debug)]
pub enum CatalogLoadError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No encoding/delimiter combination produced a single entry.
    #[error("no procedure parsed from {source_name} after {attempts} attempts; last error: {last_error}")]
    NoEntries {
        source_name: String,
        attempts: usize,
        last_error: String,
    },
}

/// Errors raised by a similarity provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimilarityProviderError {
    /// The provider could not answer (backend missing, index empty, ...).
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with something the matcher cannot trust.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl From<procmatch_index::IndexError> for SimilarityProviderError {
    fn from(err: procmatch_index::IndexError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Result type for the procmatch library.
pub type Result<T> = std::result::Result<T, ProcmatchError>;
