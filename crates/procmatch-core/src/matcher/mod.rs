//! Matching of OCR text to procedure codes.

mod engine;
mod provider;
pub mod rules;

pub use engine::{DEFAULT_THRESHOLD, ProcedureMatcher};
pub use provider::build_catalog_index;

use serde::{Deserialize, Serialize};

use crate::error::SimilarityProviderError;

/// Nearest catalog entry for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nearest {
    pub code: String,
    pub description: String,
    /// Similarity in [0, 1]; 1.0 means identical meaning.
    pub score: f64,
}

/// Trait for semantic similarity lookups over the catalog.
///
/// Implementations must answer with exactly one catalog member per call and
/// be deterministic for the same query and catalog state.
pub trait SimilarityProvider: Send + Sync {
    /// Return the single closest catalog entry to `query`.
    fn nearest(&self, query: &str) -> Result<Nearest, SimilarityProviderError>;
}
