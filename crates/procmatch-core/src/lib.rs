//! Core library for matching lab-order OCR text to procedure codes.
//!
//! This crate provides:
//! - Procedure catalog loading (encoding and delimiter detection)
//! - Direct extraction of numeric procedure codes
//! - OCR line-break normalization
//! - Rule-based matching (contains rule, similarity threshold)
//! - An ordered decision trace explaining every accept/reject

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod models;

pub use catalog::{CatalogLoader, load_catalog, parse_catalog};
pub use error::{CatalogLoadError, ProcmatchError, Result, SimilarityProviderError};
pub use matcher::{Nearest, ProcedureMatcher, SimilarityProvider, build_catalog_index};
pub use models::catalog::{Catalog, CatalogEntry};
pub use models::config::ProcmatchConfig;
pub use models::trace::{MatchCandidate, MatchResult, MatchStage, TraceEntry};

/// Re-export index types.
pub use procmatch_index::{HashingEncoder, IndexError, TextEncoder, VectorIndex};
