//! Similarity search layer for procmatch.
//!
//! This crate turns short texts into dense vectors and answers
//! nearest-neighbour queries over a fixed set of documents:
//! - `TextEncoder` abstracts the text-to-vector step
//! - `HashingEncoder` is a deterministic, model-free encoder
//! - `VectorIndex` holds one row per document and scores by cosine similarity

mod encoder;
mod error;
mod vector;

pub use encoder::TextEncoder;
pub use encoder::hashing::{HashingEncoder, HashingEncoderConfig};
pub use error::IndexError;
pub use vector::{Neighbor, VectorIndex};

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
