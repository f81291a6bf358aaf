//! Text encoder implementations.

pub mod hashing;

use ndarray::Array1;

use crate::Result;

/// Trait for text-to-vector encoders.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector, so that nearest-neighbour answers are reproducible.
pub trait TextEncoder: Send + Sync {
    /// Encode a text into an L2-normalized vector.
    ///
    /// # Returns
    /// A vector of length `dimensions()`, or `IndexError::EmptyEncoding`
    /// when the text carries no usable features.
    fn encode(&self, text: &str) -> Result<Array1<f32>>;

    /// Length of the vectors this encoder produces.
    fn dimensions(&self) -> usize;
}
