//! In-memory cosine index over encoded documents.

use ndarray::{Array1, Array2};
use tracing::{debug, warn};

use crate::error::IndexError;
use crate::{Result, TextEncoder};

/// Best match returned by [`VectorIndex::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Row of the document in build order.
    pub position: usize,
    /// Document key (e.g. a procedure code).
    pub key: String,
    /// Document text the row was encoded from.
    pub text: String,
    /// Cosine similarity clamped to [0, 1].
    pub score: f32,
}

/// Nearest-neighbour index with one L2-normalized row per document.
///
/// The index is immutable once built and can be shared across threads.
pub struct VectorIndex {
    encoder: Box<dyn TextEncoder>,
    keys: Vec<String>,
    texts: Vec<String>,
    matrix: Array2<f32>,
}

impl VectorIndex {
    /// Encode every `(key, text)` pair and build the index.
    ///
    /// Documents without usable features get a zero row and can never win a
    /// search against a document that has features.
    pub fn build<E, I, K, T>(encoder: E, docs: I) -> Result<Self>
    where
        E: TextEncoder + 'static,
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<String>,
    {
        let (keys, texts): (Vec<String>, Vec<String>) = docs
            .into_iter()
            .map(|(k, t)| (k.into(), t.into()))
            .unzip();

        let dims = encoder.dimensions();
        let mut matrix = Array2::<f32>::zeros((keys.len(), dims));

        for (row, text) in texts.iter().enumerate() {
            match encoder.encode(text) {
                Ok(vector) => {
                    check_dims(dims, &vector)?;
                    matrix.row_mut(row).assign(&vector);
                }
                Err(IndexError::EmptyEncoding(_)) => {
                    warn!("Document {} ({:?}) has no features", keys[row], text);
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Built vector index with {} rows x {} dims", keys.len(), dims);

        Ok(Self {
            encoder: Box::new(encoder),
            keys,
            texts,
            matrix,
        })
    }

    /// Return the single closest document to `query`.
    ///
    /// Ties resolve to the lowest position. A query without features scores
    /// 0.0 against the first document.
    pub fn search(&self, query: &str) -> Result<Neighbor> {
        if self.keys.is_empty() {
            return Err(IndexError::EmptyIndex);
        }

        let (position, score) = match self.encoder.encode(query) {
            Ok(q) => {
                check_dims(self.matrix.ncols(), &q)?;
                let scores = self.matrix.dot(&q);
                let mut best = (0usize, f32::NEG_INFINITY);
                for (i, &s) in scores.iter().enumerate() {
                    if s > best.1 {
                        best = (i, s);
                    }
                }
                best
            }
            Err(IndexError::EmptyEncoding(_)) => {
                debug!("Query {:?} has no features", query);
                (0, 0.0)
            }
            Err(e) => return Err(e),
        };

        Ok(Neighbor {
            position,
            key: self.keys[position].clone(),
            text: self.texts[position].clone(),
            score: score.clamp(0.0, 1.0),
        })
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Vector length used by the index.
    pub fn dimensions(&self) -> usize {
        self.matrix.ncols()
    }
}

fn check_dims(expected: usize, vector: &Array1<f32>) -> Result<()> {
    if vector.len() != expected {
        return Err(IndexError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}
