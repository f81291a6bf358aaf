//! Feature-hashing encoder over word tokens and character n-grams.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use ndarray::Array1;
use tracing::trace;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::IndexError;
use crate::{Result, TextEncoder};

/// Settings for [`HashingEncoder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashingEncoderConfig {
    /// Number of hash buckets (vector length).
    pub dimensions: usize,
    /// Character n-gram size taken inside each padded word.
    pub ngram: usize,
    /// Weight added for each whole-word feature.
    pub word_weight: f32,
    /// Weight added for each character n-gram feature.
    pub ngram_weight: f32,
}

impl Default for HashingEncoderConfig {
    fn default() -> Self {
        Self {
            dimensions: 512,
            ngram: 3,
            word_weight: 1.0,
            ngram_weight: 0.5,
        }
    }
}

/// Deterministic encoder that hashes words and character n-grams into a
/// fixed number of buckets.
///
/// Text is folded first (NFKD, combining marks removed, lowercased) so that
/// OCR output with or without accents lands on the same features.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    config: HashingEncoderConfig,
}

impl HashingEncoder {
    /// Create an encoder, rejecting unusable settings.
    pub fn new(config: HashingEncoderConfig) -> Result<Self> {
        if config.dimensions == 0 {
            return Err(IndexError::InvalidConfig("dimensions must be > 0".into()));
        }
        if config.ngram == 0 {
            return Err(IndexError::InvalidConfig("ngram must be > 0".into()));
        }
        let weights_ok = config.word_weight.is_finite()
            && config.ngram_weight.is_finite()
            && config.word_weight >= 0.0
            && config.ngram_weight >= 0.0
            && config.word_weight + config.ngram_weight > 0.0;
        if !weights_ok {
            return Err(IndexError::InvalidConfig(format!(
                "weights must be non-negative and not both zero (word={}, ngram={})",
                config.word_weight, config.ngram_weight
            )));
        }

        Ok(Self { config })
    }

    /// Encoder settings.
    pub fn config(&self) -> &HashingEncoderConfig {
        &self.config
    }

    /// Fold text to the form features are taken from.
    pub fn fold(text: &str) -> String {
        text.nfkd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect()
    }

    fn bucket(&self, kind: u8, feature: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        hasher.write_u8(kind);
        feature.hash(&mut hasher);
        (hasher.finish() % self.config.dimensions as u64) as usize
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self {
            config: HashingEncoderConfig::default(),
        }
    }
}

impl TextEncoder for HashingEncoder {
    fn encode(&self, text: &str) -> Result<Array1<f32>> {
        let folded = Self::fold(text);
        let mut vector = Array1::<f32>::zeros(self.config.dimensions);
        let mut words = 0usize;

        for word in folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            words += 1;
            vector[self.bucket(b'w', word)] += self.config.word_weight;

            let padded: Vec<char> = std::iter::once('#')
                .chain(word.chars())
                .chain(std::iter::once('#'))
                .collect();
            for window in padded.windows(self.config.ngram) {
                let gram: String = window.iter().collect();
                vector[self.bucket(b'g', &gram)] += self.config.ngram_weight;
            }
        }

        let norm = vector.dot(&vector).sqrt();
        if words == 0 || norm == 0.0 {
            return Err(IndexError::EmptyEncoding(text.to_string()));
        }
        vector.mapv_inplace(|v| v / norm);

        trace!("Encoded {} words from {:?}", words, text);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}
