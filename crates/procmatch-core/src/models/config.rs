//! Configuration structures for the matching pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use procmatch_index::HashingEncoderConfig;

use crate::error::{ProcmatchError, Result};

/// Environment variable overriding the catalog path.
pub const ENV_CATALOG_PATH: &str = "PROCEDURES_CSV";

/// Environment variable overriding the similarity threshold.
pub const ENV_THRESHOLD: &str = "MATCHER_THRESHOLD";

/// Main configuration for procmatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcmatchConfig {
    /// Catalog loading configuration.
    pub catalog: CatalogConfig,

    /// Matching rule configuration.
    pub matching: MatchingConfig,

    /// Similarity index configuration.
    pub index: IndexConfig,
}

/// Procedure catalog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the delimited catalog file.
    pub path: PathBuf,

    /// Encodings tried in order. `utf-8-sig` is UTF-8 with the BOM stripped;
    /// other labels are resolved by `encoding_rs`.
    pub encodings: Vec<String>,

    /// Accepted header names for the code column (case-insensitive).
    pub code_aliases: Vec<String>,

    /// Accepted header names for the description column (case-insensitive).
    pub description_aliases: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/procedimentos.csv"),
            encodings: strings(&["utf-8-sig", "utf-8", "latin-1"]),
            code_aliases: strings(&["codigo", "código", "cod", "code"]),
            description_aliases: strings(&["descricao", "descrição", "description", "desc"]),
        }
    }
}

/// Matching rule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity score accepted by the threshold rule (inclusive).
    pub threshold: f64,

    /// Generic terms that never fire the contains rule on their own.
    pub stopwords: Vec<String>,

    /// Single-word lines allowed to fire the contains rule.
    pub single_word_allowlist: Vec<String>,

    /// Leading words that mark a line as the continuation of the previous one.
    pub continuation_words: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.88,
            stopwords: strings(&[
                "outros",
                "diversos",
                "exames",
                "resultado",
                "resultados",
                "observacoes",
                "observação",
                "observações",
            ]),
            single_word_allowlist: strings(&["psa", "pcr", "tsh", "t4", "t3", "vitd"]),
            continuation_words: strings(&[
                "quantitativo",
                "qualitativo",
                "total",
                "livre",
                "digital",
                "ultra-sensivel",
                "alta sensibilidade",
                "basal",
                "seriado",
            ]),
        }
    }
}

/// Similarity index configuration for the built-in hashing encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Vector length.
    pub dimensions: usize,

    /// Character n-gram size.
    pub ngram: usize,

    /// Weight of whole-word features.
    pub word_weight: f32,

    /// Weight of character n-gram features.
    pub ngram_weight: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let encoder = HashingEncoderConfig::default();
        Self {
            dimensions: encoder.dimensions,
            ngram: encoder.ngram,
            word_weight: encoder.word_weight,
            ngram_weight: encoder.ngram_weight,
        }
    }
}

impl IndexConfig {
    pub fn encoder_config(&self) -> HashingEncoderConfig {
        HashingEncoderConfig {
            dimensions: self.dimensions,
            ngram: self.ngram,
            word_weight: self.word_weight,
            ngram_weight: self.ngram_weight,
        }
    }
}

impl ProcmatchConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply `PROCEDURES_CSV` and `MATCHER_THRESHOLD` from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup` (same keys as the environment).
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_CATALOG_PATH).filter(|p| !p.trim().is_empty()) {
            self.catalog.path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup(ENV_THRESHOLD) {
            self.matching.threshold = raw.trim().parse().map_err(|_| {
                ProcmatchError::Config(format!("{} is not a number: {:?}", ENV_THRESHOLD, raw))
            })?;
        }

        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.matching.threshold.is_finite() {
            return Err(ProcmatchError::Config(format!(
                "matching.threshold must be finite, got {}",
                self.matching.threshold
            )));
        }
        if self.catalog.encodings.is_empty() {
            return Err(ProcmatchError::Config("catalog.encodings is empty".into()));
        }
        if self.catalog.code_aliases.is_empty() || self.catalog.description_aliases.is_empty() {
            return Err(ProcmatchError::Config(
                "catalog code and description aliases must not be empty".into(),
            ));
        }
        if self.index.dimensions == 0 || self.index.ngram == 0 {
            return Err(ProcmatchError::Config(
                "index.dimensions and index.ngram must be > 0".into(),
            ));
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
