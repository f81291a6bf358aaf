//! Rules applied while matching OCR text to catalog codes.

pub mod codes;
pub mod contains;
pub mod normalize;
pub mod patterns;

pub use codes::{CodeExtractor, CodeHit, contains_code, extract_codes};
pub use contains::ContainsRule;
pub use normalize::LineNormalizer;
pub use patterns::*;

use crate::models::config::MatchingConfig;

/// The configurable vocabulary of the matcher.
#[derive(Debug, Clone, Default)]
pub struct MatchRules {
    /// Joins lines broken by OCR.
    pub normalizer: LineNormalizer,
    /// Substring acceptance for short precise terms.
    pub contains: ContainsRule,
}

impl MatchRules {
    /// Build the rules from the word lists in `config`.
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self {
            normalizer: LineNormalizer::new(&config.continuation_words),
            contains: ContainsRule::new(&config.stopwords, &config.single_word_allowlist),
        }
    }
}
