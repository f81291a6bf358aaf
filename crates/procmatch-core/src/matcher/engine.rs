//! Procedure matcher combining direct code extraction and per-line rules.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::rules::{CodeExtractor, MatchRules, contains_code};
use super::{Nearest, SimilarityProvider};
use crate::error::{Result, SimilarityProviderError};
use crate::models::catalog::Catalog;
use crate::models::config::MatchingConfig;
use crate::models::trace::{MatchCandidate, MatchResult, MatchStage, TraceRecorder};

/// Default minimum similarity for the threshold rule.
pub const DEFAULT_THRESHOLD: f64 = 0.88;

/// Matches OCR text against a procedure catalog.
///
/// Build one at start-up and share it (e.g. behind an `Arc`). Matching only
/// borrows `self`, so concurrent calls are safe; every call owns its trace.
pub struct ProcedureMatcher {
    catalog: Arc<Catalog>,
    provider: Arc<dyn SimilarityProvider>,
    rules: MatchRules,
    threshold: f64,
    extractor: CodeExtractor,
}

impl ProcedureMatcher {
    /// Create a matcher with the default rules and threshold.
    pub fn new(catalog: Arc<Catalog>, provider: Arc<dyn SimilarityProvider>) -> Self {
        Self {
            catalog,
            provider,
            rules: MatchRules::default(),
            threshold: DEFAULT_THRESHOLD,
            extractor: CodeExtractor::new(),
        }
    }

    /// Create a matcher configured from `config`.
    pub fn from_config(
        catalog: Arc<Catalog>,
        provider: Arc<dyn SimilarityProvider>,
        config: &MatchingConfig,
    ) -> Self {
        Self::new(catalog, provider)
            .with_rules(MatchRules::from_config(config))
            .with_threshold(config.threshold)
    }

    /// Set the matching vocabulary.
    pub fn with_rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the similarity threshold (inclusive).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Match `text` and explain every decision.
    ///
    /// Numeric codes are taken from the raw text first; the remaining
    /// logical lines go through the contains rule and then the threshold
    /// rule. A provider failure aborts the whole call.
    pub fn match_codes_from_text(&self, text: &str) -> Result<MatchResult> {
        let start = Instant::now();
        let mut trace = TraceRecorder::new();
        let mut codes = BTreeSet::new();

        self.extract_direct(text, &mut codes, &mut trace);

        let lines = self.rules.normalizer.normalize_text(text);
        trace.line_normalization(lines.clone());

        let mut evaluated = 0usize;
        for line in &lines {
            if contains_code(line) {
                debug!("Skipping {:?}: holds a numeric code", line);
                continue;
            }

            let candidate = self.evaluate_line(line)?;
            debug!(
                "{:?} -> {} ({}, score {:.4}, accepted {})",
                line, candidate.code, candidate.stage, candidate.score, candidate.accepted
            );
            if candidate.accepted {
                codes.insert(candidate.code.clone());
            }
            trace.candidate(candidate);
            evaluated += 1;
        }

        info!(
            "Matched {} codes from {} logical lines ({} evaluated) in {:?}",
            codes.len(),
            lines.len(),
            evaluated,
            start.elapsed()
        );

        Ok(trace.finish(codes))
    }

    fn extract_direct(&self, text: &str, codes: &mut BTreeSet<String>, trace: &mut TraceRecorder) {
        let hits = self.extractor.extract_all(text);
        if hits.is_empty() {
            return;
        }

        trace.regex_pass(hits.iter().map(|h| h.code.clone()).collect());

        let mut seen = HashSet::new();
        for hit in hits {
            if !seen.insert(hit.code.clone()) {
                continue;
            }

            let candidate = match self.catalog.description(&hit.code) {
                Some(description) => MatchCandidate {
                    line: hit.line,
                    description: description.to_string(),
                    score: 1.0,
                    stage: MatchStage::Regex,
                    accepted: true,
                    reason: "Accepted: numeric code is a catalog key".to_string(),
                    code: hit.code,
                },
                None => MatchCandidate {
                    line: hit.line,
                    description: String::new(),
                    score: 0.0,
                    stage: MatchStage::Regex,
                    accepted: false,
                    reason: "Rejected: numeric code is not in the catalog".to_string(),
                    code: hit.code,
                },
            };

            if candidate.accepted {
                codes.insert(candidate.code.clone());
            }
            trace.candidate(candidate);
        }
    }

    fn evaluate_line(&self, line: &str) -> std::result::Result<MatchCandidate, SimilarityProviderError> {
        if self.catalog.is_empty() {
            return Ok(MatchCandidate {
                line: line.to_string(),
                code: String::new(),
                description: String::new(),
                score: 0.0,
                stage: MatchStage::Embedding,
                accepted: false,
                reason: "Rejected: catalog is empty".to_string(),
            });
        }

        let nearest = self.provider.nearest(line)?;
        self.check_nearest(line, &nearest)?;

        if self.rules.contains.fires(line, &nearest.description) {
            return Ok(MatchCandidate {
                line: line.to_string(),
                code: nearest.code,
                description: nearest.description,
                score: nearest.score,
                stage: MatchStage::Contains,
                accepted: true,
                reason: "Accepted: the significant term appears in the description".to_string(),
            });
        }

        let accepted = nearest.score >= self.threshold;
        let reason = if accepted {
            format!(
                "Accepted by similarity: {:.4} >= threshold {}",
                nearest.score, self.threshold
            )
        } else {
            format!(
                "Rejected: similarity {:.4} below threshold {}",
                nearest.score, self.threshold
            )
        };

        Ok(MatchCandidate {
            line: line.to_string(),
            code: nearest.code,
            description: nearest.description,
            score: nearest.score,
            stage: MatchStage::Embedding,
            accepted,
            reason,
        })
    }

    fn check_nearest(&self, line: &str, nearest: &Nearest) -> std::result::Result<(), SimilarityProviderError> {
        if !self.catalog.contains_code(&nearest.code) {
            return Err(SimilarityProviderError::Malformed(format!(
                "code {:?} returned for {:?} is not in the catalog",
                nearest.code, line
            )));
        }
        if nearest.score.is_nan() {
            return Err(SimilarityProviderError::Malformed(format!(
                "score for {:?} is NaN",
                line
            )));
        }
        Ok(())
    }
}
