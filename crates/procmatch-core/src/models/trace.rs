//! Decision trace: the ordered audit log of one matching run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stage that produced a match decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// Bare numeric code found in the raw text.
    Regex,
    /// Line text contained in the nearest description.
    Contains,
    /// Similarity score compared against the threshold.
    Embedding,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Regex => "regex",
            MatchStage::Contains => "contains",
            MatchStage::Embedding => "embedding",
        }
    }
}

impl std::fmt::Display for MatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accept/reject decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Text the decision was made on (logical line, or source line of a regex hit).
    pub line: String,

    /// Candidate procedure code. Empty when there was nothing to compare against.
    pub code: String,

    /// Catalog description of the candidate.
    pub description: String,

    /// Similarity score (1.0 for catalog regex hits, 0.0 for unknown ones).
    pub score: f64,

    pub stage: MatchStage,

    pub accepted: bool,

    /// Human-readable explanation of the decision.
    pub reason: String,
}

/// An entry of the decision trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEntry {
    /// Summary of the numeric-code scan over the raw text.
    RegexPass {
        /// Every numeric token found, in document order, repeats included.
        found: Vec<String>,
        explanation: String,
    },

    /// Logical lines produced by the line normalizer.
    LineNormalization {
        result: Vec<String>,
        explanation: String,
    },

    /// A single decision.
    Candidate(MatchCandidate),
}

impl TraceEntry {
    /// The candidate carried by this entry, if any.
    pub fn as_candidate(&self) -> Option<&MatchCandidate> {
        match self {
            TraceEntry::Candidate(c) => Some(c),
            _ => None,
        }
    }
}

/// Outcome of one matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Matched codes, sorted ascending, no duplicates.
    pub codes: Vec<String>,

    /// Decision trace in processing order.
    pub trace: Vec<TraceEntry>,
}

impl MatchResult {
    /// Iterate over accepted candidates.
    pub fn accepted_candidates(&self) -> impl Iterator<Item = &MatchCandidate> {
        self.candidates().filter(|c| c.accepted)
    }

    /// Iterate over all candidates.
    pub fn candidates(&self) -> impl Iterator<Item = &MatchCandidate> {
        self.trace.iter().filter_map(TraceEntry::as_candidate)
    }

    /// Check that `code` has at least one accepted candidate in the trace.
    pub fn explains(&self, code: &str) -> bool {
        self.accepted_candidates().any(|c| c.code == code)
    }

    /// Codes in `codes` that the trace does not explain. Empty for any
    /// result produced by the matcher.
    pub fn unexplained_codes(&self) -> Vec<&str> {
        self.codes
            .iter()
            .filter(|code| !self.explains(code))
            .map(String::as_str)
            .collect()
    }
}

/// Append-only recorder owned by a single matching run.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    entries: Vec<TraceEntry>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regex_pass(&mut self, found: Vec<String>) {
        self.entries.push(TraceEntry::RegexPass {
            found,
            explanation: "Numeric codes found directly in the text".to_string(),
        });
    }

    pub fn line_normalization(&mut self, result: Vec<String>) {
        self.entries.push(TraceEntry::LineNormalization {
            result,
            explanation: "Lines joined where OCR broke a single item".to_string(),
        });
    }

    pub fn candidate(&mut self, candidate: MatchCandidate) {
        self.entries.push(TraceEntry::Candidate(candidate));
    }

    /// Number of entries recorded so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Close the run and pair the trace with its codes.
    pub fn finish(self, codes: BTreeSet<String>) -> MatchResult {
        MatchResult {
            codes: codes.into_iter().collect(),
            trace: self.entries,
        }
    }
}
