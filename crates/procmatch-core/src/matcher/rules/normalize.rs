//! Merging of OCR line breaks that split one item across lines.

use super::patterns::physical_lines;

/// Joins physical lines into logical lines.
///
/// A line continues the previous logical line when it opens with `(`, `-`
/// or `–`, starts with a lowercase letter, or starts with one of the
/// continuation words (e.g. "quantitativo", "livre").
#[derive(Debug, Clone)]
pub struct LineNormalizer {
    continuation_words: Vec<String>,
}

impl LineNormalizer {
    /// Create a normalizer. Words are compared lowercased.
    pub fn new<I, S>(continuation_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            continuation_words: continuation_words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Normalize a sequence of physical lines.
    pub fn normalize<'a, I>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut logical: Vec<String> = Vec::new();

        for line in lines.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
            match logical.last_mut() {
                Some(previous) if self.is_continuation(line) => {
                    previous.push(' ');
                    previous.push_str(line);
                }
                _ => logical.push(line.to_string()),
            }
        }

        logical
    }

    /// Split raw text into physical lines and normalize them.
    pub fn normalize_text(&self, text: &str) -> Vec<String> {
        self.normalize(physical_lines(text))
    }

    fn is_continuation(&self, line: &str) -> bool {
        if line.starts_with(['(', '-', '–']) {
            return true;
        }
        if line.chars().next().is_some_and(char::is_lowercase) {
            return true;
        }

        let lower = line.to_lowercase();
        self.continuation_words
            .iter()
            .any(|word| lower.starts_with(word.as_str()))
    }
}

impl Default for LineNormalizer {
    fn default() -> Self {
        let config = crate::models::config::MatchingConfig::default();
        Self::new(&config.continuation_words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merges_parenthesized_qualifier() {
        let lines = LineNormalizer::default().normalize(["Exame de sangue", "(quantitativo)"]);
        assert_eq!(lines, vec!["Exame de sangue (quantitativo)"]);
    }

    #[test]
    fn test_merges_continuation_word_and_lowercase() {
        let text = "Pcr (proteina C Reativa)\nQuantitativo\nT4\n  livre  \nCalcio";
        let lines = LineNormalizer::default().normalize_text(text);
        assert_eq!(
            lines,
            vec!["Pcr (proteina C Reativa) Quantitativo", "T4 livre", "Calcio"]
        );
    }

    #[test]
    fn test_dashes_continue() {
        let lines = LineNormalizer::default().normalize(["Glicemia", "- jejum", "– 2h"]);
        assert_eq!(lines, vec!["Glicemia - jejum – 2h"]);
    }

    #[test]
    fn test_drops_blank_lines_and_keeps_order() {
        let text = "\n  \nGlicemia Jejum\r\n\r\nFerro Sérico\n\nPsa\n";
        let lines = LineNormalizer::default().normalize_text(text);
        assert_eq!(lines, vec!["Glicemia Jejum", "Ferro Sérico", "Psa"]);
    }

    #[test]
    fn test_first_line_never_continues() {
        let lines = LineNormalizer::default().normalize(["(quantitativo)", "Calcio"]);
        assert_eq!(lines, vec!["(quantitativo)", "Calcio"]);
    }

    #[test]
    fn test_custom_vocabulary() {
        let normalizer = LineNormalizer::new(["Free"]);
        let lines = normalizer.normalize(["T4", "FREE", "Total"]);
        assert_eq!(lines, vec!["T4 FREE", "Total"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(LineNormalizer::default().normalize_text("").is_empty());
    }
}
