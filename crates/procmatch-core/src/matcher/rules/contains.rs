//! The contains rule: accept short, exact terms found inside a description.

use std::collections::HashSet;

/// Accepts a line when its significant text is a substring of the nearest
/// catalog description, regardless of the similarity score.
#[derive(Debug, Clone)]
pub struct ContainsRule {
    stopwords: HashSet<String>,
    single_words: HashSet<String>,
}

/// Minimum number of non-space characters for a line to be significant.
const MIN_CHARS: usize = 3;

impl ContainsRule {
    /// Create the rule. Both lists are compared lowercased.
    pub fn new<I, J, S, T>(stopwords: I, single_words: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            stopwords: lowercase_set(stopwords),
            single_words: lowercase_set(single_words),
        }
    }

    /// Check whether `line` fires the rule against `description`.
    pub fn fires(&self, line: &str, description: &str) -> bool {
        let term = line.trim().to_lowercase();
        self.is_significant(&term) && description.trim().to_lowercase().contains(&term)
    }

    /// Check the line-only conditions on an already lowercased, trimmed term.
    pub fn is_significant(&self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        if term.chars().filter(|c| *c != ' ').count() < MIN_CHARS {
            return false;
        }
        if !term.chars().any(char::is_alphabetic) {
            return false;
        }
        if self.stopwords.contains(term) {
            return false;
        }

        let single_word = term.split_whitespace().nth(1).is_none();
        !single_word || self.single_words.contains(term)
    }
}

impl Default for ContainsRule {
    fn default() -> Self {
        let config = crate::models::config::MatchingConfig::default();
        Self::new(&config.stopwords, &config.single_word_allowlist)
    }
}

fn lowercase_set<I, S>(items: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlisted_acronym_fires() {
        let rule = ContainsRule::default();
        assert!(rule.fires("Psa", "PSA total - antigeno prostatico especifico"));
        assert!(rule.fires(" PCR ", "Proteina C reativa (PCR) quantitativa"));
    }

    #[test]
    fn test_multi_word_line_fires() {
        let rule = ContainsRule::default();
        assert!(rule.fires("Ferro Serico", "Ferro serico - dosagem"));
    }

    #[test]
    fn test_not_a_substring() {
        let rule = ContainsRule::default();
        assert!(!rule.fires("Glicemia Jejum", "Glicose - pesquisa e/ou dosagem"));
    }

    #[test]
    fn test_stopword_never_fires() {
        let rule = ContainsRule::default();
        assert!(!rule.fires("resultados", "Resultados de exames anteriores"));
        assert!(!rule.fires("Observações", "observações gerais"));
    }

    #[test]
    fn test_single_word_outside_allowlist() {
        let rule = ContainsRule::default();
        assert!(!rule.fires("Calcio", "Calcio - pesquisa e/ou dosagem"));
    }

    #[test]
    fn test_too_short_or_no_letters() {
        let rule = ContainsRule::default();
        // "t4" is allow-listed but has only two characters
        assert!(!rule.fires("T4", "T4 livre"));
        assert!(!rule.fires("12 34", "dosagem 12 34"));
        assert!(!rule.fires("   ", "anything"));
    }
}
