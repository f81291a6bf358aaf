//! Direct extraction of bare procedure codes from raw OCR text.

use std::collections::BTreeSet;

use super::patterns::{LINE_BREAKS, PROCEDURE_CODE};
use crate::models::catalog::Catalog;

/// A numeric token found in the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeHit {
    /// The digits as written.
    pub code: String,
    /// Byte range of the token in the source text.
    pub position: (usize, usize),
    /// Trimmed physical line the token sits on.
    pub line: String,
}

/// Scans raw text for 6-10 digit tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeExtractor;

impl CodeExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Every numeric token in document order, repeats included.
    pub fn extract_all(&self, text: &str) -> Vec<CodeHit> {
        PROCEDURE_CODE
            .find_iter(text)
            .map(|m| CodeHit {
                code: m.as_str().to_string(),
                position: (m.start(), m.end()),
                line: enclosing_line(text, m.start(), m.end()).trim().to_string(),
            })
            .collect()
    }

    /// Tokens that are catalog keys.
    pub fn extract(&self, text: &str, catalog: &Catalog) -> BTreeSet<String> {
        self.extract_all(text)
            .into_iter()
            .filter(|hit| catalog.contains_code(&hit.code))
            .map(|hit| hit.code)
            .collect()
    }
}

/// Extract catalog codes written directly in `text`.
pub fn extract_codes(text: &str, catalog: &Catalog) -> BTreeSet<String> {
    CodeExtractor::new().extract(text, catalog)
}

/// Check whether a line holds a numeric code token.
pub fn contains_code(line: &str) -> bool {
    PROCEDURE_CODE.is_match(line)
}

fn enclosing_line(text: &str, start: usize, end: usize) -> &str {
    let line_start = text[..start]
        .rfind(LINE_BREAKS)
        .map(|i| i + text[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0);
    let line_end = text[end..]
        .find(LINE_BREAKS)
        .map(|i| end + i)
        .unwrap_or(text.len());
    &text[line_start..line_end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogEntry;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::new("40302750", "Hemograma com contagem de plaquetas"),
            CatalogEntry::new("40316521", "PSA total"),
        ])
    }

    #[test]
    fn test_extract_all_with_lines() {
        let text = "Pedido medico\nHemograma 40302750\r\nCRM:16744 ref 123456789";
        let hits = CodeExtractor::new().extract_all(text);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].code, "40302750");
        assert_eq!(hits[0].line, "Hemograma 40302750");
        assert_eq!(&text[hits[0].position.0..hits[0].position.1], "40302750");
        assert_eq!(hits[1].code, "123456789");
        assert_eq!(hits[1].line, "CRM:16744 ref 123456789");
    }

    #[test]
    fn test_extract_keeps_catalog_keys_only() {
        let text = "40302750 99999999 40302750";
        let codes = extract_codes(text, &catalog());

        assert_eq!(codes, BTreeSet::from(["40302750".to_string()]));
    }

    #[test]
    fn test_token_boundaries() {
        let extractor = CodeExtractor::new();
        // 5 and 11 digits are not codes; digits glued to letters are not either
        assert!(extractor.extract_all("12345 12345678901 A40302750").is_empty());
        assert_eq!(extractor.extract_all("(40302750)")[0].code, "40302750");
    }

    #[test]
    fn test_contains_code() {
        assert!(contains_code("Hemograma 40302750"));
        assert!(!contains_code("CRM:16744"));
    }
}
