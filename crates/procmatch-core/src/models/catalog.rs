//! Procedure catalog data model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One procedure in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog-unique procedure code (numeric string).
    pub code: String,

    /// Free-text description, original casing preserved.
    pub description: String,
}

impl CatalogEntry {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// The loaded procedure catalog.
///
/// Entries keep file order. When a code repeats, every row stays in
/// `entries` and the lookup keeps the last description seen.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_code: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from entries in their original order.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let by_code = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.code.clone(), i))
            .collect();

        Self { entries, by_code }
    }

    /// All entries, in load order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Description for a code, if the code is in the catalog.
    pub fn description(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(code)
            .map(|&i| self.entries[i].description.as_str())
    }

    /// Check whether a code is a catalog key.
    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Number of rows loaded (duplicates included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct codes.
    pub fn unique_codes(&self) -> usize {
        self.by_code.len()
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_keeps_last_duplicate() {
        let catalog: Catalog = vec![
            CatalogEntry::new("40302040", "Calcio"),
            CatalogEntry::new("40301630", "Glicose"),
            CatalogEntry::new("40302040", "Calcio ionico"),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.unique_codes(), 2);
        assert_eq!(catalog.description("40302040"), Some("Calcio ionico"));
        assert!(catalog.contains_code("40301630"));
        assert!(!catalog.contains_code("99999999"));
    }
}
