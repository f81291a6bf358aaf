//! Similarity provider backed by the in-memory vector index.

use procmatch_index::{HashingEncoder, VectorIndex};
use tracing::info;

use super::{Nearest, SimilarityProvider};
use crate::error::{Result, SimilarityProviderError};
use crate::models::catalog::Catalog;
use crate::models::config::IndexConfig;

impl SimilarityProvider for VectorIndex {
    fn nearest(&self, query: &str) -> std::result::Result<Nearest, SimilarityProviderError> {
        let hit = self.search(query)?;
        Ok(Nearest {
            code: hit.key,
            description: hit.text,
            score: f64::from(hit.score),
        })
    }
}

/// Encode every catalog description into a vector index.
///
/// Meant to run once at start-up; the index is then shared read-only.
pub fn build_catalog_index(catalog: &Catalog, config: &IndexConfig) -> Result<VectorIndex> {
    let encoder = HashingEncoder::new(config.encoder_config())?;
    let index = VectorIndex::build(
        encoder,
        catalog
            .entries()
            .iter()
            .map(|e| (e.code.as_str(), e.description.as_str())),
    )?;

    info!(
        "Indexed {} catalog descriptions ({} dims)",
        index.len(),
        index.dimensions()
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogEntry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_answers_with_catalog_member() {
        let catalog = Catalog::new(vec![
            CatalogEntry::new("40302040", "Calcio - pesquisa e/ou dosagem"),
            CatalogEntry::new("40316521", "PSA total"),
        ]);
        let index = build_catalog_index(&catalog, &IndexConfig::default()).unwrap();

        let nearest = index.nearest("Psa total").unwrap();
        assert_eq!(nearest.code, "40316521");
        assert_eq!(nearest.description, "PSA total");
        assert!((nearest.score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_index_is_unavailable() {
        let index = build_catalog_index(&Catalog::default(), &IndexConfig::default()).unwrap();
        assert!(matches!(
            index.nearest("psa"),
            Err(SimilarityProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn test_bad_index_config() {
        let config = IndexConfig {
            dimensions: 0,
            ..Default::default()
        };
        assert!(build_catalog_index(&Catalog::default(), &config).is_err());
    }
}
