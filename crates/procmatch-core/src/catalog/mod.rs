//! Procedure catalog loading.

mod loader;

pub use loader::{CatalogLoader, load_catalog, parse_catalog};
