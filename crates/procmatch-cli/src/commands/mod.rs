//! Subcommands and the setup they share.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::debug;

use procmatch_core::models::config::ProcmatchConfig;
use procmatch_core::{ProcedureMatcher, build_catalog_index, load_catalog};

/// Options that override the catalog and threshold settings.
#[derive(Args, Clone, Debug, Default)]
pub struct MatcherArgs {
    /// Procedure catalog file (overrides config and PROCEDURES_CSV)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Similarity threshold (overrides config and MATCHER_THRESHOLD)
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Resolve the effective configuration.
///
/// Precedence, lowest first: defaults, config file (`--config` or the user
/// config file), environment, command-line flags.
pub fn load_config(config_path: Option<&str>, overrides: &MatcherArgs) -> anyhow::Result<ProcmatchConfig> {
    let mut config = match config_path {
        Some(path) => ProcmatchConfig::from_file(Path::new(path))
            .with_context(|| format!("failed to read config {}", path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config file {}", default_path.display());
                ProcmatchConfig::from_file(&default_path)
                    .with_context(|| format!("failed to read config {}", default_path.display()))?
            } else {
                ProcmatchConfig::default()
            }
        }
    };

    config.apply_env_overrides()?;

    if let Some(catalog) = &overrides.catalog {
        config.catalog.path = catalog.clone();
    }
    if let Some(threshold) = overrides.threshold {
        config.matching.threshold = threshold;
    }

    config.validate()?;
    Ok(config)
}

/// Load the catalog, index it and build the matcher. Done once per process.
pub fn build_matcher(config: &ProcmatchConfig) -> anyhow::Result<ProcedureMatcher> {
    let catalog = load_catalog(&config.catalog.path, &config.catalog)
        .with_context(|| format!("failed to load catalog {}", config.catalog.path.display()))?;
    let catalog = Arc::new(catalog);
    let index = build_catalog_index(&catalog, &config.index)?;

    Ok(ProcedureMatcher::from_config(
        catalog,
        Arc::new(index),
        &config.matching,
    ))
}
