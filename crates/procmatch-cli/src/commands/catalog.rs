//! Catalog inspection commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use procmatch_core::load_catalog;

use super::{MatcherArgs, build_matcher, load_config};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    command: CatalogCommand,

    /// Procedure catalog file (overrides config and PROCEDURES_CSV)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Print catalog statistics and the first entries
    Show {
        /// Number of entries to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Print the description of a code
    Lookup {
        /// Procedure code
        code: String,
    },

    /// Run the matcher on a piece of text and print every decision
    Query {
        /// Text to match (one or more lines)
        text: String,

        /// Similarity threshold to apply
        #[arg(long)]
        threshold: Option<f64>,
    },
}

pub async fn run(args: CatalogArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let overrides = MatcherArgs {
        catalog: args.catalog.clone(),
        threshold: match &args.command {
            CatalogCommand::Query { threshold, .. } => *threshold,
            _ => None,
        },
    };
    let config = load_config(config_path, &overrides)?;

    match args.command {
        CatalogCommand::Show { limit } => {
            let catalog = load_catalog(&config.catalog.path, &config.catalog)?;

            println!("{}", style("Procedure catalog").bold());
            println!("  Path:         {}", config.catalog.path.display());
            println!("  Entries:      {}", catalog.len());
            println!("  Unique codes: {}", catalog.unique_codes());
            println!();

            for entry in catalog.entries().iter().take(limit) {
                println!("  {:<12} {}", entry.code, entry.description);
            }
            if catalog.len() > limit {
                println!("  ... {} more", catalog.len() - limit);
            }
        }

        CatalogCommand::Lookup { code } => {
            let catalog = load_catalog(&config.catalog.path, &config.catalog)?;
            match catalog.description(code.trim()) {
                Some(description) => println!("{}\t{}", code.trim(), description),
                None => anyhow::bail!("Code not in catalog: {}", code.trim()),
            }
        }

        CatalogCommand::Query { text, .. } => {
            let matcher = build_matcher(&config)?;
            let result = matcher.match_codes_from_text(&text)?;

            println!(
                "{} threshold {:.2}, {} decision(s)",
                style("ℹ").blue(),
                matcher.threshold(),
                result.candidates().count()
            );
            for candidate in result.candidates() {
                let mark = if candidate.accepted {
                    style("✓").green()
                } else {
                    style("✗").red()
                };
                println!(
                    "{} [{}] {} {:.4} {}",
                    mark, candidate.stage, candidate.code, candidate.score, candidate.description
                );
                println!("    line:   {}", candidate.line);
                println!("    reason: {}", candidate.reason);
            }
            println!();
            println!("codes: {}", result.codes.join(" "));
        }
    }

    Ok(())
}
