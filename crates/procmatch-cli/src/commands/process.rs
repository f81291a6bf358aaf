//! Process command - match procedure codes in a single OCR text file.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use procmatch_core::{MatchResult, MatchStage, ProcedureMatcher, TraceEntry};

use super::{MatcherArgs, build_matcher, load_config};
use crate::joblog::JobLog;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input OCR text file ("-" reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    matcher: MatcherArgs,

    /// Write a JSON job log into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the decision trace after the codes (text format)
    #[arg(long)]
    show_trace: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (codes and decision trace)
    Json,
    /// CSV output, one row per matched code
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path, &args.matcher)?;
    let filename = display_name(&args.input);
    let text = read_input(&args.input)?;

    info!("Processing {} ({} chars)", filename, text.chars().count());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Loading catalog...");

    let matcher = build_matcher(&config)?;

    pb.set_message("Matching...");
    let outcome = matcher.match_codes_from_text(&text);
    pb.finish_and_clear();

    let result = match outcome {
        Ok(result) => {
            if let Some(dir) = &args.log_dir {
                JobLog::success(&filename, &text, &result).save(dir)?;
            }
            result
        }
        Err(e) => {
            if let Some(dir) = &args.log_dir {
                if let Err(log_err) = JobLog::failure(&filename, Some(&text), &e).save(dir) {
                    warn!("Could not write job log: {}", log_err);
                }
            }
            return Err(e.into());
        }
    };

    let output = format_result(&result, &matcher, args.format, args.show_trace)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read the input text. OCR output is not always valid UTF-8, so invalid
/// bytes are replaced rather than rejected.
pub(crate) fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let bytes = fs::read(input)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub(crate) fn display_name(input: &Path) -> String {
    if input.as_os_str() == "-" {
        return "<stdin>".to_string();
    }
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

pub(crate) fn format_result(
    result: &MatchResult,
    matcher: &ProcedureMatcher,
    format: OutputFormat,
    show_trace: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result, matcher),
        OutputFormat::Text => Ok(format_text(result, matcher, show_trace)),
    }
}

fn format_csv(result: &MatchResult, matcher: &ProcedureMatcher) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["code", "description", "stage", "score", "line"])?;

    for code in &result.codes {
        let description = matcher.catalog().description(code).unwrap_or_default();
        // First accepted decision is the one that put the code in the result
        let first = result.accepted_candidates().find(|c| &c.code == code);
        let (stage, score, line) = match first {
            Some(c) => (c.stage.as_str(), format!("{:.4}", c.score), c.line.as_str()),
            None => ("", String::new(), ""),
        };
        wtr.write_record([code.as_str(), description, stage, score.as_str(), line])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &MatchResult, matcher: &ProcedureMatcher, show_trace: bool) -> String {
    let mut output = String::new();

    output.push_str("═══════════════════════════════════════════════════════════\n");
    output.push_str(&format!("PROCEDURE CODES ({})\n", result.codes.len()));
    output.push_str("═══════════════════════════════════════════════════════════\n");

    if result.codes.is_empty() {
        output.push_str("  (none)\n");
    }
    for code in &result.codes {
        let description = matcher.catalog().description(code).unwrap_or("?");
        let stage = result
            .accepted_candidates()
            .find(|c| &c.code == code)
            .map(|c| c.stage.as_str())
            .unwrap_or(MatchStage::Regex.as_str());
        output.push_str(&format!("  {:<12} {:<10} {}\n", code, stage, description));
    }

    if show_trace {
        output.push_str("\n───────────────────────────────────────────────────────────\n");
        output.push_str("DECISION TRACE\n");
        output.push_str("───────────────────────────────────────────────────────────\n");
        output.push_str(&format_trace(result));
    }

    output
}

fn format_trace(result: &MatchResult) -> String {
    let mut output = String::new();
    for entry in &result.trace {
        match entry {
            TraceEntry::RegexPass { found, explanation } => {
                output.push_str(&format!("[regex] {}: {}\n", explanation, found.join(", ")));
            }
            TraceEntry::LineNormalization { result, explanation } => {
                output.push_str(&format!("[lines] {} ({} lines)\n", explanation, result.len()));
                for line in result {
                    output.push_str(&format!("        | {}\n", line));
                }
            }
            TraceEntry::Candidate(c) => {
                let mark = if c.accepted { "✓" } else { "✗" };
                output.push_str(&format!(
                    "{} [{}] {:?} -> {} ({:.3}): {}\n",
                    mark, c.stage, c.line, c.code, c.score, c.reason
                ));
            }
        }
    }
    output
}
