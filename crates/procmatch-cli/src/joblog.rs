//! Per-job JSON logs.
//!
//! Every processed input can leave a `<job_id>.json` record in a log
//! directory: the text that was matched, the codes and the decision trace,
//! or the error that stopped the job.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use procmatch_core::{MatchResult, TraceEntry};

/// One job record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLog {
    pub job_id: String,
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_trace: Option<Vec<TraceEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl JobLog {
    /// Record of a job that produced a result.
    pub fn success(filename: impl Into<String>, ocr_text: &str, result: &MatchResult) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            filename: filename.into(),
            ocr_text: Some(ocr_text.to_string()),
            codes: Some(result.codes.clone()),
            decision_trace: Some(result.trace.clone()),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Record of a job that failed. The text is kept when it was read.
    pub fn failure(filename: impl Into<String>, ocr_text: Option<&str>, error: impl ToString) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            filename: filename.into(),
            ocr_text: ocr_text.map(str::to_string),
            codes: None,
            decision_trace: None,
            error: Some(error.to_string()),
            timestamp: Utc::now(),
        }
    }

    /// Write `<dir>/<job_id>.json`, creating `dir` if needed.
    pub fn save(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.job_id));
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        debug!("Job log written to {}", path.display());
        Ok(path)
    }
}
