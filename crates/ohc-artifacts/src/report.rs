use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ohc_execution::{RunOutcome, RunSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REPORT_SCHEMA_VERSION: i32 = 1;

/// Per-run record written to `<reports_root>/<run_id>/report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
    pub config_hash: String,
    pub sources: Vec<String>,
    pub local_total: usize,
    pub already_remote: usize,
    pub pending: usize,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_accepted: Option<bool>,
}

impl RunReport {
    pub fn from_summary(
        run_id: Uuid,
        config_hash: &str,
        sources: &[PathBuf],
        summary: &RunSummary,
    ) -> Self {
        let (overflow_path, submit_http_status) = match &summary.outcome {
            RunOutcome::Overflow { receipt, .. } => (Some(receipt.location.clone()), None),
            RunOutcome::Submitted { reply, .. } => (None, Some(reply.http_status)),
            _ => (None, None),
        };
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            run_id,
            created_at_utc: Utc::now(),
            config_hash: config_hash.to_string(),
            sources: sources.iter().map(|p| p.display().to_string()).collect(),
            local_total: summary.local_total,
            already_remote: summary.already_remote,
            pending: summary.pending,
            outcome: summary.outcome.as_str().to_string(),
            overflow_path,
            submit_http_status,
            submit_accepted: summary.outcome.submit_accepted(),
        }
    }
}

/// Write `report` under `<reports_root>/<run_id>/`. Returns the report path.
pub fn write_run_report(reports_root: &Path, report: &RunReport) -> Result<PathBuf> {
    let run_dir = reports_root.join(report.run_id.to_string());
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create report dir failed: {}", run_dir.display()))?;

    let path = run_dir.join("report.json");
    let json = serde_json::to_string_pretty(report).context("serialize run report failed")?;
    fs::write(&path, format!("{json}\n"))
        .with_context(|| format!("write run report failed: {}", path.display()))?;
    Ok(path)
}
