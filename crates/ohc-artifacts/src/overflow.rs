//! File-backed overflow sink.
//!
//! Output format (one run, whole file replaced):
//! ```text
//! # ohc overflow: 73 pending record(s) not submitted; generated_at_utc=2026-01-01T00:00:00Z
//! <record 1>
//! <record 2>
//! ...
//! ```
//! The header starts with the comment marker, so the file re-ingests as an
//! input source yielding exactly the deferred records.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use ohc_execution::{OverflowSink, SinkError, SinkReceipt};
use ohc_reconcile::{PendingSet, DEFAULT_COMMENT_MARKER};
use tracing::info;

#[derive(Debug, Clone)]
pub struct FileOverflowSink {
    path: PathBuf,
    comment_marker: String,
}

impl FileOverflowSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            comment_marker: DEFAULT_COMMENT_MARKER.to_string(),
        }
    }

    /// Header lines use `marker` so they are skipped when the file is read back.
    pub fn with_comment_marker(mut self, marker: &str) -> Self {
        self.comment_marker = marker.to_string();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, pending: &PendingSet) -> String {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut out = format!(
            "{} ohc overflow: {} pending record(s) not submitted; generated_at_utc={}\n",
            self.comment_marker,
            pending.len(),
            ts
        );
        for r in pending {
            out.push_str(r.as_str());
            out.push('\n');
        }
        out
    }

    /// Temp file in the target directory, then rename over the target.
    /// A failed write leaves any previous file untouched and no temp behind.
    fn write_atomic(&self, contents: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("create overflow dir failed: {}", dir.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("create overflow temp file failed: {}", dir.display()))?;
        tmp.write_all(contents.as_bytes())
            .context("write overflow temp file failed")?;
        tmp.as_file()
            .sync_all()
            .context("sync overflow temp file failed")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("replace overflow file failed: {}", self.path.display()))?;
        Ok(())
    }
}

impl OverflowSink for FileOverflowSink {
    fn persist(&self, pending: &PendingSet) -> Result<SinkReceipt, SinkError> {
        self.write_atomic(&self.render(pending))
            .map_err(|e| SinkError::from(format!("{e:#}")))?;
        info!(
            path = %self.path.display(),
            count = pending.len(),
            "overflow records written"
        );
        Ok(SinkReceipt {
            location: self.path.display().to_string(),
            count: pending.len(),
        })
    }
}
