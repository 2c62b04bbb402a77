//! Test doubles and fixtures for uploader scenario tests.
//!
//! No network I/O. Everything here records what the pipeline did so tests can
//! assert on call counts and payloads.

mod fake_service;
mod sinks;

pub use fake_service::{Call, FakeOhcService};
pub use sinks::{FailingSink, MemorySink};

use ohc_reconcile::{build_record_set, Canonicalizer, RecordSet};
use serde_json::{json, Value};

/// `n` distinct hash-looking lines: `WPA*02*<prefix>0000` ...
pub fn hash_lines(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("WPA*02*{prefix}{i:04}")).collect()
}

/// Record Set from in-memory sources using the default rule.
pub fn local_set<S: AsRef<str>>(sources: &[Vec<S>]) -> RecordSet {
    build_record_set(
        &Canonicalizer::default(),
        sources.iter().map(|s| s.iter().map(|l| l.as_ref())),
    )
}

/// Successful `list_tasks` body carrying `hashes`.
pub fn task_list_body<S: AsRef<str>>(hashes: &[S]) -> Value {
    let tasks: Vec<Value> = hashes
        .iter()
        .map(|h| json!({"hash": h.as_ref(), "status": "running"}))
        .collect();
    json!({"success": true, "tasks": tasks})
}
