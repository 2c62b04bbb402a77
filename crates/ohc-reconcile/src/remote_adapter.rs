//! Remote adapter: interpret the service's `list_tasks` reply as a
//! [`RemoteRecordSet`].
//!
//! # Purpose
//! The transport hands back an HTTP status and a JSON body. This module owns
//! the meaning of that reply: whether it counts as accepted, what the failure
//! message is, and which task hashes become remote records.
//!
//! # Design constraints
//! - Pure, deterministic conversion. No IO, no network calls.
//! - Fail-closed: a rejected or malformed reply is an error, never an empty
//!   account. Only an accepted reply with no tasks yields an empty set.
//! - Task hashes go through the same [`Canonicalizer`] as local lines.
//! - Unknown fields are ignored so service additions don't break decoding.

use serde::Deserialize;
use serde_json::Value;

use crate::{Canonicalizer, RemoteRecordSet};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteReadError {
    /// HTTP status >= 400 or `success` not `true`.
    Rejected { http_status: u16, message: String },
    /// Accepted reply whose `tasks` payload could not be decoded.
    Malformed { http_status: u16, detail: String },
}

impl std::fmt::Display for RemoteReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected {
                http_status,
                message,
            } => write!(f, "list_tasks failed (HTTP {http_status}): {message}"),
            Self::Malformed {
                http_status,
                detail,
            } => write!(
                f,
                "list_tasks reply (HTTP {http_status}) has malformed tasks: {detail}"
            ),
        }
    }
}

impl std::error::Error for RemoteReadError {}

// ---------------------------------------------------------------------------
// Raw wire-level structs
// ---------------------------------------------------------------------------

/// One task entry. Only `hash` matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub hash: Option<String>,
}

/// `list_tasks` reply body.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTaskList {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Null or missing on an empty account.
    #[serde(default)]
    pub tasks: Option<Vec<RawTask>>,
}

// ---------------------------------------------------------------------------
// Reply helpers (shared with the write action)
// ---------------------------------------------------------------------------

/// A reply is accepted iff HTTP status < 400 and `success` is literally `true`.
pub fn is_accepted(http_status: u16, body: &Value) -> bool {
    http_status < 400 && body.get("success").and_then(Value::as_bool) == Some(true)
}

/// Best human-readable failure text: `message`, else `text`, else a fallback.
pub fn failure_message(body: &Value) -> String {
    ["message", "text"]
        .iter()
        .filter_map(|k| body.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("Unknown error")
        .to_string()
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Interpret a `list_tasks` reply.
///
/// # Errors
/// [`RemoteReadError::Rejected`] when the reply is not accepted;
/// [`RemoteReadError::Malformed`] when it is accepted but undecodable.
pub fn interpret_task_list(
    http_status: u16,
    body: &Value,
    canon: &Canonicalizer,
) -> Result<RemoteRecordSet, RemoteReadError> {
    if !is_accepted(http_status, body) {
        return Err(RemoteReadError::Rejected {
            http_status,
            message: failure_message(body),
        });
    }

    let raw: RawTaskList =
        serde_json::from_value(body.clone()).map_err(|e| RemoteReadError::Malformed {
            http_status,
            detail: e.to_string(),
        })?;

    let tasks = raw.tasks.unwrap_or_default();
    Ok(RemoteRecordSet::from_raw(
        canon,
        tasks.iter().filter_map(|t| t.hash.as_deref()),
    ))
}
