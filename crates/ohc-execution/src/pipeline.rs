//! One-shot upload run.
//!
//! ```text
//! RecordSet ──► list_tasks (once) ──► reconcile ──► gate ──┬─► Empty
//!                                                          ├─► Overflow ──► sink (once)
//!                                                          └─► Submit   ──► upload (once)
//! ```
//!
//! Strictly sequential. Any collaborator failure ends the run; nothing is
//! retried or re-fetched. [`UploadRun::execute`] consumes the run, so a
//! second evaluation is impossible.

use std::fmt;

use ohc_reconcile::{
    evaluate, interpret_task_list, reconcile, Canonicalizer, Capacity, OutcomeKind, RecordSet,
    RemoteReadError, SubmissionOutcome,
};
use tracing::{info, warn};

use crate::gateway::dispatch_once;
use crate::service::{
    OverflowSink, RemoteService, ServiceReply, SinkError, SinkReceipt, TransportError,
};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal state of a run, with the evidence the CLI reports.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No local records at all; no network call was made.
    NoLocalRecords,
    /// Every local record is already on the account.
    Empty,
    /// Pending exceeded capacity; all of it went to the sink, nothing was sent.
    Overflow { count: usize, receipt: SinkReceipt },
    /// One write action was made. `reply` is reported as-is.
    Submitted { count: usize, reply: ServiceReply },
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::NoLocalRecords => "NO_LOCAL_RECORDS",
            RunOutcome::Empty => OutcomeKind::Empty.as_str(),
            RunOutcome::Overflow { .. } => OutcomeKind::Overflow.as_str(),
            RunOutcome::Submitted { .. } => OutcomeKind::Submit.as_str(),
        }
    }

    /// `Some(accepted)` for a submitted run, `None` otherwise.
    pub fn submit_accepted(&self) -> Option<bool> {
        match self {
            RunOutcome::Submitted { reply, .. } => Some(reply.is_accepted()),
            _ => None,
        }
    }
}

/// Counts plus outcome for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub local_total: usize,
    pub already_remote: usize,
    pub pending: usize,
    pub outcome: RunOutcome,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// All run errors are terminal.
#[derive(Debug)]
pub enum RunError {
    /// A request produced no reply.
    Transport(TransportError),
    /// `list_tasks` replied but could not be trusted. Run aborted before reconcile.
    RemoteRead(RemoteReadError),
    /// Overflow sink failed. No remote state was mutated.
    Sink(SinkError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Transport(e) => write!(f, "{e}"),
            RunError::RemoteRead(e) => write!(f, "{e}"),
            RunError::Sink(e) => write!(f, "overflow sink write failed: {e}"),
        }
    }
}

// Display already carries the inner message; source skips one level so
// `{:#}` chains don't repeat it.
impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Transport(e) => std::error::Error::source(e),
            RunError::RemoteRead(e) => std::error::Error::source(e),
            RunError::Sink(e) => std::error::Error::source(e.as_ref()),
        }
    }
}

impl From<TransportError> for RunError {
    fn from(e: TransportError) -> Self {
        RunError::Transport(e)
    }
}

impl From<RemoteReadError> for RunError {
    fn from(e: RemoteReadError) -> Self {
        RunError::RemoteRead(e)
    }
}

// ---------------------------------------------------------------------------
// UploadRun
// ---------------------------------------------------------------------------

pub struct UploadRun<S, K>
where
    S: RemoteService,
    K: OverflowSink,
{
    service: S,
    sink: K,
    canon: Canonicalizer,
    capacity: Capacity,
}

impl<S, K> UploadRun<S, K>
where
    S: RemoteService,
    K: OverflowSink,
{
    /// `canon` must be the rule the local Record Set was built with.
    pub fn new(service: S, sink: K, canon: Canonicalizer, capacity: Capacity) -> Self {
        Self {
            service,
            sink,
            canon,
            capacity,
        }
    }

    pub fn execute(self, local: RecordSet) -> Result<RunSummary, RunError> {
        if local.is_empty() {
            info!("no local records; skipping remote query");
            return Ok(RunSummary {
                local_total: 0,
                already_remote: 0,
                pending: 0,
                outcome: RunOutcome::NoLocalRecords,
            });
        }

        info!(local = local.len(), "fetching remote task list");
        let reply = self.service.list_tasks()?;
        let remote = interpret_task_list(reply.http_status, &reply.body, &self.canon)?;
        info!(
            http_status = reply.http_status,
            remote = remote.len(),
            "remote task list received"
        );

        let report = reconcile(&local, &remote);
        let pending = report.pending.len();
        info!(
            already_remote = report.already_remote,
            pending, "reconciled against remote account"
        );

        let outcome = match evaluate(report.pending, self.capacity) {
            SubmissionOutcome::Empty => RunOutcome::Empty,
            SubmissionOutcome::Overflow(p) => {
                warn!(
                    count = p.len(),
                    capacity = self.capacity.get(),
                    "pending exceeds capacity; deferring to overflow sink, not submitting"
                );
                let receipt = self.sink.persist(&p).map_err(RunError::Sink)?;
                RunOutcome::Overflow {
                    count: p.len(),
                    receipt,
                }
            }
            SubmissionOutcome::Submit(p) => {
                let count = p.len();
                let reply = dispatch_once(&self.service, p)?;
                if reply.is_accepted() {
                    info!(http_status = reply.http_status, count, "upload accepted");
                } else {
                    warn!(
                        http_status = reply.http_status,
                        reason = %reply.failure_message(),
                        "upload rejected; not retrying"
                    );
                }
                RunOutcome::Submitted { count, reply }
            }
        };

        Ok(RunSummary {
            local_total: report.local_total,
            already_remote: report.already_remote,
            pending,
            outcome,
        })
    }
}
