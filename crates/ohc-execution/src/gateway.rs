//! Write gateway: the SINGLE choke-point for the mutating upload action.
//!
//! # Invariants
//!
//! **Compile-time:** [`RemoteService::upload_hashes`] takes a [`WritePermit`]
//! by value. The permit's field is private and it is neither `Clone` nor
//! `Copy`, so external code cannot construct one and each permit pays for
//! exactly one write.
//!
//! **Compile-time:** a [`SubmitBatch`] can only be made from a Pending Set
//! that the gate classified as `Submit`, so its size is always `1..=C`.
//!
//! **Runtime:** [`dispatch_once`] is the only place a permit is issued, and
//! the pipeline reaches it at most once per run.
//!
//! [`RemoteService::upload_hashes`]: crate::RemoteService::upload_hashes

use ohc_reconcile::{PendingSet, Record};
use tracing::info;

use crate::service::{RemoteService, ServiceReply, TransportError, AGREE_TERMS};

// ---------------------------------------------------------------------------
// WritePermit
// ---------------------------------------------------------------------------

/// Proof that the pipeline authorised one write action.
///
/// ```text
/// ✅  dispatch_once(service, pending)          // issues and spends one permit
/// ❌  WritePermit { _priv: () }                // ERROR: private field
/// ❌  permit.clone()                           // ERROR: not Clone
/// ```
#[derive(Debug)]
pub struct WritePermit {
    _priv: (),
}

impl WritePermit {
    fn issue() -> Self {
        Self { _priv: () }
    }

    /// Test-only permit for exercising transports directly.
    #[cfg(any(test, feature = "testkit"))]
    pub fn for_test() -> Self {
        Self::issue()
    }
}

// ---------------------------------------------------------------------------
// SubmitBatch
// ---------------------------------------------------------------------------

/// The records of one write action, in Pending order, plus the terms flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBatch {
    records: Vec<Record>,
}

impl SubmitBatch {
    fn from_pending(pending: PendingSet) -> Self {
        Self {
            records: pending.as_slice().to_vec(),
        }
    }

    #[cfg(any(test, feature = "testkit"))]
    pub fn for_test(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn hashes(&self) -> Vec<&str> {
        self.records.iter().map(Record::as_str).collect()
    }

    pub fn agree_terms(&self) -> &'static str {
        AGREE_TERMS
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Issue one permit and spend it on one write action. No retry on any reply,
/// rate-limit class included.
///
/// Callers pass the Pending Set from a `SubmissionOutcome::Submit`.
pub(crate) fn dispatch_once<S: RemoteService>(
    service: &S,
    pending: PendingSet,
) -> Result<ServiceReply, TransportError> {
    let batch = SubmitBatch::from_pending(pending);
    info!(count = batch.len(), "submitting one upload request");
    service.upload_hashes(batch, WritePermit::issue())
}
