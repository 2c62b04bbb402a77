use crate::{PendingSet, RecordSet, RemoteRecordSet};

/// Outcome of diffing the local Record Set against the remote account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Local records absent remotely, in local order.
    pub pending: PendingSet,
    /// Local records the service already holds (skipped).
    pub already_remote: usize,
    pub local_total: usize,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.pending.is_empty()
    }
}

/// `pending = [r for r in local if r not in remote]`, preserving local order.
///
/// `pending.len() == local.len() - |local ∩ remote|` always holds.
pub fn reconcile(local: &RecordSet, remote: &RemoteRecordSet) -> ReconcileReport {
    let pending: Vec<_> = local
        .iter()
        .filter(|r| !remote.contains(r))
        .cloned()
        .collect();

    let already_remote = local.len() - pending.len();

    ReconcileReport {
        pending: PendingSet::new(pending),
        already_remote,
        local_total: local.len(),
    }
}
