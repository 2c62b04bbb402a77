//! Collaborator boundary: the remote service and the overflow sink.
//!
//! The pipeline only ever talks to these traits. Transport and storage live in
//! other crates (`ohc-api`, `ohc-artifacts`) or in test doubles.

use std::fmt;
use std::time::Duration;

use ohc_reconcile::{remote_adapter, PendingSet};
use serde_json::Value;

use crate::gateway::{SubmitBatch, WritePermit};

/// Terms-agreement flag sent with every request. Always affirmed.
pub const AGREE_TERMS: &str = "yes";

pub const DEFAULT_BASE_URL: &str = "https://api.onlinehashcrack.com/v2";
/// WPA-PBKDF2-PMKID+EAPOL
pub const DEFAULT_ALGO_MODE: u64 = 22000;
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Replies and errors
// ---------------------------------------------------------------------------

/// A service reply exactly as received: HTTP status plus JSON body.
///
/// Non-JSON bodies are represented by the transport as
/// `{"success": false, "text": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReply {
    pub http_status: u16,
    pub body: Value,
}

impl ServiceReply {
    pub fn new(http_status: u16, body: Value) -> Self {
        Self { http_status, body }
    }

    /// HTTP status < 400 and `success == true`.
    pub fn is_accepted(&self) -> bool {
        remote_adapter::is_accepted(self.http_status, &self.body)
    }

    pub fn failure_message(&self) -> String {
        remote_adapter::failure_message(&self.body)
    }
}

/// The request never produced a reply (connect, TLS, timeout, body read).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub action: &'static str,
    pub detail: String,
}

impl TransportError {
    pub fn new(action: &'static str, detail: impl Into<String>) -> Self {
        Self {
            action,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} request failed: {}", self.action, self.detail)
    }
}

impl std::error::Error for TransportError {}

/// Error type for sink implementations.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Where the overflow sink put the deferred records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReceipt {
    pub location: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Remote cracking service.
///
/// `upload_hashes` can only be called with a [`WritePermit`], which only the
/// pipeline can issue, at most once per run. Implementations must not retry.
pub trait RemoteService {
    /// Read action (`list_tasks`).
    fn list_tasks(&self) -> Result<ServiceReply, TransportError>;

    /// Write action. `batch` holds 1..=C hashes in Pending order.
    fn upload_hashes(
        &self,
        batch: SubmitBatch,
        permit: WritePermit,
    ) -> Result<ServiceReply, TransportError>;
}

/// Persists the full Pending Set when the gate overflows.
///
/// Output must re-ingest as an input source with the same records. Either the
/// whole set is recorded or an error is returned.
pub trait OverflowSink {
    fn persist(&self, pending: &PendingSet) -> Result<SinkReceipt, SinkError>;
}

impl<T: RemoteService + ?Sized> RemoteService for &T {
    fn list_tasks(&self) -> Result<ServiceReply, TransportError> {
        (**self).list_tasks()
    }

    fn upload_hashes(
        &self,
        batch: SubmitBatch,
        permit: WritePermit,
    ) -> Result<ServiceReply, TransportError> {
        (**self).upload_hashes(batch, permit)
    }
}

impl<T: OverflowSink + ?Sized> OverflowSink for &T {
    fn persist(&self, pending: &PendingSet) -> Result<SinkReceipt, SinkError> {
        (**self).persist(pending)
    }
}
