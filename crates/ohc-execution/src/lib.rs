//! ohc-execution
//!
//! Runs one reconciliation against the remote account and acts on the gate.
//!
//! Single Write Choke-Point
//! - `RemoteService::upload_hashes` requires a `WritePermit`
//! - Permits are issued only inside this crate, once per run
//! - Overflow never reaches the write path
//!
//! The transport and the overflow sink are collaborators behind traits; this
//! crate performs no IO of its own.

mod gateway;
mod pipeline;
mod service;

pub use gateway::{SubmitBatch, WritePermit};
pub use pipeline::{RunError, RunOutcome, RunSummary, UploadRun};
pub use service::{
    OverflowSink, RemoteService, ServiceReply, SinkError, SinkReceipt, TransportError,
    AGREE_TERMS, DEFAULT_ALGO_MODE, DEFAULT_BASE_URL, DEFAULT_LIST_TIMEOUT,
    DEFAULT_SUBMIT_TIMEOUT,
};
