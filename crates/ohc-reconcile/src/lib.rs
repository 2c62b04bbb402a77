//! ohc-reconcile
//!
//! Local hash records vs. remote account state.
//!
//! Architectural decisions:
//! - Local sources merge into one ordered, deduplicated Record Set
//! - Remote records are a membership set only; their order is discarded
//! - Pending = local minus remote, in local order of first appearance
//! - The Submission Gate commits to exactly one of Empty | Overflow | Submit
//! - Local and remote records share one canonicalization rule
//!
//! Deterministic, pure logic. No IO. No network calls.

mod builder;
mod engine;
pub mod gate;
pub mod remote_adapter;
mod types;

pub use builder::{build_record_set, BuildStats, RecordSetBuilder};
pub use engine::{reconcile, ReconcileReport};
pub use gate::{
    classify, evaluate, Capacity, GateError, OutcomeKind, SubmissionOutcome, DEFAULT_CAPACITY,
};
pub use remote_adapter::{interpret_task_list, RemoteReadError};
pub use types::*;
