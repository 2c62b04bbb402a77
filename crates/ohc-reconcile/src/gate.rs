//! Submission Gate.
//!
//! Maps the Pending Set onto exactly one terminal outcome:
//!
//! | `len(pending)`       | Outcome    | Side effects                          |
//! |----------------------|------------|---------------------------------------|
//! | `0`                  | `Empty`    | none                                  |
//! | `1..=capacity`       | `Submit`   | exactly one write action              |
//! | `> capacity`         | `Overflow` | whole Pending Set to the overflow sink |
//!
//! The gate consumes the Pending Set, so a run cannot evaluate it twice.
//! Pure, deterministic, no IO.

use std::fmt;

use crate::PendingSet;

/// Maximum hashes the service accepts in one upload request.
pub const DEFAULT_CAPACITY: usize = 50;

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// A ceiling of zero would turn every non-empty run into an overflow.
    ZeroCapacity,
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::ZeroCapacity => write!(f, "submission capacity must be at least 1"),
        }
    }
}

impl std::error::Error for GateError {}

/// Capacity ceiling `C` for one submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capacity(usize);

impl Capacity {
    pub fn new(n: usize) -> Result<Self, GateError> {
        if n == 0 {
            return Err(GateError::ZeroCapacity);
        }
        Ok(Self(n))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Discriminant of [`SubmissionOutcome`], for logging and partition checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    Empty,
    Overflow,
    Submit,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Empty => "EMPTY",
            OutcomeKind::Overflow => "OVERFLOW",
            OutcomeKind::Submit => "SUBMIT",
        }
    }
}

/// The gate's decision. Exactly one per run; it fully determines side effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Nothing new. No write, no sink.
    Empty,
    /// Too many new records. No write; every record goes to the sink.
    Overflow(PendingSet),
    /// `1..=C` new records to send in one write action.
    Submit(PendingSet),
}

impl SubmissionOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            SubmissionOutcome::Empty => OutcomeKind::Empty,
            SubmissionOutcome::Overflow(_) => OutcomeKind::Overflow,
            SubmissionOutcome::Submit(_) => OutcomeKind::Submit,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            SubmissionOutcome::Empty => 0,
            SubmissionOutcome::Overflow(p) | SubmissionOutcome::Submit(p) => p.len(),
        }
    }
}

/// Total over all `len`: exactly one kind applies.
pub fn classify(len: usize, capacity: Capacity) -> OutcomeKind {
    if len == 0 {
        OutcomeKind::Empty
    } else if len > capacity.get() {
        OutcomeKind::Overflow
    } else {
        OutcomeKind::Submit
    }
}

/// Evaluate the gate once and commit to an outcome.
pub fn evaluate(pending: PendingSet, capacity: Capacity) -> SubmissionOutcome {
    match classify(pending.len(), capacity) {
        OutcomeKind::Empty => SubmissionOutcome::Empty,
        OutcomeKind::Overflow => SubmissionOutcome::Overflow(pending),
        OutcomeKind::Submit => SubmissionOutcome::Submit(pending),
    }
}
