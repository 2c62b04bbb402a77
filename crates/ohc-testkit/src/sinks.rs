use std::cell::RefCell;

use ohc_execution::{OverflowSink, SinkError, SinkReceipt};
use ohc_reconcile::PendingSet;

/// Keeps every persisted batch in memory.
#[derive(Default)]
pub struct MemorySink {
    batches: RefCell<Vec<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.batches.borrow().len()
    }
}

impl OverflowSink for MemorySink {
    fn persist(&self, pending: &PendingSet) -> Result<SinkReceipt, SinkError> {
        self.batches.borrow_mut().push(pending.to_strings());
        Ok(SinkReceipt {
            location: "memory".to_string(),
            count: pending.len(),
        })
    }
}

/// Always fails; counts attempts.
#[derive(Default)]
pub struct FailingSink {
    attempts: RefCell<usize>,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.borrow()
    }
}

impl OverflowSink for FailingSink {
    fn persist(&self, _pending: &PendingSet) -> Result<SinkReceipt, SinkError> {
        *self.attempts.borrow_mut() += 1;
        Err("disk full".into())
    }
}
