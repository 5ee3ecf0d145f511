use crate::Error;
use std::{fmt, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkOperation {
    Insert,
    Update,
    Delete,
    Upsert,
    Sync,
}

impl fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BulkOperation::Insert => "insert",
            BulkOperation::Update => "update",
            BulkOperation::Delete => "delete",
            BulkOperation::Upsert => "upsert",
            BulkOperation::Sync => "sync",
        })
    }
}

/// Time spent in each stage of an operation.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkTimings {
    /// Validation, staging and statement generation.
    pub preparation: Duration,
    /// Bulk transfers and statements.
    pub transfer: Duration,
    /// Commit.
    pub processing: Duration,
}

/// Outcome of one bulk operation. Failures are reported here, never raised.
#[derive(Debug)]
pub struct BulkResult {
    pub operation: BulkOperation,
    pub success: bool,
    pub message: String,
    pub rows_affected: u64,
    pub elapsed: Duration,
    pub timings: BulkTimings,
    pub error: Option<Error>,
}

impl BulkResult {
    pub fn success(operation: BulkOperation, rows_affected: u64, elapsed: Duration) -> Self {
        Self {
            operation,
            success: true,
            message: format!("{} completed, {} rows affected", operation, rows_affected),
            rows_affected,
            elapsed,
            timings: Default::default(),
            error: None,
        }
    }

    pub fn failure(operation: BulkOperation, rows_affected: u64, error: Error) -> Self {
        Self {
            operation,
            success: false,
            message: format!("{} failed: {:#}", operation, error),
            rows_affected,
            elapsed: Duration::ZERO,
            timings: Default::default(),
            error: Some(error),
        }
    }

    pub fn with_timings(mut self, timings: BulkTimings, elapsed: Duration) -> Self {
        self.timings = timings;
        self.elapsed = elapsed;
        self
    }
}

/// Failure of one item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItemError {
    /// Position of the request in the batch.
    pub index: usize,
    pub operation: BulkOperation,
    pub message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BatchItemError>,
    /// Rows affected by the items that succeeded.
    pub rows_affected: u64,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}
