//! Executor error types
//!
//! Error codes:
//! - MIDX_STALE_PLAN (REJECT)

use std::fmt;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Plan refused before any item is produced
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Plan references an index slot missing or of the wrong capability
    MidxStalePlan,
}

impl ExecutorErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::MidxStalePlan => "MIDX_STALE_PLAN",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug, Clone)]
pub struct ExecutorError {
    /// Error code
    code: ExecutorErrorCode,
    /// Human-readable message
    message: String,
    /// Index slot if applicable
    slot: Option<usize>,
}

impl ExecutorError {
    /// Create an error for a slot that holds no index
    pub fn missing_index(slot: usize) -> Self {
        Self {
            code: ExecutorErrorCode::MidxStalePlan,
            message: format!("Plan references index #{} which does not exist", slot),
            slot: Some(slot),
        }
    }

    /// Create an error for a range step on an index without ordering
    pub fn not_ordered(slot: usize, field: &str) -> Self {
        Self {
            code: ExecutorErrorCode::MidxStalePlan,
            message: format!("Index #{} on '{}' cannot answer a range scan", slot, field),
            slot: Some(slot),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending index slot if applicable
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
