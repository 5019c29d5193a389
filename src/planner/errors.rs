//! Planner error types
//!
//! Error codes:
//! - MIDX_NO_INDEX_FOR_FIELD (REJECT)
//! - MIDX_UNSUPPORTED_PREDICATE (REJECT)

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected before touching any index
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// No index of the required capability exists for a referenced field
    MidxNoIndexForField,
    /// Predicate shape outside the supported grammar
    MidxUnsupportedPredicate,
}

impl PlannerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::MidxNoIndexForField => "MIDX_NO_INDEX_FOR_FIELD",
            PlannerErrorCode::MidxUnsupportedPredicate => "MIDX_UNSUPPORTED_PREDICATE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Field name if applicable
    field: Option<String>,
}

impl PlannerError {
    /// Create a missing index error
    pub fn no_index_for_field(field: impl Into<String>, ordered: bool) -> Self {
        let f = field.into();
        let message = if ordered {
            format!("Field '{}' has no ordered index", f)
        } else {
            format!("Field '{}' is not indexed", f)
        };
        Self {
            code: PlannerErrorCode::MidxNoIndexForField,
            message,
            field: Some(f),
        }
    }

    /// Create an unsupported predicate error
    pub fn unsupported_predicate(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::MidxUnsupportedPredicate,
            message: reason.into(),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
