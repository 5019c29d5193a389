//! Key extractor error types
//!
//! Error codes:
//! - MIDX_UNSUPPORTED_KEY_EXPRESSION (FATAL)

use std::fmt;

/// Severity levels for key errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Index registration must not proceed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Key-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyErrorCode {
    /// Field reference is not a simple field access
    MidxUnsupportedKeyExpression,
}

impl KeyErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            KeyErrorCode::MidxUnsupportedKeyExpression => "MIDX_UNSUPPORTED_KEY_EXPRESSION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for KeyErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error raised while binding a key extractor to a field
#[derive(Debug, Clone)]
pub struct KeyError {
    code: KeyErrorCode,
    message: String,
    field: String,
}

impl KeyError {
    /// Create an unsupported key expression error
    pub fn unsupported_key_expression(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: KeyErrorCode::MidxUnsupportedKeyExpression,
            message: format!("Key expression '{}' is not a simple field access", f),
            field: f,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> KeyErrorCode {
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

    /// Returns the rejected field reference
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for KeyError {}

/// Result type for key operations
pub type KeyResult<T> = Result<T, KeyError>;
