//! Collection errors
//!
//! Wraps the subsystem errors so every collection operation returns one type.

use thiserror::Error;

use crate::executor::ExecutorError;
use crate::index::IndexError;
use crate::key::KeyError;
use crate::planner::PlannerError;

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Indexed collection errors
#[derive(Debug, Clone, Error)]
pub enum CollectionError {
    // Construction
    #[error(transparent)]
    Key(#[from] KeyError),

    // Queries
    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Index(#[from] IndexError),

    // Element operators
    #[error("Sequence contains no elements")]
    NoElements,

    #[error("Sequence contains more than one element")]
    MoreThanOneElement,
}

impl CollectionError {
    /// Stable string code of the underlying error
    pub fn code(&self) -> &'static str {
        match self {
            CollectionError::Key(e) => e.code().code(),
            CollectionError::Planner(e) => e.code().code(),
            CollectionError::Executor(e) => e.code().code(),
            CollectionError::Index(e) => e.code().code(),
            CollectionError::NoElements => "MIDX_NO_ELEMENTS",
            CollectionError::MoreThanOneElement => "MIDX_MORE_THAN_ONE_ELEMENT",
        }
    }
}
