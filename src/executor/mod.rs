//! Query Executor subsystem for multidex
//!
//! Consumes plans and produces lazy, borrow-checked item streams.
//!
//! # Execution Flow
//!
//! 1. Resolve each plan step to the index slot it names
//! 2. Lookups read one bucket; ranges walk the ordered tree between bounds
//! 3. Unions stream left then unseen right; intersections filter left by right
//!
//! # Invariants
//!
//! - Results borrow the indexes, so the collection cannot change while one is alive
//! - Every item appears at most once in any result
//! - Items are compared by identity, never by value

mod combinators;
mod errors;
#[allow(clippy::module_inception)]
mod executor;

pub use combinators::{Intersect, Union};
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::{IndexLookup, QueryExecutor};
