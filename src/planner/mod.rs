//! Query Planner subsystem for multidex
//!
//! Translates a filter predicate into a tree of index operations.
//!
//! # Design Principles
//!
//! - Deterministic: same predicate and index set produce the same plan
//! - Indexed: every leaf is answered by a registered index, never by scanning items
//! - Explicit: shapes outside the grammar are rejected, not approximated
//!
//! # Index Selection
//!
//! 1. Equality: first index on the field, either capability
//! 2. Comparison and prefix: first ordered index on the field
//!
//! Opposite-side comparisons on one field under AND are fused into a single range.

mod ast;
mod bounds;
mod errors;
mod explain;
#[allow(clippy::module_inception)]
mod planner;

pub use ast::{Condition, FilterOp, Predicate};
pub use bounds::{KeyBound, RangeBounds};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult};
pub use explain::ExplainPlan;
pub use planner::{IndexDescriptor, IndexMetadata, PlanNode, QueryPlan, QueryPlanner};
