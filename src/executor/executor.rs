//! Query executor for multidex
//!
//! Executes query plans against live indexes, producing lazy item streams.
//!
//! Execution flow:
//! 1. Check every plan step against the indexes it names
//! 2. Build the iterator tree: lookups and ranges read buckets in place
//! 3. Hand the tree back unevaluated; items are produced as the caller pulls
//!
//! Range steps yield ascending key order. Lookup steps yield bucket order.

use std::marker::PhantomData;

use crate::index::{Items, KeyedIndex, SecondaryIndex};
use crate::planner::{PlanNode, QueryPlan};

use super::combinators::{Intersect, Union};
use super::errors::{ExecutorError, ExecutorResult};

/// Trait for resolving a plan's index slots to live indexes
pub trait IndexLookup<T> {
    /// Index registered at `slot`, if any
    fn index(&self, slot: usize) -> Option<&SecondaryIndex<T>>;
}

impl<T> IndexLookup<T> for [SecondaryIndex<T>] {
    fn index(&self, slot: usize) -> Option<&SecondaryIndex<T>> {
        self.get(slot)
    }
}

impl<T> IndexLookup<T> for Vec<SecondaryIndex<T>> {
    fn index(&self, slot: usize) -> Option<&SecondaryIndex<T>> {
        self.get(slot)
    }
}

/// Query executor that turns plans into item streams
pub struct QueryExecutor<'a, T, I: IndexLookup<T> + ?Sized> {
    indexes: &'a I,
    _items: PhantomData<fn() -> T>,
}

impl<'a, T: 'a, I: IndexLookup<T> + ?Sized> QueryExecutor<'a, T, I> {
    /// Creates a new executor
    pub fn new(indexes: &'a I) -> Self {
        Self {
            indexes,
            _items: PhantomData,
        }
    }

    /// Executes a query plan and returns its lazy result.
    ///
    /// Fails with `MIDX_STALE_PLAN` before producing anything when a step names a
    /// missing slot or asks an equality index for a range.
    pub fn execute(&self, plan: &QueryPlan) -> ExecutorResult<Items<'a, T>> {
        self.run(&plan.root)
    }

    fn run(&self, node: &PlanNode) -> ExecutorResult<Items<'a, T>> {
        let indexes: &'a I = self.indexes;
        match node {
            PlanNode::Lookup { slot, key, .. } => {
                let idx = indexes
                    .index(*slot)
                    .ok_or_else(|| ExecutorError::missing_index(*slot))?;
                Ok(Box::new(idx.filter(key.as_ref())))
            }
            PlanNode::Range { slot, field, bounds } => {
                let ordered = indexes
                    .index(*slot)
                    .ok_or_else(|| ExecutorError::missing_index(*slot))?
                    .as_ordered()
                    .ok_or_else(|| ExecutorError::not_ordered(*slot, field.as_str()))?;
                let (lower, upper) = bounds.to_bounds();
                Ok(Box::new(ordered.range(lower, upper)))
            }
            PlanNode::Union(l, r) => Ok(Box::new(Union::new(self.run(l)?, self.run(r)?))),
            PlanNode::Intersect(l, r) => Ok(Box::new(Intersect::new(self.run(l)?, self.run(r)?))),
        }
    }
}
