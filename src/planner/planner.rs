//! Query planner
//!
//! Turns a predicate into a tree of index operations. Planning is pure: it reads
//! index metadata only and never touches items.
//!
//! Index selection:
//! 1. Equality leaf: first registered index on the field, any capability
//! 2. Comparison or prefix leaf: first registered ordered index on the field
//!
//! "First" means registration order, so the same metadata always yields the same plan.

use crate::index::IndexKind;
use crate::key::{Collation, FieldId, IndexKey};

use super::ast::{Condition, FilterOp, Predicate};
use super::bounds::RangeBounds;
use super::errors::{PlannerError, PlannerResult};

/// Planner-visible description of one registered index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescriptor {
    pub field: FieldId,
    pub kind: IndexKind,
    pub collation: Collation,
}

/// Index metadata provided to the planner, in registration order
#[derive(Debug, Clone, Default)]
pub struct IndexMetadata {
    descriptors: Vec<IndexDescriptor>,
}

impl IndexMetadata {
    /// Creates empty index metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor; its slot is the current length
    pub fn push(&mut self, descriptor: IndexDescriptor) -> usize {
        self.descriptors.push(descriptor);
        self.descriptors.len() - 1
    }

    /// First index on `field`, restricted to ordered ones when `require_ordered`
    pub fn find(&self, field: &str, require_ordered: bool) -> Option<(usize, &IndexDescriptor)> {
        self.descriptors.iter().enumerate().find(|(_, d)| {
            d.field.as_str() == field && (!require_ordered || d.kind == IndexKind::Ordered)
        })
    }

    /// Checks if a field has any index
    pub fn is_indexed(&self, field: &str) -> bool {
        self.find(field, false).is_some()
    }

    pub fn descriptors(&self) -> &[IndexDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// One node of an executable plan
#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    /// Exact key lookup (`None` reads the null bucket)
    Lookup {
        slot: usize,
        field: FieldId,
        key: Option<IndexKey>,
    },
    /// Ordered scan between collated bounds
    Range {
        slot: usize,
        field: FieldId,
        bounds: RangeBounds,
    },
    /// Items matching either side, each once
    Union(Box<PlanNode>, Box<PlanNode>),
    /// Items matching both sides
    Intersect(Box<PlanNode>, Box<PlanNode>),
}

/// Immutable query plan (no runtime state)
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub root: PlanNode,
    /// Number of same-field comparison pairs answered as a single range
    pub fused_ranges: usize,
}

/// Query planner over a fixed set of index descriptors
pub struct QueryPlanner<'a> {
    index_metadata: &'a IndexMetadata,
}

impl<'a> QueryPlanner<'a> {
    /// Creates a new planner
    pub fn new(index_metadata: &'a IndexMetadata) -> Self {
        Self { index_metadata }
    }

    /// Plans a predicate, returning an immutable plan or error.
    ///
    /// Fails with `MIDX_NO_INDEX_FOR_FIELD` when a leaf has no usable index and with
    /// `MIDX_UNSUPPORTED_PREDICATE` for shapes outside the grammar.
    pub fn plan(&self, predicate: &Predicate) -> PlannerResult<QueryPlan> {
        let mut fused_ranges = 0;
        let root = self.plan_node(predicate, &mut fused_ranges)?;
        Ok(QueryPlan { root, fused_ranges })
    }

    fn plan_node(&self, predicate: &Predicate, fused: &mut usize) -> PlannerResult<PlanNode> {
        match predicate {
            Predicate::Condition(c) => self.plan_condition(c),
            Predicate::Or(l, r) => Ok(PlanNode::Union(
                Box::new(self.plan_node(l, fused)?),
                Box::new(self.plan_node(r, fused)?),
            )),
            Predicate::And(l, r) => {
                if let Some(node) = self.try_fuse(l, r)? {
                    *fused += 1;
                    return Ok(node);
                }
                Ok(PlanNode::Intersect(
                    Box::new(self.plan_node(l, fused)?),
                    Box::new(self.plan_node(r, fused)?),
                ))
            }
            Predicate::Not(inner) => Err(PlannerError::unsupported_predicate(format!(
                "Negation is not supported: {}",
                inner
            ))),
        }
    }

    fn plan_condition(&self, cond: &Condition) -> PlannerResult<PlanNode> {
        let ordered = cond.op.needs_order();
        let (slot, desc) = self
            .index_metadata
            .find(&cond.field, ordered)
            .ok_or_else(|| PlannerError::no_index_for_field(&cond.field, ordered))?;
        let field = desc.field.clone();

        let node = match &cond.op {
            FilterOp::Eq(key) => PlanNode::Lookup {
                slot,
                field,
                key: key.clone(),
            },
            FilterOp::StartsWith(prefix) => PlanNode::Range {
                slot,
                field,
                bounds: RangeBounds::prefix(prefix, desc.collation),
            },
            op => {
                let bounds = RangeBounds::from_comparison(op, desc.collation).ok_or_else(|| {
                    PlannerError::unsupported_predicate(format!("Cannot scan '{}' as a range", cond))
                })?;
                PlanNode::Range { slot, field, bounds }
            }
        };
        Ok(node)
    }

    /// A single range for `l && r` when both are opposite-side comparisons on one field
    fn try_fuse(&self, l: &Predicate, r: &Predicate) -> PlannerResult<Option<PlanNode>> {
        let (Some(a), Some(b)) = (l.as_condition(), r.as_condition()) else {
            return Ok(None);
        };
        if a.field != b.field || !a.op.is_comparison() || !b.op.is_comparison() {
            return Ok(None);
        }

        let Some((slot, desc)) = self.index_metadata.find(&a.field, true) else {
            return Err(PlannerError::no_index_for_field(&a.field, true));
        };
        let bounds = match (
            RangeBounds::from_comparison(&a.op, desc.collation),
            RangeBounds::from_comparison(&b.op, desc.collation),
        ) {
            (Some(x), Some(y)) => RangeBounds::fuse(&x, &y),
            _ => None,
        };

        Ok(bounds.map(|bounds| PlanNode::Range {
            slot,
            field: desc.field.clone(),
            bounds,
        }))
    }
}
