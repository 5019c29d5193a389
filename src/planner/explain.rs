//! Explain plan output
//!
//! Produces deterministic, human-readable explain output.

use std::fmt;

use super::errors::PlannerError;
use super::planner::{PlanNode, QueryPlan};

/// Explain plan output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// Plan tree, one line per node, children indented (if accepted)
    pub steps: Vec<String>,
    /// Same-field comparison pairs answered as one range
    pub fused_ranges: usize,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful query plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let mut steps = Vec::new();
        describe(&plan.root, 0, &mut steps);

        Self {
            accepted: true,
            steps,
            fused_ranges: plan.fused_ranges,
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            steps: Vec::new(),
            fused_ranges: 0,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

fn describe(node: &PlanNode, depth: usize, out: &mut Vec<String>) {
    let pad = "  ".repeat(depth);
    match node {
        PlanNode::Lookup { slot, field, key } => {
            let key = key.as_ref().map_or_else(|| "null".to_string(), ToString::to_string);
            out.push(format!("{}LOOKUP {} = {} (index #{})", pad, field, key, slot));
        }
        PlanNode::Range { slot, field, bounds } => {
            out.push(format!("{}RANGE {} {} (index #{})", pad, field, bounds, slot));
        }
        PlanNode::Union(l, r) => {
            out.push(format!("{}UNION", pad));
            describe(l, depth + 1, out);
            describe(r, depth + 1, out);
        }
        PlanNode::Intersect(l, r) => {
            out.push(format!("{}INTERSECT", pad));
            describe(l, depth + 1, out);
            describe(r, depth + 1, out);
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            writeln!(f, "Plan:")?;
            for step in &self.steps {
                writeln!(f, "  {}", step)?;
            }
            writeln!(f, "Fused Ranges: {}", self.fused_ranges)?;
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
