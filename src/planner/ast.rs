//! Filter expression AST
//!
//! A closed grammar: leaf conditions on one field combined with AND/OR. `Not` is
//! representable so callers can build it, but the planner rejects it.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::key::IndexKey;

/// Filter operation types
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Equality: field = value (`None` matches absent keys)
    Eq(Option<IndexKey>),
    /// Greater than or equal: field >= value
    Gte(IndexKey),
    /// Greater than: field > value
    Gt(IndexKey),
    /// Less than or equal: field <= value
    Lte(IndexKey),
    /// Less than: field < value
    Lt(IndexKey),
    /// Prefix match on a string field
    StartsWith(String),
}

impl FilterOp {
    /// Returns true if this is an equality operation
    pub fn is_equality(&self) -> bool {
        matches!(self, FilterOp::Eq(_))
    }

    /// Returns true if this is a single-sided comparison
    pub fn is_comparison(&self) -> bool {
        matches!(self, FilterOp::Gte(_) | FilterOp::Gt(_) | FilterOp::Lte(_) | FilterOp::Lt(_))
    }

    /// Returns true if answering this operation needs an ordered index
    pub fn needs_order(&self) -> bool {
        self.is_comparison() || matches!(self, FilterOp::StartsWith(_))
    }

    /// Returns the operation name for explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "eq",
            FilterOp::Gte(_) => "gte",
            FilterOp::Gt(_) => "gt",
            FilterOp::Lte(_) => "lte",
            FilterOp::Lt(_) => "lt",
            FilterOp::StartsWith(_) => "starts_with",
        }
    }
}

/// A single leaf condition (field + operation)
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Field name
    pub field: String,
    /// Filter operation
    pub op: FilterOp,
}

/// A boolean filter expression over indexed fields
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    fn leaf(field: impl Into<String>, op: FilterOp) -> Self {
        Predicate::Condition(Condition {
            field: field.into(),
            op,
        })
    }

    /// field = value
    pub fn eq(field: impl Into<String>, value: impl Into<IndexKey>) -> Self {
        Self::leaf(field, FilterOp::Eq(Some(value.into())))
    }

    /// field is absent
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::leaf(field, FilterOp::Eq(None))
    }

    /// field > value
    pub fn gt(field: impl Into<String>, value: impl Into<IndexKey>) -> Self {
        Self::leaf(field, FilterOp::Gt(value.into()))
    }

    /// field >= value
    pub fn gte(field: impl Into<String>, value: impl Into<IndexKey>) -> Self {
        Self::leaf(field, FilterOp::Gte(value.into()))
    }

    /// field < value
    pub fn lt(field: impl Into<String>, value: impl Into<IndexKey>) -> Self {
        Self::leaf(field, FilterOp::Lt(value.into()))
    }

    /// field <= value
    pub fn lte(field: impl Into<String>, value: impl Into<IndexKey>) -> Self {
        Self::leaf(field, FilterOp::Lte(value.into()))
    }

    /// field starts with prefix
    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::leaf(field, FilterOp::StartsWith(prefix.into()))
    }

    /// Both sides must match
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Either side may match
    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// The leaf condition, if this is one
    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Predicate::Condition(c) => Some(c),
            _ => None,
        }
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            FilterOp::Eq(Some(v)) => write!(f, "{} == {}", self.field, v),
            FilterOp::Eq(None) => write!(f, "{} == null", self.field),
            FilterOp::Gte(v) => write!(f, "{} >= {}", self.field, v),
            FilterOp::Gt(v) => write!(f, "{} > {}", self.field, v),
            FilterOp::Lte(v) => write!(f, "{} <= {}", self.field, v),
            FilterOp::Lt(v) => write!(f, "{} < {}", self.field, v),
            FilterOp::StartsWith(p) => write!(f, "{}.starts_with({:?})", self.field, p),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Condition(c) => write!(f, "{}", c),
            Predicate::And(l, r) => write!(f, "({} && {})", l, r),
            Predicate::Or(l, r) => write!(f, "({} || {})", l, r),
            Predicate::Not(p) => write!(f, "!{}", p),
        }
    }
}
