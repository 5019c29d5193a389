//! Range bounds for ordered index scans
//!
//! Bounds are stored already collated with the target index's collation, so the
//! executor hands them to the index unchanged.
//!
//! # Fusion
//!
//! Two comparisons on the same field fuse into one range only when one supplies the
//! lower bound and the other the upper bound. Operand order does not matter.

use std::fmt;
use std::ops::Bound;

use crate::key::{Collation, IndexKey};

use super::ast::FilterOp;

/// One side of a range
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBound {
    /// Collated key
    pub key: IndexKey,
    /// Whether the key itself is excluded
    pub exclusive: bool,
}

impl KeyBound {
    fn to_bound(&self) -> Bound<IndexKey> {
        if self.exclusive {
            Bound::Excluded(self.key.clone())
        } else {
            Bound::Included(self.key.clone())
        }
    }
}

/// A possibly half-open key range
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeBounds {
    pub lower: Option<KeyBound>,
    pub upper: Option<KeyBound>,
}

impl RangeBounds {
    /// Bounds for a single comparison, or `None` when `op` is not a comparison.
    pub fn from_comparison(op: &FilterOp, collation: Collation) -> Option<Self> {
        let side = |key: &IndexKey, exclusive: bool| KeyBound {
            key: collation.collate(key).into_owned(),
            exclusive,
        };

        let bounds = match op {
            FilterOp::Gt(k) => Self {
                lower: Some(side(k, true)),
                upper: None,
            },
            FilterOp::Gte(k) => Self {
                lower: Some(side(k, false)),
                upper: None,
            },
            FilterOp::Lt(k) => Self {
                lower: None,
                upper: Some(side(k, true)),
            },
            FilterOp::Lte(k) => Self {
                lower: None,
                upper: Some(side(k, false)),
            },
            FilterOp::Eq(_) | FilterOp::StartsWith(_) => return None,
        };
        Some(bounds)
    }

    /// Bounds covering every string starting with `prefix`.
    ///
    /// The range is `[prefix, successor)` where the successor drops trailing
    /// `char::MAX` chars and bumps the last remaining char by one code point. An
    /// empty prefix, or one made only of `char::MAX`, leaves the upper side open.
    pub fn prefix(prefix: &str, collation: Collation) -> Self {
        let collated = collation.collate_str(prefix).into_owned();
        let upper = successor(&collated).map(|s| KeyBound {
            key: IndexKey::from(s),
            exclusive: true,
        });

        Self {
            lower: Some(KeyBound {
                key: IndexKey::from(collated),
                exclusive: false,
            }),
            upper,
        }
    }

    /// Merges a lower-only and an upper-only range, in either order.
    ///
    /// Returns `None` when both supply the same side or either is already two-sided.
    pub fn fuse(a: &RangeBounds, b: &RangeBounds) -> Option<Self> {
        match (a.is_lower_only(), a.is_upper_only(), b.is_lower_only(), b.is_upper_only()) {
            (true, _, _, true) => Some(Self {
                lower: a.lower.clone(),
                upper: b.upper.clone(),
            }),
            (_, true, true, _) => Some(Self {
                lower: b.lower.clone(),
                upper: a.upper.clone(),
            }),
            _ => None,
        }
    }

    fn is_lower_only(&self) -> bool {
        self.lower.is_some() && self.upper.is_none()
    }

    fn is_upper_only(&self) -> bool {
        self.lower.is_none() && self.upper.is_some()
    }

    /// Converts to standard bounds for `OrderedIndex::range`
    pub fn to_bounds(&self) -> (Bound<IndexKey>, Bound<IndexKey>) {
        let lower = self.lower.as_ref().map_or(Bound::Unbounded, KeyBound::to_bound);
        let upper = self.upper.as_ref().map_or(Bound::Unbounded, KeyBound::to_bound);
        (lower, upper)
    }
}

impl fmt::Display for RangeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Some(b) if b.exclusive => write!(f, "({}", b.key)?,
            Some(b) => write!(f, "[{}", b.key)?,
            None => write!(f, "(-inf")?,
        }
        write!(f, ", ")?;
        match &self.upper {
            Some(b) if b.exclusive => write!(f, "{})", b.key),
            Some(b) => write!(f, "{}]", b.key),
            None => write!(f, "+inf)"),
        }
    }
}

/// Smallest string greater than every string starting with `s`
fn successor(s: &str) -> Option<String> {
    let mut chars: Vec<char> = s.chars().collect();
    while chars.last() == Some(&char::MAX) {
        chars.pop();
    }
    let last = chars.pop()?;
    let next = match last {
        '\u{D7FF}' => '\u{E000}',
        c => char::from_u32(c as u32 + 1)?,
    };
    chars.push(next);
    Some(chars.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: i64) -> IndexKey {
        IndexKey::from(n)
    }

    #[test]
    fn test_comparison_sides() {
        let gt = RangeBounds::from_comparison(&FilterOp::Gt(key(20)), Collation::Ordinal).unwrap();
        assert_eq!(gt.lower, Some(KeyBound { key: key(20), exclusive: true }));
        assert!(gt.upper.is_none());

        let lte = RangeBounds::from_comparison(&FilterOp::Lte(key(30)), Collation::Ordinal).unwrap();
        assert!(lte.lower.is_none());
        assert_eq!(lte.upper, Some(KeyBound { key: key(30), exclusive: false }));

        assert!(RangeBounds::from_comparison(&FilterOp::Eq(None), Collation::Ordinal).is_none());
    }

    #[test]
    fn test_fuse_either_order() {
        let lo = RangeBounds::from_comparison(&FilterOp::Gt(key(20)), Collation::Ordinal).unwrap();
        let hi = RangeBounds::from_comparison(&FilterOp::Lte(key(30)), Collation::Ordinal).unwrap();

        let ab = RangeBounds::fuse(&lo, &hi).unwrap();
        let ba = RangeBounds::fuse(&hi, &lo).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.to_string(), "(20, 30]");
    }

    #[test]
    fn test_fuse_same_side_refused() {
        let a = RangeBounds::from_comparison(&FilterOp::Gt(key(1)), Collation::Ordinal).unwrap();
        let b = RangeBounds::from_comparison(&FilterOp::Gte(key(5)), Collation::Ordinal).unwrap();
        assert!(RangeBounds::fuse(&a, &b).is_none());

        let c = RangeBounds::from_comparison(&FilterOp::Lt(key(1)), Collation::Ordinal).unwrap();
        let d = RangeBounds::from_comparison(&FilterOp::Lte(key(5)), Collation::Ordinal).unwrap();
        assert!(RangeBounds::fuse(&c, &d).is_none());
    }

    #[test]
    fn test_prefix_bounds() {
        let b = RangeBounds::prefix("Jo", Collation::Ordinal);
        assert_eq!(b.to_string(), "[\"Jo\", \"Jp\")");

        let folded = RangeBounds::prefix("jo", Collation::IgnoreCase);
        assert_eq!(folded.to_string(), "[\"JO\", \"JP\")");
    }

    #[test]
    fn test_empty_prefix_is_open_above() {
        let b = RangeBounds::prefix("", Collation::Ordinal);
        assert_eq!(b.lower.as_ref().map(|l| l.exclusive), Some(false));
        assert!(b.upper.is_none());
    }

    #[test]
    fn test_successor_edges() {
        assert_eq!(successor("a"), Some("b".to_string()));
        assert_eq!(successor("x\u{D7FF}"), Some("x\u{E000}".to_string()));
        assert_eq!(successor("x\u{10FFFF}"), Some("y".to_string()));
        assert_eq!(successor("ab\u{10FFFF}\u{10FFFF}"), Some("ac".to_string()));
        assert_eq!(successor("\u{10FFFF}\u{10FFFF}"), None);
        assert_eq!(successor(""), None);
    }

    #[test]
    fn test_prefix_ending_in_max_char_is_bounded() {
        let b = RangeBounds::prefix("a\u{10FFFF}", Collation::Ordinal);
        assert_eq!(b.upper, Some(KeyBound { key: IndexKey::from("b"), exclusive: true }));
    }

    #[test]
    fn test_to_bounds() {
        let b = RangeBounds::from_comparison(&FilterOp::Gte(key(3)), Collation::Ordinal).unwrap();
        assert_eq!(b.to_bounds(), (Bound::Included(key(3)), Bound::Unbounded));
    }
}
