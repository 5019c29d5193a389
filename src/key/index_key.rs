//! Dynamic key values stored by every index
//!
//! A single collection can carry indexes over fields of different types, so keys
//! are stored as one closed value type with a deterministic total order:
//! Bool < numbers < String. Int and Float keys share one numeric order, so
//! `Int(1) == Float(1.0)` and an integer constant ranges over float keys.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Index key representing an extracted field value.
///
/// Supports Bool, Int (i64), Float (f64 bits for ordering), String.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexKey {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value (stored as order-preserving bits)
    Float(u64),
    /// String value
    String(String),
}

impl IndexKey {
    /// Create a key from a boolean
    pub fn from_bool(v: bool) -> Self {
        IndexKey::Bool(v)
    }

    /// Create a key from an integer
    pub fn from_int(v: i64) -> Self {
        IndexKey::Int(v)
    }

    /// Create a key from a float
    ///
    /// Uses bit representation for total ordering. `-0.0` is stored as `0.0`.
    pub fn from_float(v: f64) -> Self {
        let v = if v == 0.0 { 0.0 } else { v };
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits // Negative: flip all bits
        } else {
            bits ^ (1 << 63) // Positive: flip sign bit
        };
        IndexKey::Float(ordered)
    }

    /// Create a key from a string
    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Returns the boolean value if this is a Bool key
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            IndexKey::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value if this is an Int key
    pub fn as_int(&self) -> Option<i64> {
        match self {
            IndexKey::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value if this is a Float key.
    ///
    /// Inverts the ordering transform applied by [`IndexKey::from_float`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            IndexKey::Float(ordered) => {
                let bits = if (ordered >> 63) == 1 {
                    ordered ^ (1 << 63)
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            _ => None,
        }
    }

    /// Returns the string value if this is a String key
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IndexKey::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the key variant, used in explain output and logs
    pub fn type_name(&self) -> &'static str {
        match self {
            IndexKey::Bool(_) => "bool",
            IndexKey::Int(_) => "int",
            IndexKey::Float(_) => "float",
            IndexKey::String(_) => "string",
        }
    }
}

/// 2^63, the first float above every i64
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl IndexKey {
    fn rank(&self) -> u8 {
        match self {
            IndexKey::Bool(_) => 0,
            IndexKey::Int(_) | IndexKey::Float(_) => 1,
            IndexKey::String(_) => 2,
        }
    }

    /// Float keys holding a whole value within i64 range
    fn integral(&self) -> Option<i64> {
        let f = self.as_f64()?;
        (f.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(&f)).then_some(f as i64)
    }
}

/// Exact comparison of an integer with a float; NaN sorts past the infinities
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= I64_LIMIT {
        return Ordering::Less;
    }
    if f < -I64_LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::Bool(a), IndexKey::Bool(b)) => a.cmp(b),
            (IndexKey::Int(a), IndexKey::Int(b)) => a.cmp(b),
            (IndexKey::Float(a), IndexKey::Float(b)) => a.cmp(b),
            (IndexKey::Int(a), IndexKey::Float(_)) => {
                cmp_int_float(*a, other.as_f64().unwrap_or(f64::NAN))
            }
            (IndexKey::Float(_), IndexKey::Int(b)) => {
                cmp_int_float(*b, self.as_f64().unwrap_or(f64::NAN)).reverse()
            }
            (IndexKey::String(a), IndexKey::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexKey {}

impl Hash for IndexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            IndexKey::Bool(b) => {
                state.write_u8(0);
                b.hash(state);
            }
            // Whole floats hash as the integer they equal
            IndexKey::Int(i) => {
                state.write_u8(1);
                i.hash(state);
            }
            IndexKey::Float(bits) => match self.integral() {
                Some(i) => {
                    state.write_u8(1);
                    i.hash(state);
                }
                None => {
                    state.write_u8(2);
                    bits.hash(state);
                }
            },
            IndexKey::String(s) => {
                state.write_u8(3);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Bool(b) => write!(f, "{}", b),
            IndexKey::Int(i) => write!(f, "{}", i),
            IndexKey::Float(_) => write!(f, "{}", self.as_f64().unwrap_or(f64::NAN)),
            IndexKey::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<bool> for IndexKey {
    fn from(v: bool) -> Self {
        IndexKey::from_bool(v)
    }
}

impl From<i64> for IndexKey {
    fn from(v: i64) -> Self {
        IndexKey::from_int(v)
    }
}

impl From<i32> for IndexKey {
    fn from(v: i32) -> Self {
        IndexKey::from_int(i64::from(v))
    }
}

impl From<u32> for IndexKey {
    fn from(v: u32) -> Self {
        IndexKey::from_int(i64::from(v))
    }
}

impl From<f64> for IndexKey {
    fn from(v: f64) -> Self {
        IndexKey::from_float(v)
    }
}

impl From<&str> for IndexKey {
    fn from(v: &str) -> Self {
        IndexKey::from_string(v)
    }
}

impl From<String> for IndexKey {
    fn from(v: String) -> Self {
        IndexKey::String(v)
    }
}

/// Key projection used by an index to place and order keys.
///
/// Keys that collate equal share one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Collation {
    /// Keys are compared as they are
    #[default]
    Ordinal,
    /// String keys are compared after upper-case folding; other keys are untouched
    IgnoreCase,
}

impl Collation {
    /// Project a key into the space the index orders by
    pub fn collate<'a>(&self, key: &'a IndexKey) -> Cow<'a, IndexKey> {
        match (self, key) {
            (Collation::IgnoreCase, IndexKey::String(s)) => {
                Cow::Owned(IndexKey::String(s.to_uppercase()))
            }
            _ => Cow::Borrowed(key),
        }
    }

    /// Project a raw string (predicate prefixes) into the collated space
    pub fn collate_str<'a>(&self, s: &'a str) -> Cow<'a, str> {
        match self {
            Collation::Ordinal => Cow::Borrowed(s),
            Collation::IgnoreCase => Cow::Owned(s.to_uppercase()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collation::Ordinal => "ordinal",
            Collation::IgnoreCase => "ignore_case",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering() {
        let keys = vec![
            IndexKey::from_bool(false),
            IndexKey::from_bool(true),
            IndexKey::from_float(f64::NEG_INFINITY),
            IndexKey::from_int(-100),
            IndexKey::from_float(-1.5),
            IndexKey::from_int(0),
            IndexKey::from_float(0.5),
            IndexKey::from_float(2.25),
            IndexKey::from_int(100),
            IndexKey::from_int(i64::MAX),
            IndexKey::from_float(1e19),
            IndexKey::from_string("aaa"),
            IndexKey::from_string("zzz"),
        ];

        for i in 1..keys.len() {
            assert!(keys[i - 1] < keys[i], "Keys should be ordered");
        }
    }

    #[test]
    fn test_int_and_float_share_numeric_order() {
        assert_eq!(IndexKey::from(1), IndexKey::from(1.0));
        assert!(IndexKey::from(1) < IndexKey::from(1.5));
        assert!(IndexKey::from(2) > IndexKey::from(1.5));
        assert!(IndexKey::from(-1) > IndexKey::from(-1.5));
        assert!(IndexKey::from(i64::MIN) == IndexKey::from(-9_223_372_036_854_775_808.0));
        assert!(IndexKey::from(i64::MAX) < IndexKey::from(f64::NAN));
        assert!(IndexKey::from(true) < IndexKey::from(f64::NEG_INFINITY));
    }

    #[test]
    fn test_equal_numbers_hash_alike() {
        use std::collections::HashSet;

        let set: HashSet<IndexKey> = [IndexKey::from(3), IndexKey::from(3.0), IndexKey::from(3.5)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&IndexKey::from(3.0)));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(IndexKey::from(-0.0), IndexKey::from(0.0));
        assert_eq!(IndexKey::from(-0.0).as_f64().map(f64::is_sign_negative), Some(false));
        assert_eq!(IndexKey::from(-0.0), IndexKey::from(0));
    }

    #[test]
    fn test_float_round_trip() {
        for v in [-1e9, -2.5, -0.0, 0.0, 1.0, 3.75, f64::MAX] {
            assert_eq!(IndexKey::from_float(v).as_f64(), Some(v));
        }
        assert_eq!(IndexKey::from_int(3).as_f64(), None);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(IndexKey::from(20), IndexKey::Int(20));
        assert_eq!(IndexKey::from(20u32), IndexKey::Int(20));
        assert_eq!(IndexKey::from("John"), IndexKey::String("John".into()));
        assert_eq!(IndexKey::from(true).as_bool(), Some(true));
    }

    #[test]
    fn test_ignore_case_collation() {
        let lower = IndexKey::from("john");
        let upper = IndexKey::from("JOHN");
        let c = Collation::IgnoreCase;

        assert_eq!(c.collate(&lower), c.collate(&upper));
        assert_eq!(c.collate(&IndexKey::from(5)).into_owned(), IndexKey::from(5));
        assert_ne!(Collation::Ordinal.collate(&lower), Collation::Ordinal.collate(&upper));
    }

    #[test]
    fn test_display() {
        assert_eq!(IndexKey::from(42).to_string(), "42");
        assert_eq!(IndexKey::from("a").to_string(), "\"a\"");
        assert_eq!(IndexKey::from(1.5).to_string(), "1.5");
    }
}
