//! Key extractors: a field identifier bound to a pure key function

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use super::errors::{KeyError, KeyResult};
use super::index_key::IndexKey;

/// Stable name correlating an extractor, its index and predicate leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(Arc<str>);

impl FieldId {
    /// Validates a field reference.
    ///
    /// Only simple field accesses are accepted: `[A-Za-z_][A-Za-z0-9_]*`.
    /// Paths, calls and other computed expressions are rejected.
    pub fn parse(field: &str) -> KeyResult<Self> {
        let mut chars = field.chars();
        let valid_head = matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic());
        if !valid_head || !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
            return Err(KeyError::unsupported_key_expression(field));
        }
        Ok(Self(Arc::from(field)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type KeyFn<T> = dyn Fn(&T) -> Option<IndexKey> + Send + Sync;

/// A pure, deterministic function from item to key, tagged with its field.
///
/// `None` is the absent key and is routed to the index's null bucket.
pub struct KeyExtractor<T> {
    field: FieldId,
    key_fn: Box<KeyFn<T>>,
}

impl<T> KeyExtractor<T> {
    /// Binds `key_fn` to `field`, failing if `field` is not a simple field access.
    pub fn new<F>(field: &str, key_fn: F) -> KeyResult<Self>
    where
        F: Fn(&T) -> Option<IndexKey> + Send + Sync + 'static,
    {
        Ok(Self {
            field: FieldId::parse(field)?,
            key_fn: Box::new(key_fn),
        })
    }

    /// Returns the field this extractor reads
    pub fn field(&self) -> &FieldId {
        &self.field
    }

    /// Computes the current key of `item`
    pub fn extract(&self, item: &T) -> Option<IndexKey> {
        (self.key_fn)(item)
    }
}

impl<T> fmt::Debug for KeyExtractor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyExtractor").field("field", &self.field).finish()
    }
}
