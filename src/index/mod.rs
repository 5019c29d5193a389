//! Index subsystem for multidex
//!
//! Indexes are derived, in-memory state kept in step with the collection.
//!
//! # Design Principles
//!
//! - Derived state: indexes mirror the collection, never the source of truth
//! - Identity: items are keyed by allocation, not by value
//! - Cheap uniqueness: buckets escalate Single -> List -> Set only as keys repeat
//!
//! # Capabilities
//!
//! - Equality: exact-match lookup on a hash map
//! - Ordered: everything Equality does, plus ranges, extremes and sorted iteration

mod bucket;
mod equality;
mod errors;
mod ordered;

use std::sync::Arc;

pub use bucket::{Bucket, BucketIter, BucketState, ItemRef, Removal, SMALL_BUCKET_LIMIT};
pub use equality::EqualityIndex;
pub use errors::{IndexError, IndexErrorCode, IndexResult};
pub use ordered::OrderedIndex;

use crate::key::{Collation, FieldId, IndexKey};

/// Contract shared by every index kind
pub trait KeyedIndex<T> {
    /// Field the index is built over
    fn field(&self) -> &FieldId;

    /// All items registered under `key` (the null bucket for `None`)
    fn filter(&self, key: Option<&IndexKey>) -> BucketIter<'_, T>;

    /// Register `item` under `key`
    fn add(&mut self, key: Option<IndexKey>, item: ItemRef<T>);

    /// Unregister `item` from `key`
    fn remove(&mut self, key: Option<&IndexKey>, item: &ItemRef<T>);

    /// Drop every entry
    fn clear(&mut self);

    /// Total number of registered items, null bucket included
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> KeyedIndex<T> for EqualityIndex<T> {
    fn field(&self) -> &FieldId {
        EqualityIndex::field(self)
    }

    fn filter(&self, key: Option<&IndexKey>) -> BucketIter<'_, T> {
        EqualityIndex::filter(self, key)
    }

    fn add(&mut self, key: Option<IndexKey>, item: ItemRef<T>) {
        EqualityIndex::add(self, key, item)
    }

    fn remove(&mut self, key: Option<&IndexKey>, item: &ItemRef<T>) {
        EqualityIndex::remove(self, key, item)
    }

    fn clear(&mut self) {
        EqualityIndex::clear(self)
    }

    fn len(&self) -> usize {
        EqualityIndex::len(self)
    }
}

impl<T> KeyedIndex<T> for OrderedIndex<T> {
    fn field(&self) -> &FieldId {
        OrderedIndex::field(self)
    }

    fn filter(&self, key: Option<&IndexKey>) -> BucketIter<'_, T> {
        OrderedIndex::filter(self, key)
    }

    fn add(&mut self, key: Option<IndexKey>, item: ItemRef<T>) {
        OrderedIndex::add(self, key, item)
    }

    fn remove(&mut self, key: Option<&IndexKey>, item: &ItemRef<T>) {
        OrderedIndex::remove(self, key, item)
    }

    fn clear(&mut self) {
        OrderedIndex::clear(self)
    }

    fn len(&self) -> usize {
        OrderedIndex::len(self)
    }
}

/// Which operations an index supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Equality,
    Ordered,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Equality => "equality",
            IndexKind::Ordered => "ordered",
        }
    }
}

/// A registered index, tagged by capability
#[derive(Debug)]
pub enum SecondaryIndex<T> {
    Equality(EqualityIndex<T>),
    Ordered(OrderedIndex<T>),
}

impl<T> SecondaryIndex<T> {
    /// Creates an empty index of the requested kind
    pub fn new(field: FieldId, kind: IndexKind, collation: Collation) -> Self {
        match kind {
            IndexKind::Equality => SecondaryIndex::Equality(EqualityIndex::new(field)),
            IndexKind::Ordered => {
                SecondaryIndex::Ordered(OrderedIndex::with_collation(field, collation))
            }
        }
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            SecondaryIndex::Equality(_) => IndexKind::Equality,
            SecondaryIndex::Ordered(_) => IndexKind::Ordered,
        }
    }

    pub fn collation(&self) -> Collation {
        match self {
            SecondaryIndex::Equality(_) => Collation::Ordinal,
            SecondaryIndex::Ordered(idx) => idx.collation(),
        }
    }

    /// The ordered capability, if this index has it
    pub fn as_ordered(&self) -> Option<&OrderedIndex<T>> {
        match self {
            SecondaryIndex::Equality(_) => None,
            SecondaryIndex::Ordered(idx) => Some(idx),
        }
    }

    /// Every key with its items; ordered indexes yield keys ascending.
    pub fn groups(&self) -> Box<dyn Iterator<Item = (Option<&IndexKey>, BucketIter<'_, T>)> + '_> {
        match self {
            SecondaryIndex::Equality(idx) => Box::new(idx.groups()),
            SecondaryIndex::Ordered(idx) => Box::new(idx.groups()),
        }
    }

    /// Distinct non-null keys
    pub fn key_count(&self) -> usize {
        match self {
            SecondaryIndex::Equality(idx) => idx.key_count(),
            SecondaryIndex::Ordered(idx) => idx.key_count(),
        }
    }

    /// Bucket stored for `key`
    pub fn bucket(&self, key: Option<&IndexKey>) -> Option<&Bucket<T>> {
        match self {
            SecondaryIndex::Equality(idx) => idx.bucket(key),
            SecondaryIndex::Ordered(idx) => idx.bucket(key),
        }
    }

    fn inner(&self) -> &dyn KeyedIndex<T> {
        match self {
            SecondaryIndex::Equality(idx) => idx,
            SecondaryIndex::Ordered(idx) => idx,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn KeyedIndex<T> {
        match self {
            SecondaryIndex::Equality(idx) => idx,
            SecondaryIndex::Ordered(idx) => idx,
        }
    }
}

impl<T> KeyedIndex<T> for SecondaryIndex<T> {
    fn field(&self) -> &FieldId {
        self.inner().field()
    }

    fn filter(&self, key: Option<&IndexKey>) -> BucketIter<'_, T> {
        self.inner().filter(key)
    }

    fn add(&mut self, key: Option<IndexKey>, item: ItemRef<T>) {
        self.inner_mut().add(key, item)
    }

    fn remove(&mut self, key: Option<&IndexKey>, item: &ItemRef<T>) {
        self.inner_mut().remove(key, item)
    }

    fn clear(&mut self) {
        self.inner_mut().clear()
    }

    fn len(&self) -> usize {
        self.inner().len()
    }
}

/// Boxed lazy sequence of items borrowed from live index storage
pub type Items<'a, T> = Box<dyn Iterator<Item = &'a Arc<T>> + 'a>;
