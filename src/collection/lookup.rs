//! Key to items multimap view over a live index

use std::fmt;

use crate::index::{BucketIter, KeyedIndex, SecondaryIndex};
use crate::key::{FieldId, IndexKey};

/// Read-only grouping of a collection by one indexed field.
///
/// Borrowed from the collection; groups reflect the index at the time of each call.
pub struct Lookup<'a, T> {
    index: &'a SecondaryIndex<T>,
}

impl<'a, T> Lookup<'a, T> {
    pub(crate) fn new(index: &'a SecondaryIndex<T>) -> Self {
        Self { index }
    }

    /// Field the items are grouped by
    pub fn field(&self) -> &'a FieldId {
        self.index.field()
    }

    /// Items under `key` (absent keys with `None`); empty for an unknown key
    pub fn get(&self, key: Option<&IndexKey>) -> BucketIter<'a, T> {
        self.index.filter(key)
    }

    /// Whether any item is grouped under `key`
    pub fn contains_key(&self, key: Option<&IndexKey>) -> bool {
        self.index.bucket(key).is_some()
    }

    /// Number of groups, the null group included
    pub fn len(&self) -> usize {
        self.index.key_count() + usize::from(self.index.bucket(None).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every group with its items; ordered indexes yield keys ascending after the null group
    pub fn groups(&self) -> impl Iterator<Item = (Option<&'a IndexKey>, BucketIter<'a, T>)> + 'a {
        self.index.groups()
    }
}

impl<T> Clone for Lookup<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Lookup<'_, T> {}

impl<T> fmt::Debug for Lookup<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("field", self.field())
            .field("groups", &self.len())
            .finish()
    }
}
