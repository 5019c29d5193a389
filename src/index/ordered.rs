//! Sorted range index
//!
//! Keys live in a BTreeMap ordered by their collated form, so range queries,
//! extremes and ordered iteration are answered directly from the tree.
//!
//! # Invariants
//!
//! - Keys that collate equal share one bucket; the bucket keeps the first key seen
//! - Range results come out in ascending key order
//! - The null bucket takes no part in any ordered operation

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use crate::key::{Collation, FieldId, IndexKey};

use super::bucket::{insert_slot, remove_slot, Bucket, BucketIter, ItemRef, Removal};
use super::errors::{IndexError, IndexResult};

#[derive(Debug)]
struct OrderedEntry<T> {
    /// Key as first extracted, before collation
    key: IndexKey,
    bucket: Bucket<T>,
}

/// Ordered index over one field
#[derive(Debug)]
pub struct OrderedIndex<T> {
    field: FieldId,
    collation: Collation,
    tree: BTreeMap<IndexKey, OrderedEntry<T>>,
    null_bucket: Option<Bucket<T>>,
    len: usize,
}

impl<T> OrderedIndex<T> {
    /// Creates a new empty index using ordinal key comparison
    pub fn new(field: FieldId) -> Self {
        Self::with_collation(field, Collation::Ordinal)
    }

    /// Creates a new empty index ordering keys by `collation`
    pub fn with_collation(field: FieldId, collation: Collation) -> Self {
        Self {
            field,
            collation,
            tree: BTreeMap::new(),
            null_bucket: None,
            len: 0,
        }
    }

    pub fn field(&self) -> &FieldId {
        &self.field
    }

    pub fn collation(&self) -> Collation {
        self.collation
    }

    /// All items whose key collates equal to `key`; the null bucket when `None`.
    pub fn filter(&self, key: Option<&IndexKey>) -> BucketIter<'_, T> {
        match key {
            Some(k) => {
                let collated = self.collation.collate(k);
                BucketIter::of(self.tree.get(collated.as_ref()).map(|e| &e.bucket))
            }
            None => BucketIter::of(self.null_bucket.as_ref()),
        }
    }

    /// Registers `item` under `key`
    pub fn add(&mut self, key: Option<IndexKey>, item: ItemRef<T>) {
        match key {
            Some(k) => {
                let collated = self.collation.collate(&k).into_owned();
                match self.tree.entry(collated) {
                    Entry::Occupied(mut e) => e.get_mut().bucket.insert(item),
                    Entry::Vacant(e) => {
                        e.insert(OrderedEntry {
                            key: k,
                            bucket: Bucket::new(item),
                        });
                    }
                }
            }
            None => insert_slot(&mut self.null_bucket, item),
        }
        self.len += 1;
    }

    /// Unregisters `item` from `key`.
    ///
    /// The caller guarantees the pair was previously added.
    pub fn remove(&mut self, key: Option<&IndexKey>, item: &ItemRef<T>) {
        let removal = match key {
            Some(k) => {
                let collated = self.collation.collate(k);
                let removal = self
                    .tree
                    .get_mut(collated.as_ref())
                    .map_or(Removal::NotFound, |e| e.bucket.remove(item));
                if removal == Removal::Emptied {
                    self.tree.remove(collated.as_ref());
                }
                removal
            }
            None => remove_slot(&mut self.null_bucket, item),
        };

        debug_assert_ne!(removal, Removal::NotFound, "item not registered under key");
        if removal != Removal::NotFound {
            self.len -= 1;
        }
    }

    /// Clear all entries, including the null bucket
    pub fn clear(&mut self) {
        self.tree.clear();
        self.null_bucket = None;
        self.len = 0;
    }

    /// Items with key above `key` (at or above when not `exclusive`), ascending.
    pub fn greater_than(&self, key: &IndexKey, exclusive: bool) -> impl Iterator<Item = &Arc<T>> + '_ {
        let lower = self.bound(key, exclusive);
        self.range(lower, Bound::Unbounded)
    }

    /// Items with key below `key` (at or below when not `exclusive`), ascending.
    pub fn less_than(&self, key: &IndexKey, exclusive: bool) -> impl Iterator<Item = &Arc<T>> + '_ {
        let upper = self.bound(key, exclusive);
        self.range(Bound::Unbounded, upper)
    }

    /// Items with key between `from` and `to`, ascending.
    ///
    /// Empty when `from > to`, or when `from == to` and either side is exclusive.
    pub fn between(
        &self,
        from: &IndexKey,
        exclude_from: bool,
        to: &IndexKey,
        exclude_to: bool,
    ) -> impl Iterator<Item = &Arc<T>> + '_ {
        let lower = self.bound(from, exclude_from);
        let upper = self.bound(to, exclude_to);
        self.range(lower, upper)
    }

    /// Items whose collated key falls within the given bounds, ascending.
    ///
    /// Bounds are expected in collated form. Inverted or empty bounds yield
    /// nothing instead of panicking.
    pub fn range(&self, lower: Bound<IndexKey>, upper: Bound<IndexKey>) -> impl Iterator<Item = &Arc<T>> + '_ {
        let entries = if is_empty_range(&lower, &upper) {
            None
        } else {
            Some(self.tree.range((lower, upper)))
        };
        entries
            .into_iter()
            .flatten()
            .flat_map(|(_, e)| e.bucket.iter())
    }

    /// Smallest non-null key
    pub fn min(&self) -> IndexResult<&IndexKey> {
        self.tree
            .first_key_value()
            .map(|(_, e)| &e.key)
            .ok_or_else(|| IndexError::empty_index(self.field.as_str()))
    }

    /// Largest non-null key
    pub fn max(&self) -> IndexResult<&IndexKey> {
        self.tree
            .last_key_value()
            .map(|(_, e)| &e.key)
            .ok_or_else(|| IndexError::empty_index(self.field.as_str()))
    }

    /// Every item sharing the smallest key; empty when no keyed items exist.
    pub fn having_min(&self) -> BucketIter<'_, T> {
        BucketIter::of(self.tree.first_key_value().map(|(_, e)| &e.bucket))
    }

    /// Every item sharing the largest key; empty when no keyed items exist.
    pub fn having_max(&self) -> BucketIter<'_, T> {
        BucketIter::of(self.tree.last_key_value().map(|(_, e)| &e.bucket))
    }

    /// Keyed items in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> + '_ {
        self.tree.values().flat_map(|e| e.bucket.iter())
    }

    /// Keyed items in descending key order, the exact reverse of [`OrderedIndex::iter`]
    pub fn iter_desc(&self) -> impl Iterator<Item = &Arc<T>> + '_ {
        self.tree.values().rev().flat_map(|e| e.bucket.iter_rev())
    }

    /// Every key with its items in ascending order; the null group (if any) first.
    pub fn groups(&self) -> impl Iterator<Item = (Option<&IndexKey>, BucketIter<'_, T>)> + '_ {
        let null = self.null_bucket.as_ref().map(|b| (None::<&IndexKey>, b.iter()));
        null.into_iter()
            .chain(self.tree.values().map(|e| (Some(&e.key), e.bucket.iter())))
    }

    /// Returns the number of distinct non-null keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the total number of registered items
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bucket stored for `key`, for representation checks
    pub fn bucket(&self, key: Option<&IndexKey>) -> Option<&Bucket<T>> {
        match key {
            Some(k) => self.tree.get(self.collation.collate(k).as_ref()).map(|e| &e.bucket),
            None => self.null_bucket.as_ref(),
        }
    }

    fn bound(&self, key: &IndexKey, exclusive: bool) -> Bound<IndexKey> {
        let collated = self.collation.collate(key).into_owned();
        if exclusive {
            Bound::Excluded(collated)
        } else {
            Bound::Included(collated)
        }
    }
}

/// True when `BTreeMap::range` would panic or can yield nothing.
fn is_empty_range(lower: &Bound<IndexKey>, upper: &Bound<IndexKey>) -> bool {
    let (from, from_excluded) = match lower {
        Bound::Included(k) => (k, false),
        Bound::Excluded(k) => (k, true),
        Bound::Unbounded => return false,
    };
    let (to, to_excluded) = match upper {
        Bound::Included(k) => (k, false),
        Bound::Excluded(k) => (k, true),
        Bound::Unbounded => return false,
    };
    from > to || (from == to && (from_excluded || to_excluded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ages(pairs: &[(i64, &'static str)]) -> (OrderedIndex<&'static str>, Vec<ItemRef<&'static str>>) {
        let mut idx = OrderedIndex::new(FieldId::parse("age").unwrap());
        let mut refs = Vec::new();
        for (age, name) in pairs {
            let r = ItemRef::new(Arc::new(*name));
            idx.add(Some(IndexKey::from(*age)), r.clone());
            refs.push(r);
        }
        (idx, refs)
    }

    fn collect<'a>(iter: impl Iterator<Item = &'a Arc<&'static str>>) -> Vec<&'static str> {
        iter.map(|i| **i).collect()
    }

    fn sample() -> OrderedIndex<&'static str> {
        ages(&[(30, "fred"), (10, "amy"), (20, "john"), (40, "zed"), (20, "alice")]).0
    }

    #[test]
    fn test_greater_than() {
        let idx = sample();
        let k = IndexKey::from(20);
        assert_eq!(collect(idx.greater_than(&k, true)), vec!["fred", "zed"]);
        assert_eq!(collect(idx.greater_than(&k, false)), vec!["john", "alice", "fred", "zed"]);
    }

    #[test]
    fn test_less_than() {
        let idx = sample();
        let k = IndexKey::from(20);
        assert_eq!(collect(idx.less_than(&k, true)), vec!["amy"]);
        assert_eq!(collect(idx.less_than(&k, false)), vec!["amy", "john", "alice"]);
    }

    #[test]
    fn test_between_bounds() {
        let idx = sample();
        let (from, to) = (IndexKey::from(20), IndexKey::from(30));

        assert_eq!(collect(idx.between(&from, false, &to, false)), vec!["john", "alice", "fred"]);
        assert_eq!(collect(idx.between(&from, true, &to, false)), vec!["fred"]);
        assert_eq!(collect(idx.between(&from, false, &to, true)), vec!["john", "alice"]);
        assert!(collect(idx.between(&from, true, &to, true)).is_empty());
    }

    #[test]
    fn test_between_inverted_or_degenerate_is_empty() {
        let idx = sample();
        let (lo, hi) = (IndexKey::from(20), IndexKey::from(30));

        assert_eq!(idx.between(&hi, false, &lo, false).count(), 0);
        assert_eq!(idx.between(&lo, true, &lo, true).count(), 0);
        assert_eq!(idx.between(&lo, true, &lo, false).count(), 0);
        assert_eq!(idx.between(&lo, false, &lo, false).count(), 2);
    }

    #[test]
    fn test_min_max() {
        let idx = sample();
        assert_eq!(idx.min().unwrap(), &IndexKey::from(10));
        assert_eq!(idx.max().unwrap(), &IndexKey::from(40));
        assert_eq!(collect(idx.having_min()), vec!["amy"]);
        assert_eq!(collect(idx.having_max()), vec!["zed"]);
    }

    #[test]
    fn test_empty_index_extremes() {
        let mut idx: OrderedIndex<&'static str> = OrderedIndex::new(FieldId::parse("age").unwrap());
        idx.add(None, ItemRef::new(Arc::new("nobody")));

        let err = idx.min().unwrap_err();
        assert_eq!(err.code().code(), "MIDX_INDEX_EMPTY");
        assert!(idx.max().is_err());
        assert_eq!(idx.having_min().count(), 0);
        assert_eq!(idx.having_max().count(), 0);
    }

    #[test]
    fn test_null_excluded_from_ordered_ops() {
        let (mut idx, _) = ages(&[(20, "john")]);
        idx.add(None, ItemRef::new(Arc::new("nobody")));

        assert_eq!(collect(idx.iter()), vec!["john"]);
        assert_eq!(collect(idx.greater_than(&IndexKey::from(0), false)), vec!["john"]);
        assert_eq!(collect(idx.filter(None)), vec!["nobody"]);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_iter_desc_reverses_iter() {
        let idx = sample();
        let mut forward = collect(idx.iter());
        forward.reverse();
        assert_eq!(collect(idx.iter_desc()), forward);
    }

    #[test]
    fn test_remove_updates_extremes() {
        let (mut idx, refs) = ages(&[(10, "amy"), (20, "john")]);
        idx.remove(Some(&IndexKey::from(10)), &refs[0]);
        assert_eq!(idx.min().unwrap(), &IndexKey::from(20));
        assert_eq!(idx.key_count(), 1);
    }

    #[test]
    fn test_ignore_case_collapses_keys() {
        let mut idx = OrderedIndex::with_collation(FieldId::parse("name").unwrap(), Collation::IgnoreCase);
        idx.add(Some(IndexKey::from("John")), ItemRef::new(Arc::new("first")));
        idx.add(Some(IndexKey::from("JOHN")), ItemRef::new(Arc::new("second")));
        idx.add(Some(IndexKey::from("alice")), ItemRef::new(Arc::new("third")));

        assert_eq!(idx.key_count(), 2);
        assert_eq!(collect(idx.filter(Some(&IndexKey::from("john")))), vec!["first", "second"]);
        // The bucket reports the first key seen
        assert_eq!(idx.max().unwrap(), &IndexKey::from("John"));
        assert_eq!(collect(idx.iter()), vec!["third", "first", "second"]);
    }

    #[test]
    fn test_float_keys_ordered_numerically() {
        let mut idx = OrderedIndex::new(FieldId::parse("score").unwrap());
        for (score, name) in [(2.5, "b"), (-1.0, "a"), (10.0, "c")] {
            idx.add(Some(IndexKey::from(score)), ItemRef::new(Arc::new(name)));
        }
        assert_eq!(collect(idx.iter()), vec!["a", "b", "c"]);
        assert_eq!(idx.min().unwrap().as_f64(), Some(-1.0));
    }
}
