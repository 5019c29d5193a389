//! Hash-bucketed equality index
//!
//! Maps each key to the bucket of items sharing it. Items with an absent key live in
//! a separate null bucket. No ordering guarantee on lookups.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::key::{FieldId, IndexKey};

use super::bucket::{insert_slot, remove_slot, Bucket, BucketIter, ItemRef, Removal};

/// Equality-only index over one field
#[derive(Debug)]
pub struct EqualityIndex<T> {
    field: FieldId,
    buckets: HashMap<IndexKey, Bucket<T>>,
    null_bucket: Option<Bucket<T>>,
    len: usize,
}

impl<T> EqualityIndex<T> {
    /// Creates a new empty index
    pub fn new(field: FieldId) -> Self {
        Self {
            field,
            buckets: HashMap::new(),
            null_bucket: None,
            len: 0,
        }
    }

    pub fn field(&self) -> &FieldId {
        &self.field
    }

    /// All items whose key equals `key`; the null bucket when `key` is `None`.
    pub fn filter(&self, key: Option<&IndexKey>) -> BucketIter<'_, T> {
        match key {
            Some(k) => BucketIter::of(self.buckets.get(k)),
            None => BucketIter::of(self.null_bucket.as_ref()),
        }
    }

    /// Registers `item` under `key`
    pub fn add(&mut self, key: Option<IndexKey>, item: ItemRef<T>) {
        match key {
            Some(k) => match self.buckets.entry(k) {
                Entry::Occupied(mut e) => e.get_mut().insert(item),
                Entry::Vacant(e) => {
                    e.insert(Bucket::new(item));
                }
            },
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
                let removal = self
                    .buckets
                    .get_mut(k)
                    .map_or(Removal::NotFound, |bucket| bucket.remove(item));
                if removal == Removal::Emptied {
                    self.buckets.remove(k);
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
        self.buckets.clear();
        self.null_bucket = None;
        self.len = 0;
    }

    /// Returns the number of distinct non-null keys
    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the total number of registered items
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every key with its items; the null group (if any) comes first.
    pub fn groups(&self) -> impl Iterator<Item = (Option<&IndexKey>, BucketIter<'_, T>)> + '_ {
        let null = self.null_bucket.as_ref().map(|b| (None::<&IndexKey>, b.iter()));
        null.into_iter()
            .chain(self.buckets.iter().map(|(k, b)| (Some(k), b.iter())))
    }

    /// Bucket stored for `key`, for representation checks
    pub fn bucket(&self, key: Option<&IndexKey>) -> Option<&Bucket<T>> {
        match key {
            Some(k) => self.buckets.get(k),
            None => self.null_bucket.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::bucket::{BucketState, SMALL_BUCKET_LIMIT};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn index() -> EqualityIndex<&'static str> {
        EqualityIndex::new(FieldId::parse("age").unwrap())
    }

    fn item(name: &'static str) -> ItemRef<&'static str> {
        ItemRef::new(Arc::new(name))
    }

    fn names<'a>(iter: impl Iterator<Item = &'a Arc<&'static str>>) -> HashSet<&'static str> {
        iter.map(|i| **i).collect()
    }

    #[test]
    fn test_add_and_filter() {
        let mut idx = index();
        idx.add(Some(IndexKey::from(20)), item("john"));
        idx.add(Some(IndexKey::from(30)), item("fred"));
        idx.add(Some(IndexKey::from(20)), item("alice"));

        assert_eq!(
            names(idx.filter(Some(&IndexKey::from(20)))),
            HashSet::from(["john", "alice"])
        );
        assert_eq!(names(idx.filter(Some(&IndexKey::from(30)))), HashSet::from(["fred"]));
        assert_eq!(idx.filter(Some(&IndexKey::from(40))).count(), 0);
        assert_eq!(idx.key_count(), 2);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn test_null_bucket() {
        let mut idx = index();
        let nobody = item("nobody");
        idx.add(None, nobody.clone());
        idx.add(Some(IndexKey::from(20)), item("john"));

        assert_eq!(names(idx.filter(None)), HashSet::from(["nobody"]));
        assert_eq!(idx.key_count(), 1);

        idx.remove(None, &nobody);
        assert_eq!(idx.filter(None).count(), 0);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_remove_drops_empty_key() {
        let mut idx = index();
        let john = item("john");
        idx.add(Some(IndexKey::from(20)), john.clone());
        idx.remove(Some(&IndexKey::from(20)), &john);

        assert_eq!(idx.key_count(), 0);
        assert!(idx.is_empty());
    }

    #[test]
    fn test_filter_idempotent() {
        let mut idx = index();
        for name in ["a", "b", "c", "d"] {
            idx.add(Some(IndexKey::from(1)), item(name));
        }
        let first = names(idx.filter(Some(&IndexKey::from(1))));
        let second = names(idx.filter(Some(&IndexKey::from(1))));
        assert_eq!(first, second);
    }

    #[test]
    fn test_escalation_through_index() {
        let mut idx = index();
        let key = IndexKey::from(7);
        let all: Vec<_> = (0..=SMALL_BUCKET_LIMIT)
            .map(|i| ItemRef::new(Arc::new(if i % 2 == 0 { "even" } else { "odd" })))
            .collect();

        for it in &all {
            idx.add(Some(key.clone()), it.clone());
        }
        assert_eq!(idx.bucket(Some(&key)).map(Bucket::state), Some(BucketState::Set));
        assert_eq!(idx.filter(Some(&key)).count(), SMALL_BUCKET_LIMIT + 1);

        idx.remove(Some(&key), &all[3]);
        assert_eq!(idx.bucket(Some(&key)).map(Bucket::state), Some(BucketState::List));
        let seen: HashSet<_> = idx.filter(Some(&key)).map(Arc::as_ptr).collect();
        assert_eq!(seen.len(), SMALL_BUCKET_LIMIT);
        assert!(!seen.contains(&Arc::as_ptr(all[3].as_arc())));
    }

    #[test]
    fn test_groups_and_clear() {
        let mut idx = index();
        idx.add(Some(IndexKey::from(20)), item("john"));
        idx.add(Some(IndexKey::from(30)), item("fred"));
        idx.add(None, item("nobody"));

        let groups: Vec<_> = idx.groups().map(|(k, items)| (k.cloned(), items.count())).collect();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], (None, 1));

        idx.clear();
        assert!(idx.is_empty());
        assert_eq!(idx.groups().count(), 0);
    }
}
