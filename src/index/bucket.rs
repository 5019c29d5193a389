//! Per-key item storage with size-based escalation
//!
//! Most keys are unique or nearly so, so a bucket starts as a single item and only
//! pays for a collection once a key is shared:
//!
//! - Single -> List on the second insert
//! - List -> Set when an insert would exceed `SMALL_BUCKET_LIMIT`
//! - Set -> List when a removal leaves exactly `SMALL_BUCKET_LIMIT`
//! - List -> Single when a removal leaves one item

use std::collections::{hash_set, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Rev;
use std::slice;
use std::sync::Arc;
use std::vec;

/// Largest bucket kept as a list
pub const SMALL_BUCKET_LIMIT: usize = 16;

/// An item keyed by allocation identity.
///
/// Two distinct `Arc`s holding equal values are different items.
pub struct ItemRef<T>(Arc<T>);

impl<T> ItemRef<T> {
    pub fn new(item: Arc<T>) -> Self {
        Self(item)
    }

    pub fn as_arc(&self) -> &Arc<T> {
        &self.0
    }

    pub fn into_arc(self) -> Arc<T> {
        self.0
    }
}

impl<T> Clone for ItemRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for ItemRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for ItemRef<T> {}

impl<T> Hash for ItemRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl<T> fmt::Debug for ItemRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemRef({:p})", Arc::as_ptr(&self.0))
    }
}

/// Representation currently used by a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketState {
    Single,
    List,
    Set,
}

/// Outcome of removing an item from a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Item was not in the bucket
    NotFound,
    /// Item removed, bucket still holds items
    Removed,
    /// Item was the only one; the caller must drop the bucket
    Emptied,
}

/// Items sharing one key
#[derive(Debug)]
pub enum Bucket<T> {
    Single(ItemRef<T>),
    List(Vec<ItemRef<T>>),
    Set(HashSet<ItemRef<T>>),
}

impl<T> Bucket<T> {
    /// Creates a bucket holding one item
    pub fn new(item: ItemRef<T>) -> Self {
        Bucket::Single(item)
    }

    pub fn state(&self) -> BucketState {
        match self {
            Bucket::Single(_) => BucketState::Single,
            Bucket::List(_) => BucketState::List,
            Bucket::Set(_) => BucketState::Set,
        }
    }

    /// Always at least one; an emptied bucket is dropped by its owner
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Bucket::Single(_) => 1,
            Bucket::List(items) => items.len(),
            Bucket::Set(items) => items.len(),
        }
    }

    pub fn contains(&self, item: &ItemRef<T>) -> bool {
        match self {
            Bucket::Single(existing) => existing == item,
            Bucket::List(items) => items.contains(item),
            Bucket::Set(items) => items.contains(item),
        }
    }

    /// Adds an item. The caller guarantees it is not already present.
    pub fn insert(&mut self, item: ItemRef<T>) {
        match self {
            Bucket::Single(existing) => {
                let first = existing.clone();
                *self = Bucket::List(vec![first, item]);
            }
            Bucket::List(items) if items.len() < SMALL_BUCKET_LIMIT => items.push(item),
            Bucket::List(items) => {
                let mut set: HashSet<ItemRef<T>> = items.drain(..).collect();
                set.insert(item);
                *self = Bucket::Set(set);
            }
            Bucket::Set(items) => {
                items.insert(item);
            }
        }
    }

    /// Removes an item, de-escalating the representation when it shrinks.
    pub fn remove(&mut self, item: &ItemRef<T>) -> Removal {
        match self {
            Bucket::Single(existing) => {
                if existing == item {
                    Removal::Emptied
                } else {
                    Removal::NotFound
                }
            }
            Bucket::List(items) => {
                let Some(pos) = items.iter().position(|i| i == item) else {
                    return Removal::NotFound;
                };
                items.remove(pos);
                if items.len() == 1 {
                    if let Some(last) = items.pop() {
                        *self = Bucket::Single(last);
                    }
                }
                Removal::Removed
            }
            Bucket::Set(items) => {
                if !items.remove(item) {
                    return Removal::NotFound;
                }
                if items.len() == SMALL_BUCKET_LIMIT {
                    let list: Vec<ItemRef<T>> = items.drain().collect();
                    *self = Bucket::List(list);
                }
                Removal::Removed
            }
        }
    }

    /// Iterates the bucket's items.
    ///
    /// Lists yield insertion order; sets yield an order that is stable while the
    /// set is not mutated.
    pub fn iter(&self) -> BucketIter<'_, T> {
        match self {
            Bucket::Single(item) => BucketIter::Single(Some(item)),
            Bucket::List(items) => BucketIter::List(items.iter()),
            Bucket::Set(items) => BucketIter::Set(items.iter()),
        }
    }

    /// Iterates the bucket's items in exactly the reverse of [`Bucket::iter`].
    pub fn iter_rev(&self) -> BucketIter<'_, T> {
        match self {
            Bucket::Single(item) => BucketIter::Single(Some(item)),
            Bucket::List(items) => BucketIter::ListRev(items.iter().rev()),
            Bucket::Set(items) => {
                let mut buffered: Vec<&ItemRef<T>> = items.iter().collect();
                buffered.reverse();
                BucketIter::Buffered(buffered.into_iter())
            }
        }
    }
}

/// Inserts into an optional bucket slot (used for null buckets).
pub(crate) fn insert_slot<T>(slot: &mut Option<Bucket<T>>, item: ItemRef<T>) {
    match slot {
        Some(bucket) => bucket.insert(item),
        None => *slot = Some(Bucket::new(item)),
    }
}

/// Removes from an optional bucket slot, clearing it when emptied.
pub(crate) fn remove_slot<T>(slot: &mut Option<Bucket<T>>, item: &ItemRef<T>) -> Removal {
    let removal = match slot {
        Some(bucket) => bucket.remove(item),
        None => Removal::NotFound,
    };
    if removal == Removal::Emptied {
        *slot = None;
    }
    removal
}

/// Iterator over the items of one bucket
pub enum BucketIter<'a, T> {
    Single(Option<&'a ItemRef<T>>),
    List(slice::Iter<'a, ItemRef<T>>),
    ListRev(Rev<slice::Iter<'a, ItemRef<T>>>),
    Set(hash_set::Iter<'a, ItemRef<T>>),
    Buffered(vec::IntoIter<&'a ItemRef<T>>),
}

impl<'a, T> BucketIter<'a, T> {
    /// An iterator over no items
    pub fn empty() -> Self {
        BucketIter::Single(None)
    }

    /// Iterates an optional bucket, empty when absent
    pub fn of(bucket: Option<&'a Bucket<T>>) -> Self {
        bucket.map_or_else(Self::empty, Bucket::iter)
    }
}

impl<'a, T> Iterator for BucketIter<'a, T> {
    type Item = &'a Arc<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = match self {
            BucketIter::Single(item) => item.take(),
            BucketIter::List(iter) => iter.next(),
            BucketIter::ListRev(iter) => iter.next(),
            BucketIter::Set(iter) => iter.next(),
            BucketIter::Buffered(iter) => iter.next(),
        };
        next.map(ItemRef::as_arc)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            BucketIter::Single(item) => {
                let n = usize::from(item.is_some());
                (n, Some(n))
            }
            BucketIter::List(iter) => iter.size_hint(),
            BucketIter::ListRev(iter) => iter.size_hint(),
            BucketIter::Set(iter) => iter.size_hint(),
            BucketIter::Buffered(iter) => iter.size_hint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<ItemRef<usize>> {
        (0..n).map(|i| ItemRef::new(Arc::new(i))).collect()
    }

    fn fill(items: &[ItemRef<usize>]) -> Bucket<usize> {
        let mut bucket = Bucket::new(items[0].clone());
        for item in &items[1..] {
            bucket.insert(item.clone());
        }
        bucket
    }

    #[test]
    fn test_identity_not_value() {
        let a = ItemRef::new(Arc::new(7));
        let b = ItemRef::new(Arc::new(7));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_escalation_states() {
        let all = items(SMALL_BUCKET_LIMIT + 1);

        let mut bucket = Bucket::new(all[0].clone());
        assert_eq!(bucket.state(), BucketState::Single);

        bucket.insert(all[1].clone());
        assert_eq!(bucket.state(), BucketState::List);

        for item in &all[2..SMALL_BUCKET_LIMIT] {
            bucket.insert(item.clone());
        }
        assert_eq!(bucket.state(), BucketState::List);
        assert_eq!(bucket.len(), SMALL_BUCKET_LIMIT);

        // 17th insert crosses the threshold
        bucket.insert(all[SMALL_BUCKET_LIMIT].clone());
        assert_eq!(bucket.state(), BucketState::Set);
        assert_eq!(bucket.len(), SMALL_BUCKET_LIMIT + 1);
        assert!(all.iter().all(|i| bucket.contains(i)));
    }

    #[test]
    fn test_deescalation_states() {
        let all = items(SMALL_BUCKET_LIMIT + 1);
        let mut bucket = fill(&all);

        assert_eq!(bucket.remove(&all[0]), Removal::Removed);
        assert_eq!(bucket.state(), BucketState::List);
        assert_eq!(bucket.len(), SMALL_BUCKET_LIMIT);
        assert!(all[1..].iter().all(|i| bucket.contains(i)));

        for item in &all[1..SMALL_BUCKET_LIMIT] {
            assert_eq!(bucket.remove(item), Removal::Removed);
        }
        assert_eq!(bucket.state(), BucketState::Single);
        assert!(bucket.contains(&all[SMALL_BUCKET_LIMIT]));

        assert_eq!(bucket.remove(&all[SMALL_BUCKET_LIMIT]), Removal::Emptied);
    }

    #[test]
    fn test_remove_missing() {
        let all = items(3);
        let mut bucket = fill(&all[..2]);
        assert_eq!(bucket.remove(&all[2]), Removal::NotFound);
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let all = items(5);
        let bucket = fill(&all);
        let seen: Vec<usize> = bucket.iter().map(|i| **i).collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_iter_rev_is_exact_reverse() {
        for n in [1, 5, SMALL_BUCKET_LIMIT + 4] {
            let all = items(n);
            let bucket = fill(&all);
            let mut forward: Vec<usize> = bucket.iter().map(|i| **i).collect();
            let backward: Vec<usize> = bucket.iter_rev().map(|i| **i).collect();
            forward.reverse();
            assert_eq!(forward, backward);
        }
    }

    #[test]
    fn test_slot_helpers() {
        let all = items(2);
        let mut slot = None;

        insert_slot(&mut slot, all[0].clone());
        insert_slot(&mut slot, all[1].clone());
        assert_eq!(slot.as_ref().map(Bucket::len), Some(2));

        assert_eq!(remove_slot(&mut slot, &all[0]), Removal::Removed);
        assert_eq!(remove_slot(&mut slot, &all[1]), Removal::Emptied);
        assert!(slot.is_none());
        assert_eq!(BucketIter::of(slot.as_ref()).count(), 0);
    }
}
