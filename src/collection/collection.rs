//! The indexed collection
//!
//! Owns the item store, the per-item key snapshots and every registered index, and
//! keeps them in step through add, update, remove and change notifications.
//!
//! # Invariants
//!
//! - Every tracked item has one snapshot entry per index, in registration order
//! - Every tracked item sits in exactly the bucket its snapshot names, in every index
//! - An index registered late is backfilled before registration returns
//! - Indexes are append-only; the slot a plan names never changes meaning

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::executor::{IndexLookup, QueryExecutor};
use crate::index::{IndexKind, ItemRef, Items, KeyedIndex, OrderedIndex, SecondaryIndex};
use crate::key::{Collation, IndexKey, KeyExtractor};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, MetricsSnapshot};
use crate::planner::{
    ExplainPlan, IndexDescriptor, IndexMetadata, PlannerError, Predicate, QueryPlan, QueryPlanner,
};

use super::config::CollectionConfig;
use super::errors::{CollectionError, CollectionResult};
use super::lookup::Lookup;
use super::notify::ItemSubscriber;

struct IndexSlot<T> {
    extractor: KeyExtractor<T>,
    index: SecondaryIndex<T>,
}

impl<T> IndexLookup<T> for [IndexSlot<T>] {
    fn index(&self, slot: usize) -> Option<&SecondaryIndex<T>> {
        self.get(slot).map(|s| &s.index)
    }
}

/// Keys an item currently holds, one per index
type Snapshot = Vec<Option<IndexKey>>;

/// A set of shared items indexed by any number of derived keys.
///
/// Items are tracked by allocation identity. Callers that mutate an indexed field
/// in place must report it through [`IndexedCollection::update`] or
/// [`IndexedCollection::on_item_changed`]; until then queries see the old key.
pub struct IndexedCollection<T> {
    slots: Vec<IndexSlot<T>>,
    metadata: IndexMetadata,
    items: HashMap<ItemRef<T>, Snapshot>,
    config: CollectionConfig,
    metrics: MetricsRegistry,
    subscriber: Option<Box<dyn ItemSubscriber<T>>>,
}

impl<T> IndexedCollection<T> {
    /// Creates an empty collection with default settings
    pub fn new() -> Self {
        Self::with_config(CollectionConfig::default())
    }

    /// Creates an empty collection
    pub fn with_config(config: CollectionConfig) -> Self {
        Self {
            slots: Vec::new(),
            metadata: IndexMetadata::new(),
            items: HashMap::with_capacity(config.capacity),
            config,
            metrics: MetricsRegistry::new(),
            subscriber: None,
        }
    }

    /// Creates a collection holding `items`; indexes added later are backfilled
    pub fn from_items(items: impl IntoIterator<Item = Arc<T>>) -> Self {
        let mut collection = Self::new();
        collection.extend(items);
        collection
    }

    /// Installs a membership subscriber, attaching every item already present
    pub fn with_subscriber(mut self, subscriber: impl ItemSubscriber<T> + 'static) -> Self {
        let mut subscriber: Box<dyn ItemSubscriber<T>> = Box::new(subscriber);
        for item in self.items.keys() {
            subscriber.attach(item.as_arc());
        }
        self.subscriber = Some(subscriber);
        self
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Current counter values; all zero when metrics are disabled
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Indexes the collection by `field`, ordered or equality-only.
    ///
    /// Fails with `MIDX_UNSUPPORTED_KEY_EXPRESSION` if `field` is not a simple field name.
    pub fn index_by<F>(&mut self, field: &str, key_fn: F, ordered: bool) -> CollectionResult<&mut Self>
    where
        F: Fn(&T) -> Option<IndexKey> + Send + Sync + 'static,
    {
        let kind = if ordered {
            IndexKind::Ordered
        } else {
            IndexKind::Equality
        };
        self.register(KeyExtractor::new(field, key_fn)?, kind, Collation::Ordinal);
        Ok(self)
    }

    /// Indexes the collection by a string `field`, ordered and case-insensitive
    pub fn index_by_ignoring_case<F>(&mut self, field: &str, key_fn: F) -> CollectionResult<&mut Self>
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        let extractor = KeyExtractor::new(field, move |item: &T| key_fn(item).map(IndexKey::from))?;
        self.register(extractor, IndexKind::Ordered, Collation::IgnoreCase);
        Ok(self)
    }

    /// Registers a prepared extractor
    pub fn index_with(&mut self, extractor: KeyExtractor<T>, kind: IndexKind, collation: Collation) -> &mut Self {
        self.register(extractor, kind, collation);
        self
    }

    fn register(&mut self, extractor: KeyExtractor<T>, kind: IndexKind, collation: Collation) {
        let field = extractor.field().clone();
        let mut index = SecondaryIndex::new(field.clone(), kind, collation);

        for (item, snapshot) in self.items.iter_mut() {
            let key = extractor.extract(item.as_arc());
            snapshot.push(key.clone());
            index.add(key, item.clone());
        }

        let slot = self.metadata.push(IndexDescriptor {
            field: field.clone(),
            kind,
            collation,
        });
        self.slots.push(IndexSlot { extractor, index });

        let slot = slot.to_string();
        self.emit(
            Event::IndexRegistered,
            &[
                ("collation", collation.as_str()),
                ("field", field.as_str()),
                ("kind", kind.as_str()),
                ("slot", slot.as_str()),
            ],
        );
        if !self.items.is_empty() {
            let count = self.items.len().to_string();
            self.emit(Event::IndexBackfilled, &[("field", field.as_str()), ("items", count.as_str())]);
        }
    }

    /// Field names with at least one index, in registration order (repeats included)
    pub fn indexed_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.metadata.descriptors().iter().map(|d| d.field.as_str())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Items matching `predicate`, answered from the indexes.
    ///
    /// Range results come out in ascending key order; other shapes have no
    /// guaranteed order.
    pub fn filter(&self, predicate: &Predicate) -> CollectionResult<Items<'_, T>> {
        let plan = self.plan(predicate)?;
        let executor = QueryExecutor::<T, [IndexSlot<T>]>::new(self.slots.as_slice());
        match executor.execute(&plan) {
            Ok(items) => Ok(items),
            Err(err) => {
                self.reject(predicate, err.code().code(), err.message());
                Err(err.into())
            }
        }
    }

    /// Same as [`IndexedCollection::filter`]
    pub fn where_(&self, predicate: &Predicate) -> CollectionResult<Items<'_, T>> {
        self.filter(predicate)
    }

    /// Plan for `predicate`, as it would be executed
    pub fn explain(&self, predicate: &Predicate) -> ExplainPlan {
        match QueryPlanner::new(&self.metadata).plan(predicate) {
            Ok(plan) => ExplainPlan::from_plan(&plan),
            Err(err) => ExplainPlan::from_error(&err),
        }
    }

    fn plan(&self, predicate: &Predicate) -> CollectionResult<QueryPlan> {
        match QueryPlanner::new(&self.metadata).plan(predicate) {
            Ok(plan) => {
                if self.config.metrics_enabled {
                    self.metrics.increment_queries_executed();
                    self.metrics.add_ranges_fused(plan.fused_ranges as u64);
                }
                if self.logs(Event::QueryPlanned) {
                    let fused = plan.fused_ranges.to_string();
                    log_event_with_fields(
                        Event::QueryPlanned,
                        &[("fused_ranges", fused.as_str()), ("predicate", predicate.to_string().as_str())],
                    );
                }
                Ok(plan)
            }
            Err(err) => {
                self.reject(predicate, err.code().code(), err.message());
                Err(err.into())
            }
        }
    }

    fn reject(&self, predicate: &Predicate, code: &str, reason: &str) {
        if self.config.metrics_enabled {
            self.metrics.increment_queries_rejected();
        }
        if self.logs(Event::QueryRejected) {
            log_event_with_fields(
                Event::QueryRejected,
                &[("code", code), ("predicate", predicate.to_string().as_str()), ("reason", reason)],
            );
        }
    }

    /// First matching item; `NoElements` if none
    pub fn first(&self, predicate: &Predicate) -> CollectionResult<&Arc<T>> {
        self.first_or_default(predicate)?.ok_or(CollectionError::NoElements)
    }

    /// First matching item, if any
    pub fn first_or_default(&self, predicate: &Predicate) -> CollectionResult<Option<&Arc<T>>> {
        Ok(self.filter(predicate)?.next())
    }

    /// Last matching item; `NoElements` if none
    pub fn last(&self, predicate: &Predicate) -> CollectionResult<&Arc<T>> {
        self.last_or_default(predicate)?.ok_or(CollectionError::NoElements)
    }

    /// Last matching item, if any
    pub fn last_or_default(&self, predicate: &Predicate) -> CollectionResult<Option<&Arc<T>>> {
        Ok(self.filter(predicate)?.last())
    }

    /// The only matching item; `NoElements` if none, `MoreThanOneElement` if several
    pub fn single(&self, predicate: &Predicate) -> CollectionResult<&Arc<T>> {
        self.single_or_default(predicate)?.ok_or(CollectionError::NoElements)
    }

    /// The only matching item if any; `MoreThanOneElement` if several
    pub fn single_or_default(&self, predicate: &Predicate) -> CollectionResult<Option<&Arc<T>>> {
        let mut items = self.filter(predicate)?;
        let first = items.next();
        if first.is_some() && items.next().is_some() {
            return Err(CollectionError::MoreThanOneElement);
        }
        Ok(first)
    }

    /// Number of matching items
    pub fn count(&self, predicate: &Predicate) -> CollectionResult<usize> {
        Ok(self.filter(predicate)?.count())
    }

    /// Whether any item matches
    pub fn any(&self, predicate: &Predicate) -> CollectionResult<bool> {
        Ok(self.filter(predicate)?.next().is_some())
    }

    /// Items grouped by the first index on `field`
    pub fn group_by(&self, field: &str) -> CollectionResult<Lookup<'_, T>> {
        Ok(Lookup::new(self.find_index(field, false)?))
    }

    /// Same as [`IndexedCollection::group_by`]
    pub fn to_lookup(&self, field: &str) -> CollectionResult<Lookup<'_, T>> {
        self.group_by(field)
    }

    /// Pairs each outer element with every item whose `field` key equals its key
    pub fn join<'a, O, R, I, K, S>(
        &'a self,
        outer: I,
        field: &str,
        outer_key: K,
        result: S,
    ) -> CollectionResult<impl Iterator<Item = R> + 'a>
    where
        I: IntoIterator<Item = O>,
        I::IntoIter: 'a,
        O: 'a,
        R: 'a,
        K: Fn(&O) -> Option<IndexKey> + 'a,
        S: Fn(&'a Arc<T>, &O) -> R + 'a,
    {
        let index = self.find_index(field, false)?;
        Ok(outer.into_iter().flat_map(move |o| {
            let key = outer_key(&o);
            index
                .filter(key.as_ref())
                .map(|inner| result(inner, &o))
                .collect::<Vec<_>>()
        }))
    }

    /// Pairs each outer element with all items whose `field` key equals its key
    pub fn group_join<'a, O, R, I, K, S>(
        &'a self,
        outer: I,
        field: &str,
        outer_key: K,
        result: S,
    ) -> CollectionResult<impl Iterator<Item = R> + 'a>
    where
        I: IntoIterator<Item = O>,
        I::IntoIter: 'a,
        O: 'a,
        K: Fn(&O) -> Option<IndexKey> + 'a,
        S: Fn(Items<'a, T>, &O) -> R + 'a,
    {
        let index = self.find_index(field, false)?;
        Ok(outer.into_iter().map(move |o| {
            let key = outer_key(&o);
            let inner: Items<'a, T> = Box::new(index.filter(key.as_ref()));
            result(inner, &o)
        }))
    }

    /// Keyed items in ascending `field` order; absent keys are left out
    pub fn order_by(&self, field: &str) -> CollectionResult<Items<'_, T>> {
        let index = self.find_ordered(field)?;
        Ok(Box::new(index.iter()))
    }

    /// Keyed items in descending `field` order, the exact reverse of `order_by`
    pub fn order_by_descending(&self, field: &str) -> CollectionResult<Items<'_, T>> {
        let index = self.find_ordered(field)?;
        Ok(Box::new(index.iter_desc()))
    }

    /// Largest key of `field`
    pub fn max(&self, field: &str) -> CollectionResult<IndexKey> {
        Ok(self.find_ordered(field)?.max()?.clone())
    }

    /// Smallest key of `field`
    pub fn min(&self, field: &str) -> CollectionResult<IndexKey> {
        Ok(self.find_ordered(field)?.min()?.clone())
    }

    /// Every item holding the largest key of `field`
    pub fn having_max(&self, field: &str) -> CollectionResult<Items<'_, T>> {
        let index = self.find_ordered(field)?;
        index.max()?;
        Ok(Box::new(index.having_max()))
    }

    /// Every item holding the smallest key of `field`
    pub fn having_min(&self, field: &str) -> CollectionResult<Items<'_, T>> {
        let index = self.find_ordered(field)?;
        index.min()?;
        Ok(Box::new(index.having_min()))
    }

    fn find_index(&self, field: &str, ordered: bool) -> CollectionResult<&SecondaryIndex<T>> {
        self.metadata
            .find(field, ordered)
            .map(|(slot, _)| &self.slots[slot].index)
            .ok_or_else(|| PlannerError::no_index_for_field(field, ordered).into())
    }

    fn find_ordered(&self, field: &str) -> CollectionResult<&OrderedIndex<T>> {
        self.find_index(field, true)?
            .as_ordered()
            .ok_or_else(|| PlannerError::no_index_for_field(field, true).into())
    }

    // ---------------------------------------------------------------------
    // Collection surface
    // ---------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether this exact allocation is tracked
    pub fn contains(&self, item: &Arc<T>) -> bool {
        self.items.contains_key(&ItemRef::new(Arc::clone(item)))
    }

    /// Every tracked item, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> + '_ {
        self.items.keys().map(ItemRef::as_arc)
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Adds `item`, or re-indexes it if already tracked
    pub fn add(&mut self, item: Arc<T>) {
        self.add_or_update(ItemRef::new(item));
    }

    /// Re-indexes `item` after its indexed fields changed; adds it if untracked
    pub fn update(&mut self, item: &Arc<T>) {
        self.add_or_update(ItemRef::new(Arc::clone(item)));
    }

    fn add_or_update(&mut self, item: ItemRef<T>) {
        if let Some(snapshot) = self.items.get_mut(&item) {
            let mut moves = 0;
            for (slot, last) in self.slots.iter_mut().zip(snapshot.iter_mut()) {
                let current = slot.extractor.extract(item.as_arc());
                if current != *last {
                    slot.index.remove(last.as_ref(), &item);
                    slot.index.add(current.clone(), item.clone());
                    *last = current;
                    moves += 1;
                }
            }
            if self.config.metrics_enabled {
                self.metrics.increment_items_updated();
                for _ in 0..moves {
                    self.metrics.increment_index_key_moves();
                }
            }
            return;
        }

        let mut snapshot = Vec::with_capacity(self.slots.len());
        for slot in &mut self.slots {
            let key = slot.extractor.extract(item.as_arc());
            slot.index.add(key.clone(), item.clone());
            snapshot.push(key);
        }
        if let Some(subscriber) = self.subscriber.as_mut() {
            subscriber.attach(item.as_arc());
        }
        self.items.insert(item, snapshot);
        if self.config.metrics_enabled {
            self.metrics.increment_items_added();
        }
    }

    /// Removes `item` from the collection and every index.
    ///
    /// Returns false if this allocation was not tracked.
    pub fn remove(&mut self, item: &Arc<T>) -> bool {
        let key = ItemRef::new(Arc::clone(item));
        let Some((item, snapshot)) = self.items.remove_entry(&key) else {
            return false;
        };

        for (slot, last) in self.slots.iter_mut().zip(snapshot.iter()) {
            slot.index.remove(last.as_ref(), &item);
        }
        if let Some(subscriber) = self.subscriber.as_mut() {
            subscriber.detach(item.as_arc());
        }
        if self.config.metrics_enabled {
            self.metrics.add_items_removed(1);
        }
        true
    }

    /// Removes every item; registered indexes stay, empty
    pub fn clear(&mut self) {
        let count = self.items.len();
        for slot in &mut self.slots {
            slot.index.clear();
        }
        if let Some(subscriber) = self.subscriber.as_mut() {
            for item in self.items.keys() {
                subscriber.detach(item.as_arc());
            }
        }
        self.items.clear();

        if self.config.metrics_enabled {
            self.metrics.add_items_removed(count as u64);
        }
        let count = count.to_string();
        self.emit(Event::CollectionCleared, &[("items", count.as_str())]);
    }

    // ---------------------------------------------------------------------
    // Change notifications
    // ---------------------------------------------------------------------

    /// Re-indexes `item` in every index on `field` after that field changed.
    ///
    /// Ignored (and logged) when the item is untracked or no index covers `field`.
    pub fn on_item_changed(&mut self, item: &Arc<T>, field: &str) {
        let key = ItemRef::new(Arc::clone(item));
        let covered = self.metadata.is_indexed(field);
        if !covered || !self.items.contains_key(&key) {
            let reason = if covered { "untracked item" } else { "unindexed field" };
            self.emit(Event::ItemChangeIgnored, &[("field", field), ("reason", reason)]);
            return;
        }
        let Some(snapshot) = self.items.get_mut(&key) else {
            return;
        };

        let mut moves = 0;
        for (slot, last) in self.slots.iter_mut().zip(snapshot.iter_mut()) {
            if slot.extractor.field().as_str() != field {
                continue;
            }
            let current = slot.extractor.extract(item);
            if current != *last {
                slot.index.remove(last.as_ref(), &key);
                slot.index.add(current.clone(), key.clone());
                *last = current;
                moves += 1;
            }
        }
        if self.config.metrics_enabled {
            for _ in 0..moves {
                self.metrics.increment_index_key_moves();
            }
        }
    }

    /// Adds every item of a batch that joined the source
    pub fn on_items_added(&mut self, items: impl IntoIterator<Item = Arc<T>>) {
        for item in items {
            self.add(item);
        }
    }

    /// Removes every item of a batch that left the source
    pub fn on_items_removed<B: Borrow<Arc<T>>>(&mut self, items: impl IntoIterator<Item = B>) {
        for item in items {
            self.remove(item.borrow());
        }
    }

    /// Applies a replacement in the source: old items leave, then new items join
    pub fn on_items_replaced<B: Borrow<Arc<T>>>(
        &mut self,
        old: impl IntoIterator<Item = B>,
        new: impl IntoIterator<Item = Arc<T>>,
    ) {
        self.on_items_removed(old);
        self.on_items_added(new);
    }

    /// Rebuilds from the source's full contents after a reset
    pub fn on_reset(&mut self, items: impl IntoIterator<Item = Arc<T>>) {
        self.clear();
        self.on_items_added(items);
        let count = self.items.len().to_string();
        self.emit(Event::CollectionReset, &[("items", count.as_str())]);
    }

    // ---------------------------------------------------------------------
    // Observability
    // ---------------------------------------------------------------------

    fn logs(&self, event: Event) -> bool {
        self.config.log_events && Logger::enabled(event.severity())
    }

    fn emit(&self, event: Event, fields: &[(&str, &str)]) {
        if self.logs(event) {
            log_event_with_fields(event, fields);
        }
    }
}

impl<T> Default for IndexedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Arc<T>> for IndexedCollection<T> {
    fn from_iter<I: IntoIterator<Item = Arc<T>>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

impl<T> Extend<Arc<T>> for IndexedCollection<T> {
    fn extend<I: IntoIterator<Item = Arc<T>>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T> fmt::Debug for IndexedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indexes: Vec<_> = self
            .metadata
            .descriptors()
            .iter()
            .map(|d| format!("{}:{}", d.field, d.kind.as_str()))
            .collect();
        f.debug_struct("IndexedCollection")
            .field("len", &self.items.len())
            .field("indexes", &indexes)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{BucketState, SMALL_BUCKET_LIMIT};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    struct Person {
        id: u32,
        name: Mutex<String>,
        age: AtomicI64,
    }

    impl Person {
        fn new(id: u32, name: &str, age: i64) -> Arc<Self> {
            Arc::new(Self {
                id,
                name: Mutex::new(name.to_string()),
                age: AtomicI64::new(age),
            })
        }

        fn age(&self) -> i64 {
            self.age.load(Ordering::SeqCst)
        }
    }

    fn people() -> (IndexedCollection<Person>, Vec<Arc<Person>>) {
        let items = vec![
            Person::new(1, "John", 20),
            Person::new(2, "Fred", 30),
            Person::new(3, "Alice", 20),
        ];
        let mut c = IndexedCollection::with_config(CollectionConfig::quiet());
        c.extend(items.iter().cloned());
        c.index_by("age", |p: &Person| Some(IndexKey::from(p.age())), true)
            .unwrap()
            .index_by("name", |p: &Person| p.name.lock().ok().map(|n| IndexKey::from(n.as_str())), false)
            .unwrap();
        (c, items)
    }

    fn ids<'a>(items: impl Iterator<Item = &'a Arc<Person>>) -> HashSet<u32> {
        items.map(|p| p.id).collect()
    }

    #[test]
    fn test_backfill_on_late_registration() {
        let (c, _) = people();
        assert_eq!(c.len(), 3);
        assert_eq!(ids(c.filter(&Predicate::eq("age", 20)).unwrap()), HashSet::from([1, 3]));
        assert_eq!(ids(c.filter(&Predicate::eq("name", "Fred")).unwrap()), HashSet::from([2]));
    }

    #[test]
    fn test_update_moves_changed_key_only() {
        let (mut c, items) = people();
        items[0].age.store(30, Ordering::SeqCst);
        c.update(&items[0]);

        assert_eq!(ids(c.filter(&Predicate::eq("age", 20)).unwrap()), HashSet::from([3]));
        assert_eq!(ids(c.filter(&Predicate::eq("age", 30)).unwrap()), HashSet::from([1, 2]));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_metrics_count_key_moves() {
        let items = vec![Person::new(1, "John", 20)];
        let mut c: IndexedCollection<Person> = IndexedCollection::from_items(items.iter().cloned());
        c.index_by("age", |p: &Person| Some(IndexKey::from(p.age())), true).unwrap();
        c.index_by("name", |p: &Person| p.name.lock().ok().map(|n| IndexKey::from(n.as_str())), false)
            .unwrap();

        c.update(&items[0]);
        assert_eq!(c.metrics().index_key_moves, 0);

        items[0].age.store(21, Ordering::SeqCst);
        c.update(&items[0]);
        let m = c.metrics();
        assert_eq!(m.items_added, 1);
        assert_eq!(m.items_updated, 2);
        assert_eq!(m.index_key_moves, 1);
    }

    #[test]
    fn test_quiet_config_disables_metrics() {
        let (c, _) = people();
        assert_eq!(c.count(&Predicate::eq("age", 20)).unwrap(), 2);
        assert_eq!(c.metrics(), MetricsSnapshot::default());
    }

    #[test]
    fn test_remove_untracked_returns_false() {
        let (mut c, items) = people();
        assert!(!c.remove(&Person::new(1, "John", 20)));
        assert!(c.remove(&items[1]));
        assert!(!c.remove(&items[1]));
        assert!(!c.contains(&items[1]));
        assert_eq!(c.count(&Predicate::eq("age", 30)).unwrap(), 0);
    }

    #[test]
    fn test_on_item_changed_targets_field() {
        let (mut c, items) = people();
        *items[2].name.lock().unwrap() = "Alicia".to_string();
        items[2].age.store(99, Ordering::SeqCst);

        c.on_item_changed(&items[2], "name");
        assert_eq!(c.count(&Predicate::eq("name", "Alicia")).unwrap(), 1);
        // age was not reported, so the stale key is still indexed
        assert_eq!(c.count(&Predicate::eq("age", 20)).unwrap(), 2);

        c.on_item_changed(&items[2], "age");
        assert_eq!(c.count(&Predicate::eq("age", 99)).unwrap(), 1);
    }

    #[test]
    fn test_on_item_changed_ignores_unknown() {
        let (mut c, _) = people();
        let stranger = Person::new(9, "Zed", 50);
        c.on_item_changed(&stranger, "age");
        c.on_item_changed(&stranger, "height");
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_element_operators() {
        let (c, _) = people();
        assert_eq!(c.single(&Predicate::eq("name", "Fred")).unwrap().id, 2);
        assert!(matches!(
            c.single(&Predicate::eq("age", 20)),
            Err(CollectionError::MoreThanOneElement)
        ));
        assert!(matches!(c.first(&Predicate::eq("age", 77)), Err(CollectionError::NoElements)));
        assert!(c.first_or_default(&Predicate::eq("age", 77)).unwrap().is_none());
        assert!(c.single_or_default(&Predicate::eq("age", 77)).unwrap().is_none());
        assert_eq!(c.last(&Predicate::gte("age", 0)).unwrap().id, 2);
        assert!(c.any(&Predicate::lt("age", 25)).unwrap());
    }

    #[test]
    fn test_bucket_escalation_through_collection() {
        let mut c = IndexedCollection::with_config(CollectionConfig::quiet());
        c.index_by("age", |p: &Person| Some(IndexKey::from(p.age())), false).unwrap();
        let items: Vec<_> = (0..=SMALL_BUCKET_LIMIT as u32).map(|i| Person::new(i, "x", 7)).collect();
        c.extend(items.iter().cloned());

        let state = |c: &IndexedCollection<Person>| {
            c.slots[0].index.bucket(Some(&IndexKey::from(7))).map(|b| b.state())
        };
        assert_eq!(state(&c), Some(BucketState::Set));

        c.remove(&items[0]);
        assert_eq!(state(&c), Some(BucketState::List));
        assert_eq!(c.count(&Predicate::eq("age", 7)).unwrap(), SMALL_BUCKET_LIMIT);
    }

    #[test]
    fn test_debug_lists_indexes() {
        let (c, _) = people();
        let debug = format!("{:?}", c);
        assert!(debug.contains("age:ordered"));
        assert!(debug.contains("name:equality"));
    }
}
