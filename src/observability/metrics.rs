//! Metrics registry for multidex
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - One registry per collection, reset only when the collection is created
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing all operational counters
///
/// All counters use Relaxed atomics; a snapshot is exact once the collection is
/// no longer being mutated.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Items that entered the collection
    items_added: AtomicU64,
    /// Updates of already-tracked items
    items_updated: AtomicU64,
    /// Items that left the collection
    items_removed: AtomicU64,
    /// Remove-old/add-new deltas applied to an index
    index_key_moves: AtomicU64,
    /// Successfully planned queries
    queries_executed: AtomicU64,
    /// Rejected queries
    queries_rejected: AtomicU64,
    /// Comparison pairs answered by a single range
    ranges_fused: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Item metrics

    pub fn increment_items_added(&self) {
        self.items_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_items_updated(&self) {
        self.items_updated.fetch_add(1, Ordering::Relaxed);
    }

    /// Add `count` removed items (clear removes many at once)
    pub fn add_items_removed(&self, count: u64) {
        self.items_removed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_index_key_moves(&self) {
        self.index_key_moves.fetch_add(1, Ordering::Relaxed);
    }

    // Query metrics

    /// Increment queries executed
    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment queries rejected
    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_ranges_fused(&self, count: u64) {
        self.ranges_fused.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_added: self.items_added.load(Ordering::Relaxed),
            items_updated: self.items_updated.load(Ordering::Relaxed),
            items_removed: self.items_removed.load(Ordering::Relaxed),
            index_key_moves: self.index_key_moves.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            ranges_fused: self.ranges_fused.load(Ordering::Relaxed),
        }
    }

    /// Get current snapshot of all metrics as JSON
    pub fn to_json(&self) -> String {
        self.snapshot().to_json()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub items_added: u64,
    pub items_updated: u64,
    pub items_removed: u64,
    pub index_key_moves: u64,
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub ranges_fused: u64,
}

impl MetricsSnapshot {
    /// Serializes the snapshot as one JSON object, fields in declaration order
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_items_added();
        registry.increment_items_added();
        registry.increment_items_updated();
        registry.add_items_removed(3);
        registry.increment_index_key_moves();
        registry.increment_queries_executed();
        registry.increment_queries_rejected();
        registry.add_ranges_fused(2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.items_added, 2);
        assert_eq!(snapshot.items_updated, 1);
        assert_eq!(snapshot.items_removed, 3);
        assert_eq!(snapshot.index_key_moves, 1);
        assert_eq!(snapshot.queries_executed, 1);
        assert_eq!(snapshot.queries_rejected, 1);
        assert_eq!(snapshot.ranges_fused, 2);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_items_added();
        registry.increment_queries_executed();

        let json = registry.to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["items_added"], 1);
        assert_eq!(parsed["queries_executed"], 1);
        assert_eq!(parsed["ranges_fused"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_items_added();
                    reg.increment_queries_executed();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.items_added, 1000);
        assert_eq!(snapshot.queries_executed, 1000);
    }

    #[test]
    fn test_monotonic_increase() {
        let registry = MetricsRegistry::new();

        let mut prev = registry.snapshot().index_key_moves;
        for _ in 0..10 {
            registry.increment_index_key_moves();
            let current = registry.snapshot().index_key_moves;
            assert!(current > prev);
            prev = current;
        }
    }
}
