//! Observability events for multidex
//!
//! Events are explicit and typed. Each carries the severity it is logged at.

use std::fmt;

use super::logger::Severity;

/// Observable events in an indexed collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Index lifecycle
    /// Index registered on a field
    IndexRegistered,
    /// Late-registered index filled from existing items
    IndexBackfilled,

    // Query operations
    /// Predicate translated into a plan
    QueryPlanned,
    /// Predicate rejected by the planner or executor
    QueryRejected,

    // Collection lifecycle
    /// All items and index entries dropped
    CollectionCleared,
    /// Collection rebuilt from a reset notification
    CollectionReset,

    // Notifications
    /// Change notification for an untracked item or unindexed field
    ItemChangeIgnored,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::IndexRegistered => "INDEX_REGISTERED",
            Event::IndexBackfilled => "INDEX_BACKFILLED",
            Event::QueryPlanned => "QUERY_PLANNED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::CollectionCleared => "COLLECTION_CLEARED",
            Event::CollectionReset => "COLLECTION_RESET",
            Event::ItemChangeIgnored => "ITEM_CHANGE_IGNORED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryPlanned => Severity::Trace,
            Event::ItemChangeIgnored => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::IndexRegistered,
            Event::IndexBackfilled,
            Event::QueryPlanned,
            Event::QueryRejected,
            Event::CollectionCleared,
            Event::CollectionReset,
            Event::ItemChangeIgnored,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::QueryPlanned.severity(), Severity::Trace);
        assert_eq!(Event::QueryRejected.severity(), Severity::Info);
        assert_eq!(Event::ItemChangeIgnored.severity(), Severity::Warn);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::IndexRegistered), "INDEX_REGISTERED");
        assert_eq!(format!("{}", Event::CollectionReset), "COLLECTION_RESET");
    }
}
