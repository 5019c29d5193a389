//! Observability subsystem for multidex
//!
//! Provides:
//! - Structured logging (JSON lines)
//! - Per-collection counters
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on collection state
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```
//! use multidex::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, Severity};
//!
//! Logger::set_min_severity(Severity::Info);
//! log_event_with_fields(Event::IndexRegistered, &[("field", "age")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//! assert_eq!(metrics.snapshot().queries_executed, 1);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
