//! Collection subsystem for multidex
//!
//! The public face of the crate: a set of shared items with any number of
//! secondary indexes, a predicate query surface answered from those indexes, and
//! the change-notification entry points that keep indexes current.
//!
//! # Design Principles
//!
//! - Every query is answered from an index; a predicate no index can serve is rejected
//! - Mutation is explicit: the collection never polls items for changes
//! - Index maintenance touches only keys that actually moved

#[allow(clippy::module_inception)]
mod collection;
mod config;
mod errors;
mod lookup;
mod notify;

pub use collection::IndexedCollection;
pub use config::CollectionConfig;
pub use errors::{CollectionError, CollectionResult};
pub use lookup::Lookup;
pub use notify::ItemSubscriber;
