//! multidex - An in-process collection with multiple secondary indexes
//!
//! Items are shared (`Arc<T>`) and tracked by identity. Each index derives a key
//! from an item and answers equality lookups, or with ordering also ranges,
//! prefixes, extremes and sorted iteration. Predicates are planned against the
//! registered indexes and executed lazily.
//!
//! ```
//! use std::sync::Arc;
//! use multidex::{IndexKey, IndexedCollection, Predicate};
//!
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! let mut people = IndexedCollection::new();
//! people.add(Arc::new(Person { name: "John".into(), age: 20 }));
//! people.add(Arc::new(Person { name: "Fred".into(), age: 30 }));
//! people
//!     .index_by("age", |p: &Person| Some(IndexKey::from(p.age)), true)
//!     .unwrap();
//!
//! let older = people.first(&Predicate::gt("age", 25)).unwrap();
//! assert_eq!(older.name, "Fred");
//! ```

pub mod collection;
pub mod executor;
pub mod index;
pub mod key;
pub mod observability;
pub mod planner;

pub use collection::{CollectionConfig, CollectionError, CollectionResult, IndexedCollection, ItemSubscriber, Lookup};
pub use index::{IndexKind, Items};
pub use key::{Collation, FieldId, IndexKey, KeyExtractor};
pub use planner::{ExplainPlan, Predicate};
