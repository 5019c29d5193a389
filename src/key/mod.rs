//! Key subsystem for multidex
//!
//! Everything an index needs to know about keys: the dynamic key value, how keys
//! collate, and the extractor that derives a key from an item.
//!
//! # Invariants
//!
//! - Extractors are pure: the same item state always yields the same key
//! - An absent key (`None`) is a distinguished value, never hashed or ordered
//! - Field identifiers are simple field names, validated at construction

mod errors;
mod extractor;
mod index_key;

pub use errors::{KeyError, KeyErrorCode, KeyResult};
pub use extractor::{FieldId, KeyExtractor};
pub use index_key::{Collation, IndexKey};
