//! Object-store adapter for nodestore
//!
//! This crate defines the contract the migration engine has with the
//! embedded document store, plus an in-memory backend:
//! - `ObjectStore` / `Transaction`: bucket schemas, reads, all-or-nothing writes
//! - `Schema`, `RecordKey`: declared bucket layout and unique keys
//! - `Record`: typed (de)serialization at the store boundary
//! - `MemoryStore`: BTreeMap-based backend with RwLock and secondary indexes
//! - `testing::FaultyStore`: failure injection for atomicity tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod index;
pub mod memory;
pub mod record;
pub mod schema;
pub mod testing;
pub mod traits;

pub use error::{Result, StoreError};
pub use index::FieldIndex;
pub use memory::{MemoryStore, MemoryTransaction, StoreStats};
pub use record::Record;
pub use schema::{KeyKind, RecordKey, Schema};
pub use traits::{ObjectStore, Transaction};
