//! Typed records on top of the document store
//!
//! A [`Record`] is a serde type with a declared [`Schema`]. The helpers
//! here encode and decode records at the store boundary so callers never
//! touch raw documents.

use nodestore_core::DecodeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::schema::{KeyKind, RecordKey, Schema};
use crate::traits::{ObjectStore, Transaction};

/// A persisted record type
pub trait Record: Serialize + DeserializeOwned {
    /// Storage layout of this record type
    const SCHEMA: Schema;

    /// Current unique key
    fn key(&self) -> RecordKey;

    /// Store an assigned auto-increment key
    ///
    /// Only called for [`KeyKind::Increment`] schemas while the key is
    /// unassigned.
    fn set_sequence(&mut self, _id: u64) {}
}

/// Create the record type's bucket and indexes if absent
pub fn initialize<R: Record>(store: &dyn ObjectStore) -> Result<()> {
    debug!(bucket = R::SCHEMA.bucket, "Initializing schema");
    store.initialize_schema(&R::SCHEMA)
}

/// Load and decode every record of a type
///
/// # Errors
///
/// `StoreError::BucketNotFound` if the bucket does not exist, or
/// `StoreError::Decode` for the first document that does not decode as `R`.
pub fn read_all<R: Record>(store: &dyn ObjectStore) -> Result<Vec<R>> {
    let bucket = R::SCHEMA.bucket;
    store
        .read_all(bucket)?
        .iter()
        .map(|document| decode::<R>(document))
        .collect()
}

/// Decode one stored document as `R`
pub fn decode<R: Record>(document: &[u8]) -> Result<R> {
    let bucket = R::SCHEMA.bucket;
    serde_json::from_slice(document).map_err(|e| StoreError::Decode {
        bucket,
        source: DecodeError::record(bucket, e),
    })
}

/// Encode and upsert one record
///
/// Assigns the next sequence first if the schema auto-increments and the
/// key is unassigned.
pub fn save<R: Record>(txn: &mut dyn Transaction, record: &mut R) -> Result<()> {
    let schema = R::SCHEMA;
    if schema.key_kind == KeyKind::Increment && record.key().is_unassigned() {
        let id = txn.next_sequence(schema.bucket)?;
        record.set_sequence(id);
    }
    let document = serde_json::to_vec(record).map_err(|source| StoreError::Encode {
        bucket: schema.bucket,
        source,
    })?;
    txn.save(schema.bucket, record.key(), document)
}
