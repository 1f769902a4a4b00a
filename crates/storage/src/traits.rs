//! Object-store adapter traits
//!
//! These traits are the whole contract the migration engine has with the
//! store. They work on raw JSON documents; the typed layer lives in
//! [`crate::record`].

use crate::error::Result;
use crate::schema::{RecordKey, Schema};

/// Embedded object store holding JSON documents in named buckets
///
/// Implementations must never expose writes of a transaction that was not
/// committed, including after a crash.
pub trait ObjectStore: Send + Sync {
    /// Create the bucket and its declared indexes if absent
    ///
    /// Idempotent. Adding indexes to an existing bucket is allowed; changing
    /// its unique key field is a schema conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket exists with a different key field or
    /// the backend fails.
    fn initialize_schema(&self, schema: &Schema) -> Result<()>;

    /// Load every committed document of a bucket, in key order
    ///
    /// # Errors
    ///
    /// Returns `StoreError::BucketNotFound` if the bucket was never
    /// initialized.
    fn read_all(&self, bucket: &str) -> Result<Vec<Vec<u8>>>;

    /// Open a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if a writable transaction is requested while
    /// another one is open, or the backend fails.
    fn begin(&self, writable: bool) -> Result<Box<dyn Transaction + '_>>;
}

/// Scoped, all-or-nothing unit of writes
///
/// Dropping a transaction without committing discards its writes.
pub trait Transaction {
    /// True if this transaction may write
    fn is_writable(&self) -> bool;

    /// Upsert one document under its unique key
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is read-only, the bucket does not
    /// exist, or the document is not a JSON object.
    fn save(&mut self, bucket: &str, key: RecordKey, document: Vec<u8>) -> Result<()>;

    /// Reserve the next auto-increment key of a bucket
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is read-only or the bucket does
    /// not exist.
    fn next_sequence(&mut self, bucket: &str) -> Result<u64>;

    /// Number of writes buffered so far
    fn pending_writes(&self) -> usize;

    /// Make every write of this transaction visible at once
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails; nothing becomes visible then.
    fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every write of this transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to release the transaction.
    fn rollback(self: Box<Self>) -> Result<()>;
}
