//! Error types for the object-store adapter
//!
//! `StoreError` covers every failure the adapter can report: schema
//! initialization, reads, transaction begin/save/commit/rollback, and
//! record (de)serialization at the typed boundary.

use nodestore_core::DecodeError;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors reported by an object store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bucket was never initialized
    #[error("bucket not found: {bucket}")]
    BucketNotFound {
        /// Bucket name
        bucket: String,
    },

    /// Bucket exists with a different unique key
    #[error("schema conflict on bucket {bucket}: {reason}")]
    SchemaConflict {
        /// Bucket name
        bucket: String,
        /// What differs
        reason: String,
    },

    /// Lookup on a field the bucket does not index
    #[error("field {field} is not indexed in bucket {bucket}")]
    NotIndexed {
        /// Bucket name
        bucket: String,
        /// Field name
        field: String,
    },

    /// Write attempted through a read-only transaction
    #[error("transaction is read-only")]
    ReadOnlyTransaction,

    /// Another writable transaction is open
    #[error("a writable transaction is already open")]
    WriterBusy,

    /// Document handed to `save` is not a JSON object
    #[error("invalid document for bucket {bucket}: {reason}")]
    InvalidDocument {
        /// Bucket name
        bucket: String,
        /// Why the document was rejected
        reason: String,
    },

    /// Record could not be serialized for storage
    #[error("cannot encode {bucket} record: {source}")]
    Encode {
        /// Bucket name
        bucket: &'static str,
        /// Underlying serde failure
        #[source]
        source: serde_json::Error,
    },

    /// Stored document does not decode as the requested record type
    #[error("cannot decode {bucket} record: {source}")]
    Decode {
        /// Bucket name
        bucket: &'static str,
        /// Underlying decode failure
        #[source]
        source: DecodeError,
    },

    /// Failure inside the storage backend
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// True if the failure means the bucket holds nothing to read
    pub fn is_bucket_not_found(&self) -> bool {
        matches!(self, StoreError::BucketNotFound { .. })
    }

    /// True if stored documents exist but have a different shape
    pub fn is_decode(&self) -> bool {
        matches!(self, StoreError::Decode { .. })
    }
}
