//! MemoryStore: in-process object store with all-or-nothing transactions
//!
//! This module implements the [`ObjectStore`] contract using:
//! - `BTreeMap<String, Bucket>` for buckets, each a `BTreeMap<RecordKey, document>`
//! - `parking_lot::RwLock` for the committed state
//! - a `parking_lot::Mutex` so at most one writable transaction is open
//! - [`FieldIndex`] secondary indexes maintained on commit
//!
//! # Design Notes
//!
//! - **Buffered writes**: a transaction stages its writes and sequence
//!   reservations locally; nothing touches the committed state before commit
//! - **Atomic commit**: all staged writes are applied under one write-lock
//!   acquisition, so readers see either none or all of them
//! - **Implicit rollback**: dropping an uncommitted transaction discards it

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard, RwLock};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::index::FieldIndex;
use crate::schema::{RecordKey, Schema};
use crate::traits::{ObjectStore, Transaction};

/// Committed contents of one bucket
#[derive(Debug)]
struct Bucket {
    schema: Schema,
    records: BTreeMap<RecordKey, Vec<u8>>,
    sequence: u64,
    indexes: BTreeMap<&'static str, FieldIndex>,
}

impl Bucket {
    fn new(schema: Schema) -> Self {
        let indexes = schema
            .indexes
            .iter()
            .map(|field| (*field, FieldIndex::new()))
            .collect();
        Self {
            schema,
            records: BTreeMap::new(),
            sequence: 0,
            indexes,
        }
    }

    /// Add a secondary index, building it from existing records
    fn add_index(&mut self, field: &'static str) {
        let mut index = FieldIndex::new();
        for (key, document) in &self.records {
            if let Some(value) = field_value(document, field) {
                index.insert(&value, key.clone());
            }
        }
        self.indexes.insert(field, index);
    }

    /// Insert or replace a document, keeping indexes consistent
    fn upsert(&mut self, key: RecordKey, document: Vec<u8>) {
        if let Some(old) = self.records.get(&key) {
            for (field, index) in self.indexes.iter_mut() {
                if let Some(value) = field_value(old, field) {
                    index.remove(&value, &key);
                }
            }
        }
        for (field, index) in self.indexes.iter_mut() {
            if let Some(value) = field_value(&document, field) {
                index.insert(&value, key.clone());
            }
        }
        if let RecordKey::Int(n) = key {
            self.sequence = self.sequence.max(n);
        }
        self.records.insert(key, document);
    }
}

/// Value of a top-level field of a JSON object document
fn field_value(document: &[u8], field: &str) -> Option<Value> {
    match serde_json::from_slice::<Value>(document) {
        Ok(Value::Object(mut map)) => map.remove(field),
        _ => None,
    }
}

/// Commit/rollback counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Transactions committed
    pub commits: u64,
    /// Transactions explicitly rolled back
    pub rollbacks: u64,
    /// Documents written by committed transactions
    pub writes_applied: u64,
}

/// In-memory object store
///
/// Thread-safe through `parking_lot` locks; intended for a single owner
/// during startup migrations and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: RwLock<BTreeMap<String, Bucket>>,
    writer: Mutex<()>,
    commits: AtomicU64,
    rollbacks: AtomicU64,
    writes_applied: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all initialized buckets
    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets.read().keys().cloned().collect()
    }

    /// Number of committed documents in a bucket, if it exists
    pub fn len(&self, bucket: &str) -> Option<usize> {
        self.buckets.read().get(bucket).map(|b| b.records.len())
    }

    /// Committed document under a key
    pub fn get(&self, bucket: &str, key: &RecordKey) -> Option<Vec<u8>> {
        self.buckets
            .read()
            .get(bucket)
            .and_then(|b| b.records.get(key).cloned())
    }

    /// Keys whose indexed field equals `value`
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist or does not index
    /// `field`.
    pub fn find_by_index(&self, bucket: &str, field: &str, value: &Value) -> Result<Vec<RecordKey>> {
        let buckets = self.buckets.read();
        let b = buckets.get(bucket).ok_or_else(|| StoreError::BucketNotFound {
            bucket: bucket.to_string(),
        })?;
        let index = b.indexes.get(field).ok_or_else(|| StoreError::NotIndexed {
            bucket: bucket.to_string(),
            field: field.to_string(),
        })?;
        Ok(index.get(value))
    }

    /// Deep copy of all committed documents
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<RecordKey, Vec<u8>>> {
        self.buckets
            .read()
            .iter()
            .map(|(name, b)| (name.clone(), b.records.clone()))
            .collect()
    }

    /// Commit/rollback counters since creation
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            commits: self.commits.load(Ordering::SeqCst),
            rollbacks: self.rollbacks.load(Ordering::SeqCst),
            writes_applied: self.writes_applied.load(Ordering::SeqCst),
        }
    }

    fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets.read().contains_key(bucket)
    }

    fn committed_sequence(&self, bucket: &str) -> Option<u64> {
        self.buckets.read().get(bucket).map(|b| b.sequence)
    }
}

impl ObjectStore for MemoryStore {
    fn initialize_schema(&self, schema: &Schema) -> Result<()> {
        let mut buckets = self.buckets.write();
        match buckets.get_mut(schema.bucket) {
            None => {
                debug!(bucket = schema.bucket, "Creating bucket");
                buckets.insert(schema.bucket.to_string(), Bucket::new(*schema));
            }
            Some(existing) => {
                if existing.schema.key_field != schema.key_field {
                    return Err(StoreError::SchemaConflict {
                        bucket: schema.bucket.to_string(),
                        reason: format!(
                            "key field is {}, requested {}",
                            existing.schema.key_field, schema.key_field
                        ),
                    });
                }
                for field in schema.indexes {
                    if !existing.indexes.contains_key(field) {
                        debug!(bucket = schema.bucket, field = *field, "Adding index");
                        existing.add_index(field);
                    }
                }
            }
        }
        Ok(())
    }

    fn read_all(&self, bucket: &str) -> Result<Vec<Vec<u8>>> {
        let buckets = self.buckets.read();
        let b = buckets.get(bucket).ok_or_else(|| StoreError::BucketNotFound {
            bucket: bucket.to_string(),
        })?;
        Ok(b.records.values().cloned().collect())
    }

    fn begin(&self, writable: bool) -> Result<Box<dyn Transaction + '_>> {
        let writer = if writable {
            Some(self.writer.try_lock().ok_or(StoreError::WriterBusy)?)
        } else {
            None
        };
        Ok(Box::new(MemoryTransaction {
            store: self,
            _writer: writer,
            writes: Vec::new(),
            sequences: HashMap::new(),
        }))
    }
}

/// Transaction over a [`MemoryStore`]
///
/// Writes are staged in insertion order; a later write to the same key
/// replaces an earlier one at commit.
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    _writer: Option<MutexGuard<'a, ()>>,
    writes: Vec<(String, RecordKey, Vec<u8>)>,
    sequences: HashMap<String, u64>,
}

impl MemoryTransaction<'_> {
    fn require_writable(&self) -> Result<()> {
        if self._writer.is_some() {
            Ok(())
        } else {
            Err(StoreError::ReadOnlyTransaction)
        }
    }

    fn require_bucket(&self, bucket: &str) -> Result<()> {
        if self.store.bucket_exists(bucket) {
            Ok(())
        } else {
            Err(StoreError::BucketNotFound {
                bucket: bucket.to_string(),
            })
        }
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn is_writable(&self) -> bool {
        self._writer.is_some()
    }

    fn save(&mut self, bucket: &str, key: RecordKey, document: Vec<u8>) -> Result<()> {
        self.require_writable()?;
        self.require_bucket(bucket)?;
        match serde_json::from_slice::<Value>(&document) {
            Ok(Value::Object(_)) => {}
            Ok(_) => {
                return Err(StoreError::InvalidDocument {
                    bucket: bucket.to_string(),
                    reason: "document is not a JSON object".to_string(),
                })
            }
            Err(e) => {
                return Err(StoreError::InvalidDocument {
                    bucket: bucket.to_string(),
                    reason: e.to_string(),
                })
            }
        }
        self.writes.push((bucket.to_string(), key, document));
        Ok(())
    }

    fn next_sequence(&mut self, bucket: &str) -> Result<u64> {
        self.require_writable()?;
        let committed = self
            .store
            .committed_sequence(bucket)
            .ok_or_else(|| StoreError::BucketNotFound {
                bucket: bucket.to_string(),
            })?;
        let next = self.sequences.get(bucket).copied().unwrap_or(committed) + 1;
        self.sequences.insert(bucket.to_string(), next);
        Ok(next)
    }

    fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let store = self.store;
        let mut buckets = store.buckets.write();

        // Validate before applying anything
        for (bucket, _, _) in &self.writes {
            if !buckets.contains_key(bucket) {
                return Err(StoreError::BucketNotFound {
                    bucket: bucket.clone(),
                });
            }
        }

        let applied = self.writes.len() as u64;
        for (bucket, key, document) in self.writes {
            if let Some(b) = buckets.get_mut(&bucket) {
                b.upsert(key, document);
            }
        }
        for (bucket, sequence) in self.sequences {
            if let Some(b) = buckets.get_mut(&bucket) {
                b.sequence = b.sequence.max(sequence);
            }
        }
        drop(buckets);

        store.commits.fetch_add(1, Ordering::SeqCst);
        store.writes_applied.fetch_add(applied, Ordering::SeqCst);
        debug!(writes = applied, "Transaction committed");
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        self.store.rollbacks.fetch_add(1, Ordering::SeqCst);
        debug!(discarded = self.writes.len(), "Transaction rolled back");
        Ok(())
    }
}
