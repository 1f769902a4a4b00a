//! Secondary indexes over document fields
//!
//! A [`FieldIndex`] maps the JSON encoding of one field's value to the set
//! of record keys holding it, so lookups by an indexed field are
//! O(matches) instead of O(bucket).

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::schema::RecordKey;

/// Secondary index: encoded field value → keys
#[derive(Debug, Default, Clone)]
pub struct FieldIndex {
    index: HashMap<String, BTreeSet<RecordKey>>,
}

impl FieldIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
        }
    }

    /// Index key for a field value
    ///
    /// Values compare by their compact JSON text, so `"7"` and `7` are
    /// distinct entries.
    pub fn encode(value: &Value) -> String {
        value.to_string()
    }

    /// Add key under a field value
    pub fn insert(&mut self, value: &Value, key: RecordKey) {
        self.index.entry(Self::encode(value)).or_default().insert(key);
    }

    /// Remove key from a field value's set
    ///
    /// Drops the entry when its set becomes empty.
    pub fn remove(&mut self, value: &Value, key: &RecordKey) {
        let encoded = Self::encode(value);
        if let Some(keys) = self.index.get_mut(&encoded) {
            keys.remove(key);
            if keys.is_empty() {
                self.index.remove(&encoded);
            }
        }
    }

    /// Keys holding a field value, in key order
    pub fn get(&self, value: &Value) -> Vec<RecordKey> {
        self.index
            .get(&Self::encode(value))
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct indexed values
    pub fn len(&self) -> usize {
        self.index.len()
    }
}
