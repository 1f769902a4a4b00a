//! Declared storage layout of a record type
//!
//! Each record type names its bucket, its unique key field, how that key
//! is assigned, and the secondary fields to index. Field names are the
//! JSON keys of the persisted document.

use std::fmt;

/// How a record's unique key is assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Caller supplies the key (string id, email, content hash)
    Unique,
    /// Store assigns the next bucket sequence when the key is zero
    Increment,
}

/// Storage layout of one record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Bucket name; shared by every version of the record type
    pub bucket: &'static str,
    /// JSON field holding the unique key
    pub key_field: &'static str,
    /// Key assignment
    pub key_kind: KeyKind,
    /// JSON fields with secondary indexes
    pub indexes: &'static [&'static str],
}

impl Schema {
    /// Layout with a caller-supplied unique key
    pub const fn unique(
        bucket: &'static str,
        key_field: &'static str,
        indexes: &'static [&'static str],
    ) -> Self {
        Schema {
            bucket,
            key_field,
            key_kind: KeyKind::Unique,
            indexes,
        }
    }

    /// Layout with a store-assigned integer key
    pub const fn increment(
        bucket: &'static str,
        key_field: &'static str,
        indexes: &'static [&'static str],
    ) -> Self {
        Schema {
            bucket,
            key_field,
            key_kind: KeyKind::Increment,
            indexes,
        }
    }
}

/// Unique key of a stored record
///
/// Integer keys sort before string keys; within a kind keys sort naturally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKey {
    /// Auto-increment or numeric key
    Int(u64),
    /// String id, email, or hex-encoded hash
    Str(String),
}

impl RecordKey {
    /// True for the unassigned integer key
    pub fn is_unassigned(&self) -> bool {
        matches!(self, RecordKey::Int(0))
    }
}

impl From<u64> for RecordKey {
    fn from(value: u64) -> Self {
        RecordKey::Int(value)
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        RecordKey::Str(value)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        RecordKey::Str(value.to_string())
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Int(n) => write!(f, "{}", n),
            RecordKey::Str(s) => f.write_str(s),
        }
    }
}
