//! Error types for value decoding
//!
//! Every codec in this crate reports failures through [`DecodeError`].
//! Decoding never silently defaults: a value that matches no accepted
//! shape is always an error naming the rejected input.

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Failure to decode a persisted value or record
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input matched none of the accepted date/time formats
    #[error("cannot parse {input:?} as a timestamp")]
    InvalidTimestamp {
        /// Rejected text
        input: String,
    },

    /// Input is not an absolute, request-ready URL
    #[error("invalid web URL {input:?}: {reason}")]
    InvalidUrl {
        /// Rejected text
        input: String,
        /// Why the URL was rejected
        reason: String,
    },

    /// Input is not an optionally signed base-10 integer
    #[error("cannot unmarshal {input:?} into a Link")]
    InvalidLink {
        /// Rejected text
        input: String,
    },

    /// Input is not a valid integer in the expected encoding
    #[error("invalid big integer {input:?}: {reason}")]
    InvalidBigInt {
        /// Rejected text
        input: String,
        /// Why the integer was rejected
        reason: String,
    },

    /// Input is not valid hex of the expected length
    #[error("invalid hex {input:?}: {reason}")]
    InvalidHex {
        /// Rejected text
        input: String,
        /// Why the hex was rejected
        reason: String,
    },

    /// Input has the wrong JSON type for the target value
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        /// JSON type the codec accepts
        expected: &'static str,
        /// JSON type that was present
        found: &'static str,
    },

    /// A whole record failed to decode
    #[error("invalid {record} record: {source}")]
    InvalidRecord {
        /// Record type name
        record: &'static str,
        /// Underlying serde failure
        #[source]
        source: serde_json::Error,
    },

    /// Generic JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// Wrap a serde failure with the name of the record being decoded
    pub fn record(record: &'static str, source: serde_json::Error) -> Self {
        DecodeError::InvalidRecord { record, source }
    }
}

/// Name of a JSON value's type, for error messages
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
