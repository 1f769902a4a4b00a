//! Opaque JSON documents
//!
//! This module defines the document primitive shared by every record that
//! carries caller-supplied data it does not interpret:
//! - [`Json`]: Newtype wrapper around `serde_json::Value` with key-order
//!   preserving merge
//! - [`Opaque`]: Decodes a set of known fields while retaining the whole
//!   input object, and merges it back on encode
//!
//! Objects keep their key order (`serde_json` is built with
//! `preserve_order`) and numbers keep their original text
//! (`arbitrary_precision`), so a document that passes through a decode and
//! encode cycle comes back with the same keys and the same values.

use std::fmt;

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{json_type_name, DecodeError};

/// Opaque JSON value
///
/// Wraps `serde_json::Value` so records can hold arbitrary caller data
/// without interpreting it.
///
/// # Examples
///
/// ```
/// use nodestore_core::Json;
///
/// let bag = Json::from_value(serde_json::json!({"url": "https://a.example", "times": 2}));
/// let named = Json::from_value(serde_json::json!({"times": 3}));
/// let merged = bag.merge(&named);
/// assert_eq!(merged.get("times"), Some(&serde_json::json!(3)));
/// assert_eq!(merged.get("url"), Some(&serde_json::json!("https://a.example")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Json(Value);

impl Json {
    /// Create a null JSON value
    pub fn null() -> Self {
        Json(Value::Null)
    }

    /// Create an empty JSON object
    pub fn object() -> Self {
        Json(Value::Object(Map::new()))
    }

    /// Create from a serde_json::Value
    pub fn from_value(value: Value) -> Self {
        Json(value)
    }

    /// Parse a JSON document from text
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        Ok(Json(serde_json::from_str(text)?))
    }

    /// Get the underlying serde_json::Value
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Get a reference to the underlying serde_json::Value
    pub fn as_inner(&self) -> &Value {
        &self.0
    }

    /// True if this is JSON `null`
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Look up a top-level key of an object document
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|map| map.get(key))
    }

    /// Merge `other` into a copy of this document
    ///
    /// Keys present in both take `other`'s value but keep their position in
    /// `self`; keys only in `other` are appended in `other`'s order. A
    /// non-object operand contributes no keys, so the result is always an
    /// object.
    pub fn merge(&self, other: &Json) -> Json {
        let mut merged = match &self.0 {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        if let Value::Object(overrides) = &other.0 {
            for (key, value) in overrides {
                merged.insert(key.clone(), value.clone());
            }
        }
        Json(Value::Object(merged))
    }
}

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        Json(value)
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Known fields plus the verbatim object they were decoded from
///
/// Decoding reads `T` out of the input object and keeps the entire object as
/// [`Opaque::rest`]. Encoding serializes `T`, then merges it over `rest`:
/// named fields win on conflict and every other original key survives.
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque<T> {
    /// Fields this schema understands
    pub known: T,
    /// Entire original input object
    pub rest: Json,
}

impl<T> Opaque<T> {
    /// Pair known fields with an opaque bag
    pub fn new(known: T, rest: Json) -> Self {
        Self { known, rest }
    }
}

impl<T: DeserializeOwned> Opaque<T> {
    /// Decode known fields from an object, retaining the object itself
    pub fn decode(value: Value) -> Result<Self, DecodeError> {
        if !value.is_object() {
            return Err(DecodeError::UnexpectedType {
                expected: "object",
                found: json_type_name(&value),
            });
        }
        let known = T::deserialize(&value)?;
        Ok(Self {
            known,
            rest: Json(value),
        })
    }
}

impl<T: Serialize> Opaque<T> {
    /// Encode known fields merged over the opaque bag
    pub fn encode(&self) -> Result<Json, DecodeError> {
        let named = Json(serde_json::to_value(&self.known)?);
        Ok(self.rest.merge(&named))
    }
}

impl<T: Serialize> Serialize for Opaque<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Opaque<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Opaque::decode(value).map_err(D::Error::custom)
    }
}

/// Deserialize `null` as the type's default
///
/// For collections persisted as `null` when empty. Use with
/// `#[serde(default, deserialize_with = "null_as_default")]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
