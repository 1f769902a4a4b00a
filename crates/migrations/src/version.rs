//! Schema version identifiers
//!
//! A version is named by a base-10 integer written as a string ("0",
//! "1536696950"). Versions order by numeric value, not by text.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MigrationError;

/// Identifier of one schema version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionId {
    text: String,
    value: u64,
}

impl VersionId {
    /// Parse a canonical base-10 identifier
    ///
    /// # Errors
    ///
    /// Rejects empty text, non-digits, leading zeros, and values beyond u64.
    pub fn parse(input: &str) -> Result<Self, MigrationError> {
        let invalid = || MigrationError::InvalidVersion {
            input: input.to_string(),
        };
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if input.len() > 1 && input.starts_with('0') {
            return Err(invalid());
        }
        let value = input.parse::<u64>().map_err(|_| invalid())?;
        Ok(VersionId {
            text: input.to_string(),
            value,
        })
    }

    /// Identifier text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Numeric value
    pub fn value(&self) -> u64 {
        self.value
    }
}

impl From<u64> for VersionId {
    fn from(value: u64) -> Self {
        VersionId {
            text: value.to_string(),
            value,
        }
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for VersionId {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionId::parse(s)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for VersionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for VersionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        VersionId::parse(&text).map_err(D::Error::custom)
    }
}
