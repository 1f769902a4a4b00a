//! Absolute, request-ready URLs

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::DecodeError;

/// Endpoint URL with a required scheme and host
///
/// Relative references and scheme-only strings such as `not-a-url` or
/// `mailto:x` are rejected on decode. The text is kept exactly as written
/// and is what gets encoded; the parsed form only backs the accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WebUrl {
    raw: String,
    url: Url,
}

impl WebUrl {
    /// Parse and validate an absolute URL
    pub fn parse(input: &str) -> Result<Self, DecodeError> {
        let invalid = |reason: String| DecodeError::InvalidUrl {
            input: input.to_string(),
            reason,
        };
        let url = Url::parse(input).map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() || !url.has_host() {
            return Err(invalid("URL has no host".to_string()));
        }
        Ok(WebUrl {
            raw: input.to_string(),
            url,
        })
    }

    /// Text as originally written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Borrow the parsed URL
    ///
    /// Its host is lower-cased and an empty path reads as `/`.
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// URL scheme, e.g. `https`
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Normalized host, e.g. `example.com`
    pub fn host_str(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Path component, e.g. `/hook`
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl FromStr for WebUrl {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WebUrl::parse(s)
    }
}

impl fmt::Display for WebUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for WebUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for WebUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        WebUrl::parse(&text).map_err(D::Error::custom)
    }
}
