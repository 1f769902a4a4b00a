//! Arbitrary-precision integers
//!
//! Two encodings of the same magnitude live side by side in the store:
//! - [`BigNumber`]: a bare JSON number (`"amount": 1000000000000000000`),
//!   used by version "0" records
//! - [`Link`]: a base-10 JSON string (`"amount": "1000000000000000000"`),
//!   used for monetary amounts from version "1536696950" on
//!
//! Converting between them copies the sign and magnitude; it never goes
//! through a float or a fixed-width integer.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::{json_type_name, DecodeError};

/// True for an optional sign followed by one or more ASCII digits
fn is_decimal_integer(text: &str) -> bool {
    let digits = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Monetary amount with a canonical base-10 text form
///
/// # Examples
///
/// ```
/// use nodestore_core::Link;
///
/// let link: Link = "12345".parse().unwrap();
/// assert_eq!(link.to_string(), "12345");
/// assert!("12a".parse::<Link>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Link(BigInt);

impl Link {
    /// Build from a sign and magnitude
    pub fn from_sign_magnitude(sign: Sign, magnitude: num_bigint::BigUint) -> Self {
        Link(BigInt::from_biguint(sign, magnitude))
    }

    /// Borrow the integer value
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Take the integer value
    pub fn into_bigint(self) -> BigInt {
        self.0
    }
}

impl From<BigInt> for Link {
    fn from(value: BigInt) -> Self {
        Link(value)
    }
}

impl From<u64> for Link {
    fn from(value: u64) -> Self {
        Link(BigInt::from(value))
    }
}

impl From<BigNumber> for Link {
    fn from(value: BigNumber) -> Self {
        let (sign, magnitude) = value.into_bigint().into_parts();
        Link::from_sign_magnitude(sign, magnitude)
    }
}

impl FromStr for Link {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecodeError::InvalidLink {
            input: s.to_string(),
        };
        if !is_decimal_integer(s) {
            return Err(invalid());
        }
        BigInt::parse_bytes(s.as_bytes(), 10)
            .map(Link)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

/// Big integer persisted as a bare JSON number
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BigNumber(BigInt);

impl BigNumber {
    /// Borrow the integer value
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Take the integer value
    pub fn into_bigint(self) -> BigInt {
        self.0
    }
}

impl From<BigInt> for BigNumber {
    fn from(value: BigInt) -> Self {
        BigNumber(value)
    }
}

impl From<u64> for BigNumber {
    fn from(value: u64) -> Self {
        BigNumber(BigInt::from(value))
    }
}

impl FromStr for BigNumber {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DecodeError::InvalidBigInt {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        if !is_decimal_integer(s) {
            return Err(invalid("not a base-10 integer"));
        }
        BigInt::parse_bytes(s.as_bytes(), 10)
            .map(BigNumber)
            .ok_or_else(|| invalid("not a base-10 integer"))
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for BigNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let number = Number::from_str(&self.0.to_string()).map_err(S::Error::custom)?;
        number.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n.to_string().parse().map_err(D::Error::custom),
            other => Err(D::Error::custom(DecodeError::UnexpectedType {
                expected: "number",
                found: json_type_name(&other),
            })),
        }
    }
}
