//! Ethereum scalar encodings
//!
//! Fixed-width hex values ([`Address`], [`Hash`]), `0x`-prefixed big
//! integers ([`HexBig`]), 65-byte signatures persisted as a JSON array of
//! byte values ([`Signature`]), and base64 byte payloads ([`Bytes`]).

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use serde::de::{self, Error as _, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DecodeError;

/// Decode `0x`-prefixed hex of exactly `N` bytes
fn decode_fixed_hex<const N: usize>(input: &str) -> Result<[u8; N], DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidHex {
        input: input.to_string(),
        reason,
    };
    let body = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or_else(|| invalid("missing 0x prefix".to_string()))?;
    if body.len() != N * 2 {
        return Err(invalid(format!(
            "expected {} hex digits, found {}",
            N * 2,
            body.len()
        )));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(body, &mut out).map_err(|e| invalid(e.to_string()))?;
    Ok(out)
}

macro_rules! fixed_hex_type {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Byte length
            pub const LEN: usize = $len;

            /// Wrap raw bytes
            pub fn from_bytes(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }

            /// Raw bytes
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// True if every byte is zero
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name([0u8; $len])
            }
        }

        impl FromStr for $name {
            type Err = DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_fixed_hex::<$len>(s).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(D::Error::custom)
            }
        }
    };
}

fixed_hex_type!(
    /// 20-byte account address, persisted as `0x` + 40 lowercase hex digits
    Address,
    20
);

fixed_hex_type!(
    /// 32-byte digest, persisted as `0x` + 64 lowercase hex digits
    Hash,
    32
);

/// Big integer persisted as `0x`-prefixed hex without leading zeros
///
/// Zero encodes as `0x0`; negative values carry a leading `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HexBig(BigInt);

impl HexBig {
    /// Borrow the integer value
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }
}

impl From<BigInt> for HexBig {
    fn from(value: BigInt) -> Self {
        HexBig(value)
    }
}

impl From<u64> for HexBig {
    fn from(value: u64) -> Self {
        HexBig(BigInt::from(value))
    }
}

impl FromStr for HexBig {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DecodeError::InvalidBigInt {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let (sign, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (Sign::Minus, rest),
            None => (Sign::Plus, s),
        };
        let body = unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
            .ok_or_else(|| invalid("missing 0x prefix"))?;
        if body.is_empty() {
            return Err(invalid("empty hex number"));
        }
        if body.len() > 1 && body.starts_with('0') {
            return Err(invalid("hex number with leading zero digits"));
        }
        if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("invalid hex digits"));
        }
        let magnitude = num_bigint::BigUint::parse_bytes(body.as_bytes(), 16)
            .ok_or_else(|| invalid("invalid hex digits"))?;
        Ok(HexBig(BigInt::from_biguint(sign, magnitude)))
    }
}

impl fmt::Display for HexBig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_zero() {
            return f.write_str("0x0");
        }
        let sign = if self.0.sign() == Sign::Minus { "-" } else { "" };
        write!(f, "{}0x{}", sign, self.0.magnitude().to_str_radix(16))
    }
}

impl Serialize for HexBig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexBig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

/// Length of a recoverable ECDSA signature
pub const SIGNATURE_LENGTH: usize = 65;

/// 65-byte signature, persisted as a JSON array of 65 byte values
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Wrap raw bytes
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Signature(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature([0u8; SIGNATURE_LENGTH])
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{})", hex::encode(self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SignatureVisitor;

        impl<'de> Visitor<'de> for SignatureVisitor {
            type Value = Signature;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an array of {SIGNATURE_LENGTH} bytes")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Signature, A::Error> {
                let mut bytes = [0u8; SIGNATURE_LENGTH];
                for (i, slot) in bytes.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                }
                if seq.next_element::<u8>()?.is_some() {
                    return Err(de::Error::invalid_length(SIGNATURE_LENGTH + 1, &self));
                }
                Ok(Signature(bytes))
            }
        }

        deserializer.deserialize_seq(SignatureVisitor)
    }
}

/// Byte payload persisted as standard base64 text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Raw bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Bytes(value)
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map(Bytes)
            .map_err(|e| D::Error::custom(format!("invalid base64 {text:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_round_trip_lowercase() {
        let text = "\"0x9fbda871d559710256a2502a2517b794b482db40\"";
        let addr: Address = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&addr).unwrap(), text);
    }

    #[test]
    fn test_address_accepts_mixed_case() {
        let addr: Address = "0x9FBDA871d559710256a2502A2517b794B482db40".parse().unwrap();
        assert_eq!(addr.to_string(), "0x9fbda871d559710256a2502a2517b794b482db40");
    }

    #[test]
    fn test_address_rejects_wrong_length_and_prefix() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("9fbda871d559710256a2502a2517b794b482db40".parse::<Address>().is_err());
    }

    #[test]
    fn test_default_address_is_zero() {
        let zero = Address::default();
        assert!(zero.is_zero());
        assert_eq!(zero.to_string(), format!("0x{}", "0".repeat(40)));
    }

    #[test]
    fn test_hash_round_trip() {
        let text = format!("0x{}", "ab".repeat(32));
        let hash: Hash = text.parse().unwrap();
        assert_eq!(hash.to_string(), text);
    }

    #[test]
    fn test_hex_big_encoding() {
        assert_eq!(HexBig::from(0u64).to_string(), "0x0");
        assert_eq!(HexBig::from(255u64).to_string(), "0xff");
        assert_eq!(HexBig::from(BigInt::from(-16)).to_string(), "-0x10");
    }

    #[test]
    fn test_hex_big_decoding() {
        let n: HexBig = serde_json::from_str("\"0x1e240\"").unwrap();
        assert_eq!(n.as_bigint(), &BigInt::from(123456));
        assert!("0x".parse::<HexBig>().is_err());
        assert!("0x01".parse::<HexBig>().is_err());
        assert!("1e240".parse::<HexBig>().is_err());
        assert!("0xzz".parse::<HexBig>().is_err());
    }

    #[test]
    fn test_signature_is_byte_array() {
        let mut raw = [0u8; SIGNATURE_LENGTH];
        raw[0] = 1;
        raw[64] = 27;
        let sig = Signature::from_bytes(raw);
        let encoded = serde_json::to_value(sig).unwrap();
        let arr = encoded.as_array().unwrap();
        assert_eq!(arr.len(), SIGNATURE_LENGTH);
        let decoded: Signature = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn test_signature_rejects_wrong_length() {
        assert!(serde_json::from_str::<Signature>("[1,2,3]").is_err());
        let long = format!("[{}]", vec!["0"; 66].join(","));
        assert!(serde_json::from_str::<Signature>(&long).is_err());
    }

    #[test]
    fn test_bytes_base64() {
        let bytes = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let encoded = serde_json::to_string(&bytes).unwrap();
        assert_eq!(encoded, "\"3q2+7w==\"");
        let decoded: Bytes = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, bytes);
        assert!(serde_json::from_str::<Bytes>("\"***\"").is_err());
    }
}
