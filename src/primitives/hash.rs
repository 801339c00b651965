use crate::codec::Encodable;
use bytes::{BufMut, BytesMut};
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("expected {expected} hex characters, got {actual}")]
    BadLength { expected: usize, actual: usize },
    #[error("invalid hex digit")]
    BadDigit,
}

fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N], HexError> {
    if s.len() != N * 2 {
        return Err(HexError::BadLength {
            expected: N * 2,
            actual: s.len(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out).map_err(|_| HexError::BadDigit)?;
    Ok(out)
}

/// A sha256 digest. Transaction ids, block hashes and merkle nodes are all `Hash256`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256([u8; 32]);

pub type TxId = Hash256;
pub type BlockHash = Hash256;

impl Hash256 {
    pub const ZERO: Hash256 = Hash256([0; 32]);

    pub fn hash(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// Hash of two concatenated digests, used to build the merkle tree
    pub fn combine(left: &Hash256, right: &Hash256) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(left.0);
        hasher.update(right.0);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Number of leading zero bits, the measure proof of work is judged by
    pub fn leading_zero_bits(&self) -> u32 {
        let mut bits = 0;
        for byte in &self.0 {
            if *byte == 0 {
                bits += 8;
            } else {
                bits += byte.leading_zeros();
                break;
            }
        }
        bits
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Encodable for Hash256 {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }

    fn encoded_len(&self) -> usize {
        32
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self)
    }
}

impl FromStr for Hash256 {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Self)
    }
}

/// A public wallet address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn random() -> Self {
        Self(rand::thread_rng().gen())
    }
}

impl Encodable for Address {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }

    fn encoded_len(&self) -> usize {
        20
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Self)
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

hex_serde!(Hash256);
hex_serde!(Address);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_bits() {
        let mut bytes = [0xffu8; 32];
        assert_eq!(Hash256::from(bytes).leading_zero_bits(), 0);
        bytes[0] = 0;
        bytes[1] = 0x1f;
        assert_eq!(Hash256::from(bytes).leading_zero_bits(), 11);
        assert_eq!(Hash256::ZERO.leading_zero_bits(), 256);
    }

    #[test]
    fn test_hex_parse() {
        let address = Address::random();
        assert_eq!(address.to_string().parse::<Address>().unwrap(), address);
        assert_eq!(Address::new([0xab; 20]).to_string(), "ab".repeat(20));
        assert_eq!(
            "abc".parse::<Hash256>(),
            Err(HexError::BadLength {
                expected: 64,
                actual: 3
            })
        );
        assert_eq!("zz".repeat(20).parse::<Address>(), Err(HexError::BadDigit));
        assert_eq!(
            format!("+f{}", "0".repeat(38)).parse::<Address>(),
            Err(HexError::BadDigit)
        );
    }

    #[test]
    fn test_json_is_hex_string() {
        let hash = Hash256::hash(b"hello");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash));
        assert_eq!(serde_json::from_str::<Hash256>(&json).unwrap(), hash);
    }
}
