//! Fixed-size SHA3-512 digest type
//!
//! Aqua chains identify every revision and every referenced file by a
//! SHA3-512 digest, carried on the wire as lowercase hex. Verification
//! hashes may carry a `0x` prefix; comparisons always normalize.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_512};
use thiserror::Error;

use crate::constants::{DIGEST_LENGTH_BYTES, DIGEST_LENGTH_HEX};

/// Error type for digest operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Digest has wrong length
    #[error("invalid digest length: expected {expected} hex chars, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
}

/// Strip an optional `0x` prefix and lowercase
///
/// All hash comparisons in the protocol go through this normalization;
/// the prefixed and unprefixed spellings of the same digest are equal.
pub fn normalize_hash(s: &str) -> String {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
        .to_ascii_lowercase()
}

/// 64-byte SHA3-512 digest
///
/// Wraps the raw digest bytes; the wire form is always a hex string,
/// produced by [`Hash::to_hex`] or [`Hash::to_prefixed_hex`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash(#[serde(with = "serde_bytes_hex")] [u8; DIGEST_LENGTH_BYTES]);

impl Hash {
    /// Create a digest from raw bytes
    pub fn new(bytes: [u8; DIGEST_LENGTH_BYTES]) -> Self {
        Self(bytes)
    }

    /// Parse a hex string, accepting an optional `0x` prefix and any case
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let normalized = normalize_hash(s);
        if normalized.len() != DIGEST_LENGTH_HEX {
            return Err(HashError::InvalidLength {
                expected: DIGEST_LENGTH_HEX,
                actual: normalized.len(),
            });
        }
        let bytes =
            hex::decode(&normalized).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        let mut arr = [0u8; DIGEST_LENGTH_BYTES];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Lowercase hex, no prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Lowercase hex with the `0x` prefix used by scalar verification hashes
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH_BYTES] {
        &self.0
    }

    /// Compute the SHA3-512 digest of raw bytes
    pub fn sha3_512(data: &[u8]) -> Self {
        let mut hasher = Sha3_512::new();
        hasher.update(data);
        let digest = hasher.finalize();
        let mut arr = [0u8; DIGEST_LENGTH_BYTES];
        arr.copy_from_slice(&digest);
        Self(arr)
    }

    /// Case- and prefix-insensitive equality against a hex string
    pub fn matches(&self, other: &str) -> bool {
        normalize_hash(other) == self.to_hex()
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

mod serde_bytes_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{normalize_hash, DIGEST_LENGTH_BYTES};

    pub fn serialize<S: Serializer>(
        bytes: &[u8; DIGEST_LENGTH_BYTES],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; DIGEST_LENGTH_BYTES], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(normalize_hash(&s)).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("digest must be 64 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let original = Hash::sha3_512(b"hello\n");
        let parsed = Hash::from_hex(&original.to_hex()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_prefix_and_case_insensitive() {
        let digest = Hash::sha3_512(b"data");
        let prefixed = digest.to_prefixed_hex();
        let shouty = prefixed.to_ascii_uppercase().replace("0X", "0x");
        assert_eq!(Hash::from_hex(&prefixed).unwrap(), digest);
        assert_eq!(Hash::from_hex(&shouty).unwrap(), digest);
        assert!(digest.matches(&prefixed));
    }

    #[test]
    fn test_invalid_length_rejected() {
        let err = Hash::from_hex("0xdeadbeef").unwrap_err();
        assert!(matches!(err, HashError::InvalidLength { .. }));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_hash("0xAbC"), "abc");
        assert_eq!(normalize_hash("AbC"), "abc");
    }
}
