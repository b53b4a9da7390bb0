//! RFC-3161 timestamp authority transport shapes
//!
//! A TSA witness requests a timestamp token over the Merkle root; the token
//! serial identifies the anchor and the authority is the publisher.

use serde::{Deserialize, Serialize};

use aqua_core::normalize_hash;

/// The verified contents of a timestamp token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampToken {
    /// Token serial number (the witness transaction hash)
    pub serial: String,
    /// Hex digest the authority stamped
    pub digest: String,
    /// Unix timestamp asserted by the authority
    pub gen_time: u64,
    /// Authority URL
    pub authority: String,
}

impl TimestampToken {
    /// Was this Merkle root the stamped digest?
    pub fn anchors_root(&self, merkle_root: &str) -> bool {
        normalize_hash(&self.digest) == normalize_hash(merkle_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_match() {
        let token = TimestampToken {
            serial: "1234".into(),
            digest: "AB12".into(),
            gen_time: 1_700_000_000,
            authority: "https://tsa.example".into(),
        };
        assert!(token.anchors_root("0xab12"));
        assert!(!token.anchors_root("0xffff"));
    }
}
