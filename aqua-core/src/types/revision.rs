//! Revision model
//!
//! A revision is an insertion-ordered field map. The map *is* the wire form
//! and the hash input: canonical JSON serializes the keys in the order they
//! were inserted, and Merkle-mode leaves are produced per field in that same
//! order. Typed accessors are provided over the map rather than per-kind
//! structs because form revisions carry dynamic `forms_*` keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::LEAVES_FIELD;
use crate::crypto::merkle::MerkleProof;
use crate::error::{AquaError, AquaResult};

/// The five revision kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionType {
    File,
    Form,
    Signature,
    Witness,
    Link,
}

impl RevisionType {
    /// Get the wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Form => "form",
            Self::Signature => "signature",
            Self::Witness => "witness",
            Self::Link => "link",
        }
    }

    /// Parse from the wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "file" => Some(Self::File),
            "form" => Some(Self::Form),
            "signature" => Some(Self::Signature),
            "witness" => Some(Self::Witness),
            "link" => Some(Self::Link),
            _ => None,
        }
    }

    /// Does this kind carry file content fields?
    pub fn has_file_content(&self) -> bool {
        matches!(self, Self::File | Self::Form)
    }
}

/// One immutable record in an aqua chain
///
/// Stored under its verification hash; field insertion order is part of the
/// hashing contract and is preserved through serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision {
    fields: Map<String, Value>,
}

impl Revision {
    /// Wrap an ordered field map
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Borrow the ordered field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Field lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    fn str_list_field(&self, key: &str) -> Option<Vec<String>> {
        self.fields.get(key).and_then(Value::as_array).map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
    }

    /// Hash of the prior revision; empty string for the genesis revision
    pub fn previous_verification_hash(&self) -> &str {
        self.str_field("previous_verification_hash").unwrap_or("")
    }

    /// `YYYYMMDDHHMMSS` UTC timestamp string
    pub fn local_timestamp(&self) -> Option<&str> {
        self.str_field("local_timestamp")
    }

    /// Parsed revision kind
    pub fn revision_type(&self) -> AquaResult<RevisionType> {
        let raw = self
            .str_field("revision_type")
            .ok_or(AquaError::MissingField("revision_type"))?;
        RevisionType::parse(raw)
            .ok_or_else(|| AquaError::CorruptChain(format!("unknown revision_type {raw:?}")))
    }

    /// SHA3-512 of the referenced file bytes (file/form revisions)
    pub fn file_hash(&self) -> Option<&str> {
        self.str_field("file_hash")
    }

    /// Inline embedded content, when content-embedding was enabled
    pub fn content(&self) -> Option<&str> {
        self.str_field("content")
    }

    /// Wallet signature bytes, hex
    pub fn signature(&self) -> Option<&str> {
        self.str_field("signature")
    }

    /// Signature scheme identifier (`ethereum:eip-191` or `did:key`)
    pub fn signature_type(&self) -> Option<&str> {
        self.str_field("signature_type")
    }

    /// Hex public key of the signer
    pub fn signature_public_key(&self) -> Option<&str> {
        self.str_field("signature_public_key")
    }

    /// Declared signer wallet address
    pub fn signature_wallet_address(&self) -> Option<&str> {
        self.str_field("signature_wallet_address")
    }

    /// Merkle root covered by the witness transaction
    pub fn witness_merkle_root(&self) -> Option<&str> {
        self.str_field("witness_merkle_root")
    }

    /// Witness network name (`sepolia`, `mainnet`, `nostr`, `TSA_RFC3161`, ...)
    pub fn witness_network(&self) -> Option<&str> {
        self.str_field("witness_network")
    }

    /// Transaction hash (or event id / token serial) of the witness anchor
    pub fn witness_transaction_hash(&self) -> Option<&str> {
        self.str_field("witness_transaction_hash")
    }

    /// Contract address the witness transaction was sent to
    pub fn witness_smart_contract_address(&self) -> Option<&str> {
        self.str_field("witness_smart_contract_address")
    }

    /// Account that published the witness anchor
    pub fn witness_sender_account_address(&self) -> Option<&str> {
        self.str_field("witness_sender_account_address")
    }

    /// Seconds since epoch at which the anchor was published
    pub fn witness_timestamp(&self) -> Option<u64> {
        self.fields.get("witness_timestamp").and_then(Value::as_u64)
    }

    /// Decoded Merkle proof, in either wire form
    pub fn witness_merkle_proof(&self) -> Option<MerkleProof> {
        self.fields
            .get("witness_merkle_proof")
            .and_then(MerkleProof::from_value)
    }

    /// Tip hashes of the chains cited by a link revision
    pub fn link_verification_hashes(&self) -> Option<Vec<String>> {
        self.str_list_field("link_verification_hashes")
    }

    /// SHA3-512 digests of the raw bytes of each linked aqua file
    pub fn link_file_hashes(&self) -> Option<Vec<String>> {
        self.str_list_field("link_file_hashes")
    }

    /// Persisted Merkle leaves; presence declares Merkle hashing mode
    pub fn leaves(&self) -> Option<Vec<String>> {
        self.str_list_field(LEAVES_FIELD)
    }

    /// Was this revision hashed in Merkle mode?
    pub fn is_merkle(&self) -> bool {
        self.fields.contains_key(LEAVES_FIELD)
    }

    /// The field map without the persisted `leaves`, i.e. the Merkle-mode
    /// hash input
    pub fn fields_without_leaves(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (k, v) in &self.fields {
            if k != LEAVES_FIELD {
                out.insert(k.clone(), v.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_revision() -> Revision {
        let mut fields = Map::new();
        fields.insert("previous_verification_hash".into(), json!(""));
        fields.insert("local_timestamp".into(), json!("20240101000000"));
        fields.insert("revision_type".into(), json!("file"));
        fields.insert("file_hash".into(), json!("abc123"));
        Revision::from_fields(fields)
    }

    #[test]
    fn test_typed_accessors() {
        let rev = sample_revision();
        assert_eq!(rev.previous_verification_hash(), "");
        assert_eq!(rev.local_timestamp(), Some("20240101000000"));
        assert_eq!(rev.revision_type().unwrap(), RevisionType::File);
        assert_eq!(rev.file_hash(), Some("abc123"));
        assert!(rev.signature().is_none());
        assert!(!rev.is_merkle());
    }

    #[test]
    fn test_serde_preserves_field_order() {
        let rev = sample_revision();
        let encoded = serde_json::to_string(&rev).unwrap();
        assert!(encoded.starts_with("{\"previous_verification_hash\""));
        let decoded: Revision = serde_json::from_str(&encoded).unwrap();
        let keys: Vec<&String> = decoded.fields().keys().collect();
        assert_eq!(
            keys,
            vec![
                "previous_verification_hash",
                "local_timestamp",
                "revision_type",
                "file_hash"
            ]
        );
    }

    #[test]
    fn test_unknown_revision_type_is_corrupt() {
        let mut fields = Map::new();
        fields.insert("revision_type".into(), json!("blob"));
        let rev = Revision::from_fields(fields);
        assert!(matches!(
            rev.revision_type(),
            Err(AquaError::CorruptChain(_))
        ));
    }
}
