//! Canonicalization and leaf production
//!
//! Deterministic serialization for computing revision hashes. Unlike
//! sorted-key canonical JSON, the aqua hash contract covers keys in their
//! *insertion* order: two builders that assemble the same fields in the same
//! order produce the same digest, and key reordering changes the digest.

use serde_json::{Map, Value};
use sha3::{Digest, Sha3_512};

use crate::error::AquaResult;
use crate::types::Hash;

/// SHA3-512 of raw bytes as lowercase hex
///
/// The empty input maps to the empty string. This is a sentinel kept for
/// legacy chain decoding, never a real digest.
pub fn sha3_512_hex(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }
    let mut hasher = Sha3_512::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// SHA3-512 over the concatenation of two hex strings
///
/// Merkle inner nodes hash the children's hex spellings, not their raw
/// bytes; this matches the on-the-wire proof records.
pub fn hash_hex_pair(left: &str, right: &str) -> String {
    let mut combined = String::with_capacity(left.len() + right.len());
    combined.push_str(left);
    combined.push_str(right);
    sha3_512_hex(combined.as_bytes())
}

/// Deterministic stringification of a field value
///
/// Strings pass through unescaped; numbers render as their shortest
/// round-tripping decimal; booleans as `true`/`false`; nested structures as
/// canonical JSON in insertion order.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

/// Canonical JSON of an ordered field map: insertion-order keys, no
/// whitespace, JSON-standard escapes
pub fn canonical_json(fields: &Map<String, Value>) -> AquaResult<String> {
    Ok(serde_json::to_string(fields)?)
}

/// Produce the ordered leaf sequence `sha3_512(key || stringify(value))`
/// for every field in insertion order
pub fn field_leaves(fields: &Map<String, Value>) -> Vec<String> {
    fields
        .iter()
        .map(|(key, value)| {
            let mut input = String::with_capacity(key.len() + 16);
            input.push_str(key);
            input.push_str(&stringify(value));
            sha3_512_hex(input.as_bytes())
        })
        .collect()
}

/// Scalar-mode verification hash: `0x` + SHA3-512 of the canonical JSON
pub fn scalar_verification_hash(fields: &Map<String, Value>) -> AquaResult<String> {
    let canonical = canonical_json(fields)?;
    Ok(Hash::sha3_512(canonical.as_bytes()).to_prefixed_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_input_sentinel() {
        assert_eq!(sha3_512_hex(b""), "");
        assert_eq!(sha3_512_hex(b"x").len(), 128);
    }

    #[test]
    fn test_stringify_primitives() {
        assert_eq!(stringify(&json!("plain")), "plain");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(["a", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_canonical_json_insertion_order() {
        let mut fields = Map::new();
        fields.insert("z".into(), json!(1));
        fields.insert("a".into(), json!(2));
        let canonical = canonical_json(&fields).unwrap();
        assert_eq!(canonical, r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_key_order_is_part_of_the_hash() {
        let mut forward = Map::new();
        forward.insert("a".into(), json!(1));
        forward.insert("b".into(), json!(2));

        let mut reversed = Map::new();
        reversed.insert("b".into(), json!(2));
        reversed.insert("a".into(), json!(1));

        assert_ne!(
            scalar_verification_hash(&forward).unwrap(),
            scalar_verification_hash(&reversed).unwrap()
        );
    }

    #[test]
    fn test_scalar_hash_deterministic() {
        let mut fields = Map::new();
        fields.insert("previous_verification_hash".into(), json!(""));
        fields.insert("revision_type".into(), json!("file"));

        let first = scalar_verification_hash(&fields).unwrap();
        let second = scalar_verification_hash(&fields).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("0x"));
        assert_eq!(first.len(), 2 + 128);
    }

    #[test]
    fn test_field_leaves_order_and_count() {
        let mut fields = Map::new();
        fields.insert("k1".into(), json!("v1"));
        fields.insert("k2".into(), json!("v2"));

        let leaves = field_leaves(&fields);
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0], sha3_512_hex(b"k1v1"));
        assert_eq!(leaves[1], sha3_512_hex(b"k2v2"));
    }

    #[test]
    fn test_hash_hex_pair_concatenates_strings() {
        let pair = hash_hex_pair("aa", "bb");
        assert_eq!(pair, sha3_512_hex(b"aabb"));
    }
}
