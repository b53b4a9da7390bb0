//! Binary Merkle tree over hex-string leaves
//!
//! Inner nodes are `sha3_512(left_hex || right_hex)`. An odd node is
//! promoted unchanged to the next level; leaves are never duplicated. The
//! same semantics apply to tree building and proof verification.
//!
//! Two proof wire forms exist:
//! - the flat sibling path (`Vec<String>`, bottom-up), emitted by current
//!   builders;
//! - intermediate node records (`{left_leaf, right_leaf, successor}`),
//!   found in legacy chains and traversed exactly as recorded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canon::hash_hex_pair;
use crate::types::normalize_hash;

/// Merkle tree retaining every level, leaves first
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<String>>,
}

impl MerkleTree {
    /// Build a tree from hex leaves
    ///
    /// A single leaf is its own root; an empty leaf set yields a tree whose
    /// root is the empty string.
    pub fn from_leaves(leaves: Vec<String>) -> Self {
        let leaves: Vec<String> = leaves.iter().map(|l| normalize_hash(l)).collect();
        let mut levels = vec![leaves];

        while levels
            .last()
            .map(|level| level.len() > 1)
            .unwrap_or(false)
        {
            let current = levels.last().unwrap();
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for chunk in current.chunks(2) {
                if chunk.len() == 2 {
                    next.push(hash_hex_pair(&chunk[0], &chunk[1]));
                } else {
                    // Odd node: promote unchanged
                    next.push(chunk[0].clone());
                }
            }
            levels.push(next);
        }

        Self { levels }
    }

    /// Root hex, or the empty string for an empty tree
    pub fn root(&self) -> &str {
        self.levels
            .last()
            .and_then(|level| level.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(Vec::len).unwrap_or(0)
    }

    /// Flat sibling path for the leaf at `index`, bottom-up
    ///
    /// Levels where the node was promoted without a sibling contribute no
    /// entry. A single-leaf tree has an empty path.
    pub fn sibling_path(&self, index: usize) -> Option<Vec<String>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut path = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len().saturating_sub(1)] {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            if sibling_idx < level.len() {
                path.push(level[sibling_idx].clone());
            }
            idx /= 2;
        }
        Some(path)
    }

    /// Node-record path for the leaf at `index`, bottom-up
    pub fn node_path(&self, index: usize) -> Option<Vec<ProofNode>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut path = Vec::new();
        let mut idx = index;
        for (depth, level) in self.levels[..self.levels.len().saturating_sub(1)]
            .iter()
            .enumerate()
        {
            let pair_start = idx - idx % 2;
            if pair_start + 1 < level.len() {
                path.push(ProofNode {
                    left_leaf: level[pair_start].clone(),
                    right_leaf: level[pair_start + 1].clone(),
                    successor: self.levels[depth + 1][idx / 2].clone(),
                });
            }
            idx /= 2;
        }
        Some(path)
    }
}

/// One legacy proof record: a hashed pair and its parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    pub left_leaf: String,
    pub right_leaf: String,
    pub successor: String,
}

/// A Merkle proof in either wire form
#[derive(Debug, Clone, PartialEq)]
pub enum MerkleProof {
    /// Flat sibling path (current schema); `[tip]` for a single-chain
    /// witness
    Tips(Vec<String>),
    /// Intermediate node records (legacy schema)
    Nodes(Vec<ProofNode>),
}

impl MerkleProof {
    /// Decode from the JSON field value, accepting both wire forms
    pub fn from_value(value: &Value) -> Option<Self> {
        let entries = value.as_array()?;
        if entries.iter().all(Value::is_string) {
            let tips = entries
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect();
            return Some(Self::Tips(tips));
        }
        let nodes = entries
            .iter()
            .map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect::<Option<Vec<ProofNode>>>()?;
        Some(Self::Nodes(nodes))
    }

    /// Encode to the JSON field value
    pub fn to_value(&self) -> Value {
        match self {
            Self::Tips(tips) => Value::Array(
                tips.iter().map(|t| Value::String(t.clone())).collect(),
            ),
            Self::Nodes(nodes) => serde_json::to_value(nodes).unwrap_or(Value::Null),
        }
    }

    /// Number of entries in the proof
    pub fn len(&self) -> usize {
        match self {
            Self::Tips(tips) => tips.len(),
            Self::Nodes(nodes) => nodes.len(),
        }
    }

    /// Is the proof empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify this proof binds `leaf` to `root`
    pub fn verify(&self, leaf: &str, root: &str) -> Result<(), String> {
        match self {
            Self::Tips(siblings) => verify_sibling_path(leaf, siblings, root),
            Self::Nodes(nodes) => verify_node_path(leaf, nodes, root),
        }
    }
}

/// Verify a flat sibling path
///
/// The flat form carries no position bits, so each step accepts the pair in
/// either order. An empty path requires `root == leaf`; a path whose single
/// entry equals the leaf itself is the degenerate single-chain proof.
pub fn verify_sibling_path(leaf: &str, siblings: &[String], root: &str) -> Result<(), String> {
    let leaf = normalize_hash(leaf);
    let root = normalize_hash(root);

    // Degenerate single-chain proof: the lone entry is the leaf itself
    if siblings.len() == 1 && normalize_hash(&siblings[0]) == leaf && root == leaf {
        return Ok(());
    }

    let mut candidates = vec![leaf];
    for sibling in siblings {
        let sibling = normalize_hash(sibling);
        let mut next = Vec::with_capacity(candidates.len() * 2);
        for candidate in &candidates {
            next.push(hash_hex_pair(candidate, &sibling));
            next.push(hash_hex_pair(&sibling, candidate));
        }
        next.dedup();
        candidates = next;
    }

    if candidates.iter().any(|c| *c == root) {
        Ok(())
    } else {
        Err("sibling path does not reconstruct the root".to_string())
    }
}

/// Verify a legacy node-record path
///
/// At each record the running hash must appear among the record's leaves;
/// the successor is recomputed (a record with one empty side promotes the
/// other side unchanged) and checked; the final successor must be the root.
pub fn verify_node_path(leaf: &str, nodes: &[ProofNode], root: &str) -> Result<(), String> {
    let root = normalize_hash(root);
    let mut current = normalize_hash(leaf);

    for (position, node) in nodes.iter().enumerate() {
        let left = normalize_hash(&node.left_leaf);
        let right = normalize_hash(&node.right_leaf);

        if current != left && current != right {
            return Err(format!(
                "proof node {position} does not contain the running hash"
            ));
        }

        let successor = if left.is_empty() {
            right
        } else if right.is_empty() {
            left
        } else {
            hash_hex_pair(&left, &right)
        };

        if successor != normalize_hash(&node.successor) {
            return Err(format!("proof node {position} successor mismatch"));
        }
        current = successor;
    }

    if current == root {
        Ok(())
    } else {
        Err("final successor does not equal the Merkle root".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::sha3_512_hex;

    fn make_leaves(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| sha3_512_hex(format!("leaf{i}").as_bytes()))
            .collect()
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaves = make_leaves(1);
        let tree = MerkleTree::from_leaves(leaves.clone());
        assert_eq!(tree.root(), leaves[0]);
        assert_eq!(tree.sibling_path(0).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_two_leaves_root_is_pair_hash() {
        let leaves = make_leaves(2);
        let tree = MerkleTree::from_leaves(leaves.clone());
        assert_eq!(tree.root(), hash_hex_pair(&leaves[0], &leaves[1]));
        assert_eq!(tree.sibling_path(0).unwrap(), vec![leaves[1].clone()]);
        assert_eq!(tree.sibling_path(1).unwrap(), vec![leaves[0].clone()]);
    }

    #[test]
    fn test_odd_leaf_promoted_without_duplication() {
        let leaves = make_leaves(3);
        let tree = MerkleTree::from_leaves(leaves.clone());

        let pair = hash_hex_pair(&leaves[0], &leaves[1]);
        let expected_root = hash_hex_pair(&pair, &leaves[2]);
        assert_eq!(tree.root(), expected_root);

        // The promoted leaf has no sibling at the first level
        assert_eq!(tree.sibling_path(2).unwrap(), vec![pair]);
    }

    #[test]
    fn test_sibling_paths_verify_for_all_leaves() {
        for n in 1..=8 {
            let leaves = make_leaves(n);
            let tree = MerkleTree::from_leaves(leaves.clone());
            for (i, leaf) in leaves.iter().enumerate() {
                let path = tree.sibling_path(i).unwrap();
                verify_sibling_path(leaf, &path, tree.root())
                    .unwrap_or_else(|e| panic!("leaf {i}/{n}: {e}"));
            }
        }
    }

    #[test]
    fn test_foreign_leaf_fails_sibling_path() {
        let leaves = make_leaves(4);
        let tree = MerkleTree::from_leaves(leaves.clone());
        let path = tree.sibling_path(0).unwrap();
        let foreign = sha3_512_hex(b"not a member");
        assert!(verify_sibling_path(&foreign, &path, tree.root()).is_err());
    }

    #[test]
    fn test_node_paths_verify_for_all_leaves() {
        for n in 2..=8 {
            let leaves = make_leaves(n);
            let tree = MerkleTree::from_leaves(leaves.clone());
            for (i, leaf) in leaves.iter().enumerate() {
                let nodes = tree.node_path(i).unwrap();
                verify_node_path(leaf, &nodes, tree.root())
                    .unwrap_or_else(|e| panic!("leaf {i}/{n}: {e}"));
            }
        }
    }

    #[test]
    fn test_tampered_node_record_rejected() {
        let leaves = make_leaves(4);
        let tree = MerkleTree::from_leaves(leaves.clone());
        let mut nodes = tree.node_path(0).unwrap();
        nodes[0].successor = sha3_512_hex(b"forged");
        assert!(verify_node_path(&leaves[0], &nodes, tree.root()).is_err());
    }

    #[test]
    fn test_empty_side_promotes_other_leaf() {
        let leaf = sha3_512_hex(b"alone");
        let nodes = vec![ProofNode {
            left_leaf: leaf.clone(),
            right_leaf: String::new(),
            successor: leaf.clone(),
        }];
        assert!(verify_node_path(&leaf, &nodes, &leaf).is_ok());
    }

    #[test]
    fn test_proof_value_roundtrip_both_forms() {
        let tips = MerkleProof::Tips(vec!["aa".into(), "bb".into()]);
        let decoded = MerkleProof::from_value(&tips.to_value()).unwrap();
        assert_eq!(decoded, tips);

        let nodes = MerkleProof::Nodes(vec![ProofNode {
            left_leaf: "aa".into(),
            right_leaf: "bb".into(),
            successor: hash_hex_pair("aa", "bb"),
        }]);
        let decoded = MerkleProof::from_value(&nodes.to_value()).unwrap();
        assert_eq!(decoded, nodes);
    }
}
