//! Cryptographic primitives for aqua chains
//!
//! - Merkle trees over hex-string leaves (revision field leaves, chain tips)
//! - Proof structures in both wire forms

pub mod merkle;

pub use merkle::{MerkleProof, MerkleTree, ProofNode};
