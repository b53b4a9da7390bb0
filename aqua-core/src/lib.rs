//! Aqua chain core
//!
//! This crate provides the revision model and hash algebra for aqua chains:
//! tamper-evident revision histories in which every revision is bound to its
//! predecessor by a SHA3-512 verification hash, and may additionally carry a
//! signature or a witness record.
//!
//! The crate covers:
//! - Canonical hashing of revision payloads (scalar and Merkle-tree modes)
//! - The in-memory chain store with its file index
//! - The revision builder for the five revision kinds
//!   (file / form / signature / witness / link)
//! - Signer interfaces and local signing keys
//!
//! Witness anchoring transports and chain verification live in the
//! `aqua-witness` and `aqua-verifier` crates.

pub mod builder;
pub mod canon;
pub mod chain;
pub mod constants;
pub mod content;
pub mod crypto;
pub mod error;
pub mod signature;
pub mod types;

pub use builder::{
    FormRevisionInput, LinkRevisionInput, LinkTarget, RevisionBuilder, WitnessInput,
};
pub use chain::{AquaChain, RemovedTip};
pub use constants::*;
pub use content::{FileReader, MemoryFileReader};
pub use crypto::merkle::{MerkleProof, MerkleTree, ProofNode};
pub use error::{AquaError, AquaResult};
pub use signature::{
    DidKeySigner, EthereumSigner, SignatureBundle, SignatureScheme, Signer,
};
pub use types::{normalize_hash, Hash, Revision, RevisionType};
