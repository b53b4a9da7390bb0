//! Aqua chain verifier SDK
//!
//! Independent verification for aqua chains. Any party holding the
//! serialized chain, the referenced file bytes, and access to a transaction
//! oracle can check:
//! - Hash linkage between consecutive revisions
//! - File and payload integrity (scalar and Merkle revision hashes)
//! - Signature recovery (EIP-191) and did:key verification
//! - Witness anchors: on-chain payload cross-check and Merkle proof
//!   traversal
//!
//! Verification never short-circuits: every revision is checked so the
//! caller gets a complete diagnosis, and the chain's aggregate result is the
//! conjunction of the per-revision results.

pub mod error;
pub mod oracle;
pub mod options;
pub mod result;
pub mod verify_content;
pub mod verify_file;
pub mod verify_linkage;
pub mod verify_signature;
pub mod verify_witness;

pub use error::{VerifierError, VerifierResult};
pub use oracle::{
    EthereumRpcOracle, MockOracle, OracleError, TransactionOracle, WitnessTransaction,
};
pub use options::{SchemaVersion, VerifyOptions};
pub use result::{ChainVerification, CheckOutcome, RevisionVerification};

use std::sync::Arc;

use tracing::debug;

use aqua_core::{AquaChain, FileReader, Revision};

/// Chain verifier
///
/// Walks the revisions in insertion order with the previous verification
/// hash threaded through, dispatching the five sub-checks per revision.
/// Configuration is explicit; the verifier holds no global state.
pub struct ChainVerifier {
    options: VerifyOptions,
    oracle: Arc<dyn TransactionOracle>,
    files: Arc<dyn FileReader>,
}

impl ChainVerifier {
    /// Create a verifier over an oracle and a file bytes provider
    pub fn new(
        options: VerifyOptions,
        oracle: Arc<dyn TransactionOracle>,
        files: Arc<dyn FileReader>,
    ) -> Self {
        Self {
            options,
            oracle,
            files,
        }
    }

    /// Borrow the active options
    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify a whole chain
    ///
    /// Iterates in insertion order; timestamps are informational and play
    /// no part in ordering. All revisions are verified even after a
    /// failure.
    pub async fn verify_chain(&self, chain: &AquaChain) -> ChainVerification {
        let mut previous = String::new();
        let mut records = Vec::with_capacity(chain.len());

        for (verification_hash, revision) in chain.revisions() {
            let record = self
                .verify_revision(chain, verification_hash, revision, &previous)
                .await;
            debug!(
                verification_hash = %verification_hash,
                valid = record.is_valid(self.options.strict),
                "revision verified"
            );
            records.push(record);
            previous = verification_hash.clone();
        }

        ChainVerification::from_revisions(records, self.options.strict)
    }

    /// Verify one revision under a threaded previous hash
    pub async fn verify_revision(
        &self,
        chain: &AquaChain,
        verification_hash: &str,
        revision: &Revision,
        expected_previous: &str,
    ) -> RevisionVerification {
        let mut record = RevisionVerification::new(verification_hash);
        record.revision_type = revision.revision_type().ok();

        record.linkage = verify_linkage::verify_linkage(revision, expected_previous);

        let indexed_name = revision
            .file_hash()
            .and_then(|hash| chain.indexed_name(hash));
        record.file = verify_file::verify_file(revision, indexed_name, self.files.as_ref());

        record.content =
            verify_content::verify_content(verification_hash, revision, self.options.schema);

        record.signature = verify_signature::verify_signature(revision, self.options.schema);

        record.witness =
            verify_witness::verify_witness(revision, self.oracle.as_ref(), &self.options).await;

        record
    }
}
