//! Witness verification
//!
//! Cross-checks a witness revision against its anchor transaction: the
//! on-chain payload must carry the expected Merkle root (behind the witness
//! selector on EVM networks, in the event content on Nostr, as the stamped
//! digest for a TSA token), and the revision's Merkle proof must bind the
//! witnessed tip to the root.

use tracing::warn;

use aqua_core::canon::sha3_512_hex;
use aqua_core::{normalize_hash, MerkleProof, Revision};
use aqua_witness::{parse_witness_calldata, WitnessNetwork};

use crate::oracle::{OracleError, TransactionOracle, WitnessTransaction};
use crate::options::{SchemaVersion, VerifyOptions};
use crate::result::CheckOutcome;

/// Check a revision's witness fields against the anchor transaction
pub async fn verify_witness(
    revision: &Revision,
    oracle: &dyn TransactionOracle,
    options: &VerifyOptions,
) -> CheckOutcome {
    let Some(declared_root) = revision.witness_merkle_root() else {
        return CheckOutcome::Missing;
    };
    let Some(tx_hash) = revision.witness_transaction_hash() else {
        return CheckOutcome::fail("witness transaction hash missing");
    };
    let Some(network_name) = revision.witness_network() else {
        return CheckOutcome::fail("witness network missing");
    };
    let Some(network) = WitnessNetwork::parse(network_name) else {
        return CheckOutcome::fail(format!("unknown witness network {network_name:?}"));
    };

    let expected_root = expected_anchor_root(revision, declared_root, options.schema);

    let transaction = match oracle.get_transaction(network, tx_hash).await {
        Ok(transaction) => transaction,
        Err(OracleError::NotFound(hash)) => {
            return CheckOutcome::fail(format!("witness transaction {hash} not found"));
        }
        Err(e) => {
            warn!(tx_hash, error = %e, "witness transaction fetch failed");
            return CheckOutcome::fail(format!("witness transaction unavailable: {e}"));
        }
    };

    let payload_outcome = match transaction {
        WitnessTransaction::Ethereum { input_data, .. } => {
            match parse_witness_calldata(&input_data) {
                Some(anchored) => {
                    if anchored == normalize_hash(&expected_root) {
                        CheckOutcome::Pass
                    } else {
                        CheckOutcome::fail(
                            "anchored root does not match the expected Merkle root",
                        )
                    }
                }
                None => CheckOutcome::fail(
                    "transaction input data does not begin with the witness selector",
                ),
            }
        }
        WitnessTransaction::Nostr(event) => {
            if event.anchors_root(&expected_root) {
                CheckOutcome::Pass
            } else {
                CheckOutcome::fail("nostr event content does not carry the expected root")
            }
        }
        WitnessTransaction::Tsa(token) => {
            if token.anchors_root(&expected_root) {
                CheckOutcome::Pass
            } else {
                CheckOutcome::fail("timestamp token digest does not match the expected root")
            }
        }
    };
    if !payload_outcome.is_pass() {
        return payload_outcome;
    }

    if options.verify_merkle_proof {
        if let Some(proof) = revision.witness_merkle_proof() {
            // Legacy node-record proofs of a single entry carry no path
            // information and are skipped, matching the legacy decoder.
            let skip = matches!(&proof, MerkleProof::Nodes(nodes) if nodes.len() <= 1);
            if !skip {
                let leaf = revision.previous_verification_hash();
                if let Err(e) = proof.verify(leaf, declared_root) {
                    return CheckOutcome::fail(format!("merkle proof invalid: {e}"));
                }
            }
        }
    }

    CheckOutcome::Pass
}

/// The root the anchor transaction is expected to carry
///
/// Legacy v1.2 chains anchored `sha3_512(domain_genesis_hash || root)`;
/// current chains anchor the Merkle root directly.
fn expected_anchor_root(
    revision: &Revision,
    declared_root: &str,
    schema: SchemaVersion,
) -> String {
    if schema == SchemaVersion::V1_2 {
        if let Some(domain_genesis) = revision.get("domain_genesis_hash").and_then(|v| v.as_str())
        {
            let mut input = String::new();
            input.push_str(domain_genesis);
            input.push_str(&normalize_hash(declared_root));
            return sha3_512_hex(input.as_bytes());
        }
    }
    normalize_hash(declared_root)
}
