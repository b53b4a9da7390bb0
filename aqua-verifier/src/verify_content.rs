//! Content and metadata verification
//!
//! Recomputes the verification hash from the revision payload under its
//! declared mode — Merkle when `leaves` is present, scalar otherwise — and
//! compares it against the storage key. Legacy v1.2 revisions additionally
//! carry a `metadata_hash` over fixed metadata fields, recomputed when the
//! schema routes to the legacy decoder.

use aqua_core::canon::{field_leaves, scalar_verification_hash, sha3_512_hex};
use aqua_core::{normalize_hash, MerkleTree, Revision};

use crate::options::SchemaVersion;
use crate::result::CheckOutcome;

/// Check a revision's payload against its storage key
pub fn verify_content(
    storage_key: &str,
    revision: &Revision,
    schema: SchemaVersion,
) -> CheckOutcome {
    if schema == SchemaVersion::V1_2 {
        if let Some(outcome) = verify_legacy_metadata(revision) {
            if !outcome.is_pass() {
                return outcome;
            }
        }
    }

    if revision.is_merkle() {
        verify_merkle_content(storage_key, revision)
    } else {
        verify_scalar_content(storage_key, revision)
    }
}

fn verify_scalar_content(storage_key: &str, revision: &Revision) -> CheckOutcome {
    match scalar_verification_hash(revision.fields()) {
        Ok(recomputed) => {
            if normalize_hash(&recomputed) == normalize_hash(storage_key) {
                CheckOutcome::Pass
            } else {
                CheckOutcome::fail("recomputed payload hash does not match the verification hash")
            }
        }
        Err(e) => CheckOutcome::fail(format!("payload cannot be canonicalized: {e}")),
    }
}

fn verify_merkle_content(storage_key: &str, revision: &Revision) -> CheckOutcome {
    let recomputed = field_leaves(&revision.fields_without_leaves());

    if let Some(stored) = revision.leaves() {
        let stored: Vec<String> = stored.iter().map(|l| normalize_hash(l)).collect();
        if stored != recomputed {
            return CheckOutcome::fail("persisted leaves do not match the revision fields");
        }
    }

    let root = MerkleTree::from_leaves(recomputed).root().to_string();
    if normalize_hash(&root) == normalize_hash(storage_key) {
        CheckOutcome::Pass
    } else {
        CheckOutcome::fail("recomputed Merkle root does not match the verification hash")
    }
}

/// Recompute the v1.2 metadata hash when its fields are present
///
/// Legacy layout: `sha3_512(domain_id || time_stamp ||
/// previous_verification_hash || merge_hash)`, with an absent merge hash
/// contributing nothing.
fn verify_legacy_metadata(revision: &Revision) -> Option<CheckOutcome> {
    let declared = revision.get("metadata_hash")?.as_str()?;
    let domain_id = revision.get("domain_id").and_then(|v| v.as_str())?;
    let time_stamp = revision.get("time_stamp").and_then(|v| v.as_str())?;

    let mut input = String::new();
    input.push_str(domain_id);
    input.push_str(time_stamp);
    input.push_str(revision.previous_verification_hash());
    if let Some(merge_hash) = revision.get("merge_hash").and_then(|v| v.as_str()) {
        input.push_str(merge_hash);
    }

    if sha3_512_hex(input.as_bytes()) == normalize_hash(declared) {
        Some(CheckOutcome::Pass)
    } else {
        Some(CheckOutcome::fail(
            "recomputed metadata hash does not match the recorded metadata hash",
        ))
    }
}
