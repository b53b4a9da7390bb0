//! Linkage verification
//!
//! A revision's `previous_verification_hash` must equal the storage key of
//! the revision before it, threading through the chain from the empty
//! genesis parent. Comparison normalizes case and the optional `0x` prefix.

use aqua_core::{normalize_hash, Revision};

use crate::result::CheckOutcome;

/// Check a revision against the threaded previous hash
pub fn verify_linkage(revision: &Revision, expected_previous: &str) -> CheckOutcome {
    let declared = revision.previous_verification_hash();
    if normalize_hash(declared) == normalize_hash(expected_previous) {
        CheckOutcome::Pass
    } else {
        CheckOutcome::fail(format!(
            "previous verification hash {declared:?} does not match expected {expected_previous:?}"
        ))
    }
}
