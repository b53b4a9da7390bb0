//! File integrity verification
//!
//! Recomputes SHA3-512 over the referenced content and compares it to the
//! revision's `file_hash`. Content is resolved from the inline `content`
//! field when embedding was enabled, otherwise through the file bytes
//! provider under the name the chain's file index records.

use aqua_core::canon::sha3_512_hex;
use aqua_core::{normalize_hash, FileReader, Revision};

use crate::result::CheckOutcome;

/// Check a revision's file hash against its resolvable bytes
///
/// `indexed_name` is the external name the chain's file index maps the
/// hash to; it is only consulted when no inline content is present.
pub fn verify_file(
    revision: &Revision,
    indexed_name: Option<&str>,
    files: &dyn FileReader,
) -> CheckOutcome {
    let Some(file_hash) = revision.file_hash() else {
        return CheckOutcome::Missing;
    };

    let bytes = if let Some(content) = revision.content() {
        content.as_bytes().to_vec()
    } else {
        let Some(name) = indexed_name else {
            return CheckOutcome::fail("file hash is not present in the file index");
        };
        match files.read(name) {
            Ok(bytes) => bytes,
            Err(e) => return CheckOutcome::fail(format!("cannot resolve {name}: {e}")),
        }
    };

    if sha3_512_hex(&bytes) == normalize_hash(file_hash) {
        CheckOutcome::Pass
    } else {
        CheckOutcome::fail("file bytes do not hash to the recorded file hash")
    }
}
