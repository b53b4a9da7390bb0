//! Signature verification
//!
//! The signed message binds the revision's parent:
//! `"I sign this revision: [<previous_verification_hash>]"` under the
//! current schema, or the v1.2 page-verification wording under the legacy
//! one. EIP-191 signatures are checked by recovering the signer address;
//! `did:key` signatures are verified against the embedded Ed25519 key.

use aqua_core::constants::{legacy_signature_message, signature_message};
use aqua_core::signature::{recover_ethereum_address, verify_did_key_signature};
use aqua_core::{normalize_hash, Revision, SignatureScheme};

use crate::options::SchemaVersion;
use crate::result::CheckOutcome;

/// Check a revision's signature fields
pub fn verify_signature(revision: &Revision, schema: SchemaVersion) -> CheckOutcome {
    let Some(signature) = revision.signature() else {
        return CheckOutcome::Missing;
    };
    let Some(declared_address) = revision.signature_wallet_address() else {
        return CheckOutcome::fail("signature present but wallet address missing");
    };

    let previous = revision.previous_verification_hash();
    let message = match schema {
        SchemaVersion::Current => signature_message(previous),
        SchemaVersion::V1_2 => legacy_signature_message(previous),
    };

    let scheme = revision
        .signature_type()
        .and_then(SignatureScheme::parse);
    match scheme {
        Some(SignatureScheme::EthereumEip191) => {
            match recover_ethereum_address(message.as_bytes(), signature) {
                Ok(recovered) => {
                    if normalize_hash(&recovered) == normalize_hash(declared_address) {
                        CheckOutcome::Pass
                    } else {
                        CheckOutcome::fail(format!(
                            "recovered signer {recovered} does not match declared address {declared_address}"
                        ))
                    }
                }
                Err(e) => CheckOutcome::fail(format!("signature recovery failed: {e}")),
            }
        }
        Some(SignatureScheme::DidKey) => {
            let Some(public_key) = revision.signature_public_key() else {
                return CheckOutcome::fail("did:key signature without a public key");
            };
            match verify_did_key_signature(message.as_bytes(), signature, public_key) {
                Ok(true) => CheckOutcome::Pass,
                Ok(false) => CheckOutcome::fail("did:key signature does not verify"),
                Err(e) => CheckOutcome::fail(format!("did:key verification failed: {e}")),
            }
        }
        None => CheckOutcome::fail(format!(
            "unknown signature type {:?}",
            revision.signature_type().unwrap_or_default()
        )),
    }
}
