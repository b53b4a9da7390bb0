//! Protocol constants
//!
//! Centralized constants for the aqua chain protocol. Wire-level values
//! (selectors, message templates, field prefixes) live here so that the
//! builder and the verifier cannot drift apart.

// ============================================================================
// Digests
// ============================================================================

/// Digest length in bytes (SHA3-512)
pub const DIGEST_LENGTH_BYTES: usize = 64;

/// Digest length in lowercase hex characters
pub const DIGEST_LENGTH_HEX: usize = 128;

/// File nonce length in bytes (before base64url encoding)
pub const FILE_NONCE_LENGTH_BYTES: usize = 32;

// ============================================================================
// Revision fields
// ============================================================================

/// Key prefix reserved for promoted form fields
pub const FORM_FIELD_PREFIX: &str = "forms_";

/// Field carrying the persisted Merkle leaves of a Merkle-mode revision
pub const LEAVES_FIELD: &str = "leaves";

/// `local_timestamp` format (UTC, second resolution)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// The only value accepted for `link_type`
pub const LINK_TYPE_AQUA: &str = "aqua";

/// File suffix that link revisions must not reference directly
pub const AQUA_FILE_SUFFIX: &str = ".aqua.json";

// ============================================================================
// Signing
// ============================================================================

/// Build the signing message for the current schema
pub fn signature_message(previous_verification_hash: &str) -> String {
    format!("I sign this revision: [{previous_verification_hash}]")
}

/// Build the signing message for the legacy v1.2 schema
pub fn legacy_signature_message(previous_verification_hash: &str) -> String {
    format!("I sign the following page verification_hash: [{previous_verification_hash}]")
}

// ============================================================================
// Witnessing
// ============================================================================

/// 4-byte function selector of the witness contract's event method, hex
pub const WITNESS_EVENT_SELECTOR: &str = "9cef4ea1";
