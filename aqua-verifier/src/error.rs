//! Error types for the verifier SDK
//!
//! Note the split: these errors are *operational* (a missing RPC key, a
//! broken oracle). Verification findings are never errors; they are
//! collected into result records so a caller can distinguish a failed
//! witness from a wholly broken revision.

use thiserror::Error;

/// Verifier operational errors
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("missing configuration: {0}")]
    ConfigMissing(String),

    #[error("oracle error: {0}")]
    Oracle(String),

    #[error("chain error: {0}")]
    Core(#[from] aqua_core::AquaError),
}

/// Result type alias for verifier operations
pub type VerifierResult<T> = Result<T, VerifierError>;
