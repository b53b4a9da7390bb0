//! Error types for the aqua chain core

use thiserror::Error;

/// Core errors
///
/// Builder and store errors are fatal to the operation that raised them and
/// always leave the chain unchanged. Verification outcomes are not errors:
/// they are collected into result records by the verifier crate.
#[derive(Error, Debug)]
pub enum AquaError {
    #[error("corrupt chain: {0}")]
    CorruptChain(String),

    #[error("duplicate content: file hash {0} already present in chain")]
    DuplicateContent(String),

    #[error("invalid link: {0}")]
    InvalidLink(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("signature error: {0}")]
    Signature(String),

    #[error("chain is empty")]
    EmptyChain,

    #[error("revision is missing required field {0}")]
    MissingField(&'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core operations
pub type AquaResult<T> = Result<T, AquaError>;
