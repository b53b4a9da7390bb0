//! Error types for witness operations

use thiserror::Error;

/// Witness operation errors
#[derive(Error, Debug)]
pub enum WitnessError {
    #[error("publish failed: {0}")]
    Publish(String),

    #[error("witness operation cancelled")]
    Cancelled,

    #[error("invalid merkle root: {0}")]
    InvalidRoot(String),

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("chain error: {0}")]
    Core(#[from] aqua_core::AquaError),
}

/// Result type alias for witness operations
pub type WitnessResult<T> = Result<T, WitnessError>;
