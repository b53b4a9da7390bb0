//! Pluggable witness platform interface
//!
//! A platform publishes a Merkle root to its transport and returns the
//! receipt the witness revision records. Publication is the only blocking
//! step of a witness operation; a failed or cancelled publish leaves every
//! chain untouched because the coordinator only appends after the receipt
//! arrives.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use aqua_core::canon::sha3_512_hex;

use crate::error::WitnessResult;
use crate::ethereum::WitnessNetwork;

/// What a witness platform reports after publishing a root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WitnessReceipt {
    /// Transaction hash, event id, or token serial
    pub transaction_hash: String,
    /// Account / pubkey / authority that published the anchor
    pub publisher: String,
    /// Seconds since epoch at publication
    pub timestamp: u64,
    /// Network the anchor landed on
    pub network: WitnessNetwork,
    /// Contract address, for EVM networks
    pub smart_contract_address: Option<String>,
}

/// External collaborator anchoring Merkle roots
#[async_trait]
pub trait WitnessPlatform: Send + Sync {
    /// Publish a root and return the receipt; blocks on the transport
    async fn publish(&self, merkle_root: &str) -> WitnessResult<WitnessReceipt>;
}

/// Deterministic in-process platform for tests and offline chains
///
/// The reported transaction hash is derived from the root, so a paired mock
/// transaction oracle can reproduce the anchor payload.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    network: WitnessNetwork,
    publisher: String,
}

impl MockPlatform {
    /// Create a mock platform reporting anchors on the given network
    pub fn new(network: WitnessNetwork, publisher: impl Into<String>) -> Self {
        Self {
            network,
            publisher: publisher.into(),
        }
    }

    /// The transaction hash this platform reports for a root
    pub fn transaction_hash_for(merkle_root: &str) -> String {
        format!("0x{}", &sha3_512_hex(merkle_root.as_bytes())[..64])
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new(WitnessNetwork::Sepolia, "0x0000000000000000000000000000000000000000")
    }
}

#[async_trait]
impl WitnessPlatform for MockPlatform {
    async fn publish(&self, merkle_root: &str) -> WitnessResult<WitnessReceipt> {
        Ok(WitnessReceipt {
            transaction_hash: Self::transaction_hash_for(merkle_root),
            publisher: self.publisher.clone(),
            timestamp: Utc::now().timestamp() as u64,
            network: self.network,
            smart_contract_address: self
                .network
                .contract_address()
                .map(str::to_string),
        })
    }
}
