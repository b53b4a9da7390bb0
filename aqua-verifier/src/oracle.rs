//! Transaction oracle
//!
//! The witness check needs the anchor transaction back from its network.
//! This interface abstracts the fetch; the shipped implementation speaks
//! Ethereum JSON-RPC, and a mock serves tests and offline verification.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use aqua_core::normalize_hash;
use aqua_witness::{NostrEvent, TimestampToken, WitnessNetwork};

use crate::error::{VerifierError, VerifierResult};
use crate::options::VerifyOptions;

/// Default request timeout for RPC fetches
const RPC_TIMEOUT_SECS: u64 = 30;

/// An anchor transaction as fetched back from its network
#[derive(Debug, Clone)]
pub enum WitnessTransaction {
    /// EVM transaction: the call data carries the anchored root
    Ethereum {
        input_data: String,
        sender: Option<String>,
    },
    /// Nostr event published by the witness
    Nostr(NostrEvent),
    /// Verified RFC-3161 timestamp token
    Tsa(TimestampToken),
}

/// Oracle fetch errors
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("transaction not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("network {0} not supported by this oracle")]
    UnsupportedNetwork(String),
}

/// External collaborator fetching anchor transactions
#[async_trait]
pub trait TransactionOracle: Send + Sync {
    /// Fetch the anchor transaction behind a witness revision
    async fn get_transaction(
        &self,
        network: WitnessNetwork,
        tx_hash: &str,
    ) -> Result<WitnessTransaction, OracleError>;
}

// ============================================================================
// Ethereum JSON-RPC oracle
// ============================================================================

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
    #[allow(dead_code)]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcTransaction {
    input: String,
    from: Option<String>,
}

/// JSON-RPC client resolving Ethereum witness transactions
///
/// Built from [`VerifyOptions`]: either a full endpoint override or a
/// provider key expanded into the per-network endpoint. Construction fails
/// with `ConfigMissing` when neither is present.
#[derive(Debug)]
pub struct EthereumRpcOracle {
    client: reqwest::Client,
    rpc_key: Option<String>,
    endpoint_override: Option<String>,
    request_id: AtomicU64,
}

impl EthereumRpcOracle {
    /// Create an oracle from verification options
    pub fn new(options: &VerifyOptions) -> VerifierResult<Self> {
        if options.rpc_key.is_none() && options.rpc_endpoint.is_none() {
            return Err(VerifierError::ConfigMissing(
                "an RPC key or endpoint is required for Ethereum witness verification".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(RPC_TIMEOUT_SECS))
            .build()
            .map_err(|e| VerifierError::Oracle(e.to_string()))?;
        Ok(Self {
            client,
            rpc_key: options.rpc_key.clone(),
            endpoint_override: options.rpc_endpoint.clone(),
            request_id: AtomicU64::new(0),
        })
    }

    fn endpoint(&self, network: WitnessNetwork) -> Result<String, OracleError> {
        if let Some(endpoint) = &self.endpoint_override {
            return Ok(endpoint.clone());
        }
        let key = self
            .rpc_key
            .as_ref()
            .ok_or_else(|| OracleError::Network("no RPC key configured".into()))?;
        let subdomain = match network {
            WitnessNetwork::Mainnet => "eth-mainnet",
            WitnessNetwork::Sepolia => "eth-sepolia",
            WitnessNetwork::Holesky => "eth-holesky",
            other => {
                return Err(OracleError::UnsupportedNetwork(other.as_str().to_string()))
            }
        };
        Ok(format!("https://{subdomain}.g.alchemy.com/v2/{key}"))
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, OracleError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        debug!(method, id, "ethereum rpc call");

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Network(format!("HTTP {status}")));
        }

        let rpc_response: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(OracleError::Network(format!(
                "rpc error {}: {}",
                error.code, error.message
            )));
        }
        Ok(rpc_response.result)
    }
}

#[async_trait]
impl TransactionOracle for EthereumRpcOracle {
    async fn get_transaction(
        &self,
        network: WitnessNetwork,
        tx_hash: &str,
    ) -> Result<WitnessTransaction, OracleError> {
        let endpoint = self.endpoint(network)?;
        let tx_param = format!("0x{}", normalize_hash(tx_hash));

        let transaction: Option<RpcTransaction> = self
            .call(
                &endpoint,
                "eth_getTransactionByHash",
                serde_json::json!([tx_param]),
            )
            .await?;

        match transaction {
            Some(tx) => Ok(WitnessTransaction::Ethereum {
                input_data: tx.input,
                sender: tx.from,
            }),
            None => Err(OracleError::NotFound(tx_hash.to_string())),
        }
    }
}

// ============================================================================
// Mock oracle
// ============================================================================

/// In-memory oracle for tests and offline verification
///
/// Transactions are registered keyed by normalized hash, for any network.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    transactions: HashMap<String, WitnessTransaction>,
}

impl MockOracle {
    /// Create an empty oracle
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transaction under its hash
    pub fn insert(&mut self, tx_hash: &str, transaction: WitnessTransaction) {
        self.transactions
            .insert(normalize_hash(tx_hash), transaction);
    }

    /// Builder-style registration
    pub fn with_transaction(mut self, tx_hash: &str, transaction: WitnessTransaction) -> Self {
        self.insert(tx_hash, transaction);
        self
    }
}

#[async_trait]
impl TransactionOracle for MockOracle {
    async fn get_transaction(
        &self,
        _network: WitnessNetwork,
        tx_hash: &str,
    ) -> Result<WitnessTransaction, OracleError> {
        self.transactions
            .get(&normalize_hash(tx_hash))
            .cloned()
            .ok_or_else(|| OracleError::NotFound(tx_hash.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_requires_key_or_endpoint() {
        let err = EthereumRpcOracle::new(&VerifyOptions::new()).unwrap_err();
        assert!(matches!(err, VerifierError::ConfigMissing(_)));

        let options = VerifyOptions::new().with_rpc_key("test-key");
        assert!(EthereumRpcOracle::new(&options).is_ok());
    }

    #[test]
    fn test_endpoint_expansion() {
        let options = VerifyOptions::new().with_rpc_key("abc");
        let oracle = EthereumRpcOracle::new(&options).unwrap();
        assert_eq!(
            oracle.endpoint(WitnessNetwork::Sepolia).unwrap(),
            "https://eth-sepolia.g.alchemy.com/v2/abc"
        );
        assert!(matches!(
            oracle.endpoint(WitnessNetwork::Nostr),
            Err(OracleError::UnsupportedNetwork(_))
        ));

        let options = VerifyOptions::new().with_rpc_endpoint("http://localhost:8545");
        let oracle = EthereumRpcOracle::new(&options).unwrap();
        assert_eq!(
            oracle.endpoint(WitnessNetwork::Mainnet).unwrap(),
            "http://localhost:8545"
        );
    }

    #[tokio::test]
    async fn test_mock_oracle_lookup() {
        let oracle = MockOracle::new().with_transaction(
            "0xABCD",
            WitnessTransaction::Ethereum {
                input_data: "0x9cef4ea1".into(),
                sender: None,
            },
        );

        assert!(oracle
            .get_transaction(WitnessNetwork::Sepolia, "abcd")
            .await
            .is_ok());
        assert!(matches!(
            oracle
                .get_transaction(WitnessNetwork::Sepolia, "0xffff")
                .await,
            Err(OracleError::NotFound(_))
        ));
    }
}
