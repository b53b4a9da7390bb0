//! Ethereum witness transport: networks and calldata codec
//!
//! An Ethereum witness publishes the 64-byte SHA3-512 Merkle root as call
//! data to the witness contract: the 4-byte event selector followed by the
//! root. Both the builder and the verifier go through this codec, so the
//! selector check cannot drift between them.

use serde::{Deserialize, Serialize};

use aqua_core::constants::{DIGEST_LENGTH_HEX, WITNESS_EVENT_SELECTOR};
use aqua_core::normalize_hash;

use crate::error::{WitnessError, WitnessResult};

/// The witness contract deployed on the supported EVM networks
pub const WITNESS_CONTRACT_ADDRESS: &str = "0x45f59310add88e6d23ca58a0fa7a55bee6d2a611";

/// Witness networks recognized on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WitnessNetwork {
    #[serde(rename = "mainnet")]
    Mainnet,
    #[serde(rename = "sepolia")]
    Sepolia,
    #[serde(rename = "holesky")]
    Holesky,
    #[serde(rename = "nostr")]
    Nostr,
    #[serde(rename = "TSA_RFC3161")]
    TsaRfc3161,
}

impl WitnessNetwork {
    /// Get the wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Sepolia => "sepolia",
            Self::Holesky => "holesky",
            Self::Nostr => "nostr",
            Self::TsaRfc3161 => "TSA_RFC3161",
        }
    }

    /// Parse from the wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mainnet" => Some(Self::Mainnet),
            "sepolia" => Some(Self::Sepolia),
            "holesky" => Some(Self::Holesky),
            "nostr" => Some(Self::Nostr),
            "TSA_RFC3161" => Some(Self::TsaRfc3161),
            _ => None,
        }
    }

    /// EVM chain id, for the Ethereum networks
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Self::Mainnet => Some(1),
            Self::Sepolia => Some(11_155_111),
            Self::Holesky => Some(17_000),
            Self::Nostr | Self::TsaRfc3161 => None,
        }
    }

    /// Is this an EVM network?
    pub fn is_ethereum(&self) -> bool {
        self.chain_id().is_some()
    }

    /// Contract address anchors are sent to, for the Ethereum networks
    pub fn contract_address(&self) -> Option<&'static str> {
        self.is_ethereum().then_some(WITNESS_CONTRACT_ADDRESS)
    }
}

/// Build the anchor transaction call data for a Merkle root
///
/// Layout: `0x` + 4-byte selector + the 128 hex chars of the root.
pub fn witness_calldata(merkle_root: &str) -> WitnessResult<String> {
    let root = normalize_hash(merkle_root);
    if root.len() != DIGEST_LENGTH_HEX || hex::decode(&root).is_err() {
        return Err(WitnessError::InvalidRoot(format!(
            "expected {DIGEST_LENGTH_HEX} hex chars, got {:?}",
            merkle_root
        )));
    }
    Ok(format!("0x{WITNESS_EVENT_SELECTOR}{root}"))
}

/// Extract the Merkle root from anchor transaction input data
///
/// Returns `None` when the data does not begin with the witness selector or
/// is too short to carry a root.
pub fn parse_witness_calldata(input_data: &str) -> Option<String> {
    let data = normalize_hash(input_data);
    let root = data.strip_prefix(WITNESS_EVENT_SELECTOR)?;
    if root.len() < DIGEST_LENGTH_HEX {
        return None;
    }
    Some(root[..DIGEST_LENGTH_HEX].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqua_core::canon::sha3_512_hex;

    #[test]
    fn test_calldata_roundtrip() {
        let root = sha3_512_hex(b"root material");
        let calldata = witness_calldata(&root).unwrap();
        assert!(calldata.starts_with("0x9cef4ea1"));
        assert_eq!(parse_witness_calldata(&calldata).unwrap(), root);
    }

    #[test]
    fn test_calldata_rejects_short_root() {
        assert!(matches!(
            witness_calldata("0xdeadbeef"),
            Err(WitnessError::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_parse_rejects_foreign_selector() {
        let root = sha3_512_hex(b"root material");
        let foreign = format!("0xdeadbeef{root}");
        assert!(parse_witness_calldata(&foreign).is_none());
    }

    #[test]
    fn test_network_registry() {
        assert_eq!(WitnessNetwork::Mainnet.chain_id(), Some(1));
        assert_eq!(WitnessNetwork::Sepolia.chain_id(), Some(11_155_111));
        assert_eq!(WitnessNetwork::Holesky.chain_id(), Some(17_000));
        assert!(WitnessNetwork::Nostr.chain_id().is_none());
        assert!(WitnessNetwork::Sepolia.contract_address().is_some());
        assert!(WitnessNetwork::TsaRfc3161.contract_address().is_none());
        assert_eq!(
            WitnessNetwork::parse("TSA_RFC3161"),
            Some(WitnessNetwork::TsaRfc3161)
        );
        assert_eq!(WitnessNetwork::parse("goerli"), None);
    }
}
