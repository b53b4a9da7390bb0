//! Witness anchoring for aqua chains
//!
//! Witnessing publishes a Merkle root covering the tips of one or more
//! chains to an external system (an EVM chain, Nostr, or an RFC-3161
//! timestamp authority) and records the act as a witness revision on every
//! covered chain.
//!
//! The anchoring transports themselves are pluggable behind
//! [`WitnessPlatform`]; this crate ships the Ethereum calldata codec and
//! network registry, the receipt shapes for the non-EVM backends, and the
//! [`WitnessCoordinator`] that drives the multi-chain batch operation.

pub mod coordinator;
pub mod error;
pub mod ethereum;
pub mod nostr;
pub mod platform;
pub mod tsa;

pub use coordinator::WitnessCoordinator;
pub use error::{WitnessError, WitnessResult};
pub use ethereum::{
    parse_witness_calldata, witness_calldata, WitnessNetwork, WITNESS_CONTRACT_ADDRESS,
};
pub use nostr::NostrEvent;
pub use platform::{MockPlatform, WitnessPlatform, WitnessReceipt};
pub use tsa::TimestampToken;
