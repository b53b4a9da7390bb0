//! Multi-chain witness coordination
//!
//! Aggregates the tip hashes of N chains into one Merkle tree, publishes
//! the root through a [`WitnessPlatform`], and appends a witness revision
//! carrying the shared root and a per-chain proof to every covered chain.
//!
//! All tips included in one batch become causally prior to any later
//! revision on any of the covered chains. Publication happens before any
//! chain is mutated, so a failed or cancelled publish leaves the chains
//! untouched.

use tracing::info;

use aqua_core::{AquaChain, AquaError, MerkleProof, MerkleTree, RevisionBuilder, WitnessInput};

use crate::error::WitnessResult;
use crate::platform::WitnessPlatform;

/// Drives batched witness operations over one platform
///
/// The coordinator borrows each chain mutably, one at a time; the platform
/// client is reusable across batches.
pub struct WitnessCoordinator<P: WitnessPlatform> {
    platform: P,
    builder: RevisionBuilder,
}

impl<P: WitnessPlatform> WitnessCoordinator<P> {
    /// Create a coordinator over a platform
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            builder: RevisionBuilder::new(),
        }
    }

    /// Use a configured revision builder (pinned timestamps etc.)
    pub fn with_builder(mut self, builder: RevisionBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Borrow the underlying platform
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Witness a single chain: the degenerate batch where the root is the
    /// tip itself and the proof is `[tip]`
    pub async fn witness_chain(&self, chain: &mut AquaChain) -> WitnessResult<String> {
        let mut chains = [chain];
        self.witness_chains(&mut chains).await
    }

    /// Witness N chains under one Merkle root
    ///
    /// Returns the shared root. The order of `chains` determines leaf
    /// positions in the tree.
    pub async fn witness_chains(
        &self,
        chains: &mut [&mut AquaChain],
    ) -> WitnessResult<String> {
        let mut tips = Vec::with_capacity(chains.len());
        for chain in chains.iter() {
            if chain.is_empty() {
                return Err(AquaError::EmptyChain.into());
            }
            tips.push(chain.tip().to_string());
        }

        let tree = MerkleTree::from_leaves(tips);
        let root = tree.root().to_string();

        // The only suspension point: nothing is appended until the receipt
        // arrives.
        let receipt = self.platform.publish(&root).await?;
        info!(
            root = %root,
            network = receipt.network.as_str(),
            transaction_hash = %receipt.transaction_hash,
            chains = chains.len(),
            "witness root published"
        );

        for (position, chain) in chains.iter_mut().enumerate() {
            let proof = if tree.leaf_count() == 1 {
                MerkleProof::Tips(vec![root.clone()])
            } else {
                MerkleProof::Tips(tree.sibling_path(position).unwrap_or_default())
            };

            self.builder.witness(
                chain,
                WitnessInput {
                    merkle_root: root.clone(),
                    timestamp: receipt.timestamp,
                    network: receipt.network.as_str().to_string(),
                    smart_contract_address: receipt.smart_contract_address.clone(),
                    transaction_hash: receipt.transaction_hash.clone(),
                    sender_account_address: receipt.publisher.clone(),
                    merkle_proof: proof,
                },
            )?;
        }

        Ok(root)
    }
}
