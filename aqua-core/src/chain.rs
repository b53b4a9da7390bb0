//! In-memory aqua chain store
//!
//! One [`AquaChain`] per chain: an insertion-ordered map of revisions keyed
//! by verification hash, plus the file index mapping content and link hashes
//! to external names. Iteration order over the revisions is the insertion
//! (chronological) order and is part of the contract.
//!
//! The store is single-writer; callers serialize appends to a given chain.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AquaError, AquaResult};
use crate::types::{normalize_hash, Revision, RevisionType};

/// The revision removed by a tip rollback
#[derive(Debug, Clone)]
pub struct RemovedTip {
    /// Storage key of the removed revision
    pub verification_hash: String,
    /// The removed revision itself
    pub revision: Revision,
    /// True when the rollback removed the last revision; the caller should
    /// destroy the chain, since a chain with zero revisions does not exist
    /// as a persisted object
    pub chain_emptied: bool,
}

/// An aqua chain: ordered revisions plus the file index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AquaChain {
    revisions: IndexMap<String, Revision>,
    file_index: IndexMap<String, String>,
}

impl AquaChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the serialized wire form and validate structural invariants
    ///
    /// Checks genesis linkage, inter-revision linkage, and file-index
    /// completeness for file/form and link revisions. Any violation fails
    /// with [`AquaError::CorruptChain`].
    pub fn open(bytes: &[u8]) -> AquaResult<Self> {
        let chain: Self = serde_json::from_slice(bytes)?;
        chain.validate()?;
        Ok(chain)
    }

    /// Serialize to the wire form, keys in insertion order
    pub fn to_bytes(&self) -> AquaResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Verification hash of the latest revision, or `""` when empty
    pub fn tip(&self) -> &str {
        self.revisions
            .last()
            .map(|(key, _)| key.as_str())
            .unwrap_or("")
    }

    /// Ordered revisions, oldest first
    pub fn revisions(&self) -> &IndexMap<String, Revision> {
        &self.revisions
    }

    /// The file index: content/link hash → external name
    pub fn file_index(&self) -> &IndexMap<String, String> {
        &self.file_index
    }

    /// Number of revisions
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Is the chain empty?
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Look up a revision by verification hash, prefix- and
    /// case-insensitively
    pub fn get_revision(&self, verification_hash: &str) -> Option<&Revision> {
        if let Some(revision) = self.revisions.get(verification_hash) {
            return Some(revision);
        }
        let wanted = normalize_hash(verification_hash);
        self.revisions
            .iter()
            .find(|(key, _)| normalize_hash(key) == wanted)
            .map(|(_, revision)| revision)
    }

    /// External name indexed under a hash, prefix- and case-insensitively
    pub fn indexed_name(&self, hash: &str) -> Option<&str> {
        let wanted = normalize_hash(hash);
        self.file_index
            .iter()
            .find(|(key, _)| normalize_hash(key) == wanted)
            .map(|(_, name)| name.as_str())
    }

    /// Does the file index already contain this hash?
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.indexed_name(hash).is_some()
    }

    /// Append a revision at the tip
    ///
    /// `index_entries` are the file-index additions this revision
    /// contributes (content hash or link verification hashes → names). The
    /// builder performs all semantic validation before calling this.
    pub fn append(
        &mut self,
        verification_hash: String,
        revision: Revision,
        index_entries: Vec<(String, String)>,
    ) {
        debug!(
            verification_hash = %verification_hash,
            count = self.revisions.len() + 1,
            "appending revision"
        );
        for (hash, name) in index_entries {
            self.file_index.insert(hash, name);
        }
        self.revisions.insert(verification_hash, revision);
    }

    /// Remove exactly the most-recent revision, reversing its file-index
    /// contributions
    pub fn remove_tip(&mut self) -> AquaResult<RemovedTip> {
        let (verification_hash, revision) =
            self.revisions.pop().ok_or(AquaError::EmptyChain)?;

        let mut removed_hashes: Vec<String> = Vec::new();
        if let Ok(kind) = revision.revision_type() {
            if kind.has_file_content() {
                if let Some(file_hash) = revision.file_hash() {
                    removed_hashes.push(normalize_hash(file_hash));
                }
            }
            if kind == RevisionType::Link {
                if let Some(hashes) = revision.link_verification_hashes() {
                    removed_hashes.extend(hashes.iter().map(|h| normalize_hash(h)));
                }
            }
        }
        self.file_index
            .retain(|key, _| !removed_hashes.contains(&normalize_hash(key)));

        Ok(RemovedTip {
            chain_emptied: self.revisions.is_empty(),
            verification_hash,
            revision,
        })
    }

    /// Validate structural invariants over the loaded chain
    fn validate(&self) -> AquaResult<()> {
        let mut previous_key: Option<&str> = None;

        for (position, (key, revision)) in self.revisions.iter().enumerate() {
            let declared_prev = revision.previous_verification_hash();
            match previous_key {
                None => {
                    if !declared_prev.is_empty() {
                        return Err(AquaError::CorruptChain(format!(
                            "genesis revision {key} declares a previous hash"
                        )));
                    }
                }
                Some(expected) => {
                    if normalize_hash(declared_prev) != normalize_hash(expected) {
                        return Err(AquaError::CorruptChain(format!(
                            "revision {position} does not link to its predecessor"
                        )));
                    }
                }
            }

            let kind = revision
                .revision_type()
                .map_err(|e| AquaError::CorruptChain(e.to_string()))?;
            if kind.has_file_content() {
                let file_hash = revision.file_hash().ok_or_else(|| {
                    AquaError::CorruptChain(format!(
                        "{} revision {position} has no file hash",
                        kind.as_str()
                    ))
                })?;
                if !self.contains_hash(file_hash) {
                    return Err(AquaError::CorruptChain(format!(
                        "file hash of revision {position} missing from file index"
                    )));
                }
            }
            if kind == RevisionType::Link {
                for linked in revision.link_verification_hashes().unwrap_or_default() {
                    if !self.contains_hash(&linked) {
                        return Err(AquaError::CorruptChain(format!(
                            "linked hash {linked} missing from file index"
                        )));
                    }
                }
            }

            previous_key = Some(key);
        }
        Ok(())
    }
}
