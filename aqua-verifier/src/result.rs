//! Verification result records
//!
//! Findings are collected, never thrown: each revision yields five
//! independent sub-results, and the chain result is their conjunction with
//! every per-revision diagnosis retained.

use serde::{Deserialize, Serialize};

use aqua_core::RevisionType;

/// Outcome of one sub-check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The corresponding field is absent from the revision
    Missing,
    /// The check ran and passed
    Pass,
    /// The check ran and failed
    Fail(String),
}

impl CheckOutcome {
    /// Build a failure outcome
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Did the check pass outright?
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Is the check inapplicable to this revision?
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Does the outcome count as passing under the given strictness?
    ///
    /// Missing sub-results pass by default; strict mode demotes them to
    /// failures.
    pub fn passes(&self, strict: bool) -> bool {
        match self {
            Self::Pass => true,
            Self::Missing => !strict,
            Self::Fail(_) => false,
        }
    }
}

/// Verification record for one revision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionVerification {
    /// Storage key of the verified revision
    pub verification_hash: String,
    /// Parsed revision kind, when recognizable
    pub revision_type: Option<RevisionType>,
    /// Predecessor linkage
    pub linkage: CheckOutcome,
    /// File bytes against `file_hash`
    pub file: CheckOutcome,
    /// Payload against the storage key (scalar or Merkle)
    pub content: CheckOutcome,
    /// Signature recovery / verification
    pub signature: CheckOutcome,
    /// Witness anchor cross-check and proof traversal
    pub witness: CheckOutcome,
}

impl RevisionVerification {
    /// Create a record with every sub-result missing
    pub fn new(verification_hash: impl Into<String>) -> Self {
        Self {
            verification_hash: verification_hash.into(),
            revision_type: None,
            linkage: CheckOutcome::Missing,
            file: CheckOutcome::Missing,
            content: CheckOutcome::Missing,
            signature: CheckOutcome::Missing,
            witness: CheckOutcome::Missing,
        }
    }

    /// All sub-results, named for diagnostics
    pub fn outcomes(&self) -> [(&'static str, &CheckOutcome); 5] {
        [
            ("linkage", &self.linkage),
            ("file", &self.file),
            ("content", &self.content),
            ("signature", &self.signature),
            ("witness", &self.witness),
        ]
    }

    /// Does the revision pass under the given strictness?
    pub fn is_valid(&self, strict: bool) -> bool {
        self.outcomes()
            .iter()
            .all(|(_, outcome)| outcome.passes(strict))
    }

    /// Failure messages, prefixed with the sub-check name
    pub fn failures(&self) -> Vec<String> {
        self.outcomes()
            .iter()
            .filter_map(|(name, outcome)| match outcome {
                CheckOutcome::Fail(message) => Some(format!("{name}: {message}")),
                _ => None,
            })
            .collect()
    }
}

/// Verification record for a whole chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainVerification {
    /// Per-revision records, in chain order
    pub revisions: Vec<RevisionVerification>,
    /// Conjunction of all per-revision results
    pub is_valid: bool,
}

impl ChainVerification {
    /// Aggregate per-revision records under the given strictness
    pub fn from_revisions(revisions: Vec<RevisionVerification>, strict: bool) -> Self {
        let is_valid = revisions.iter().all(|r| r.is_valid(strict));
        Self {
            revisions,
            is_valid,
        }
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        if self.is_valid {
            format!("chain verification PASSED ({} revisions)", self.revisions.len())
        } else {
            let failed = self
                .revisions
                .iter()
                .filter(|r| !r.is_valid(false))
                .count();
            format!(
                "chain verification FAILED ({failed} of {} revisions)",
                self.revisions.len()
            )
        }
    }
}
