//! Verification options

/// Which chain schema the decoder routes to
///
/// The v1.2 schema carried a separate metadata hash and signed a different
/// message; current chains hash the whole payload and sign
/// `"I sign this revision: [...]"`. Both remain part of the wire contract;
/// only the current schema is ever emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    /// Legacy v1.2 chains
    V1_2,
    /// Current schema
    #[default]
    Current,
}

impl SchemaVersion {
    /// Route a semantic version selector to a decoder
    ///
    /// `"1.2"` (with or without a `v` prefix) selects the legacy decoder;
    /// anything later, or unparsable, selects the current one.
    pub fn from_selector(selector: &str) -> Self {
        let trimmed = selector.trim().trim_start_matches('v');
        let mut parts = trimmed.split('.');
        let major: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(u32::MAX);
        let minor: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        if major == 1 && minor <= 2 {
            Self::V1_2
        } else {
            Self::Current
        }
    }
}

/// Options controlling chain verification
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Schema decoder to use
    pub schema: SchemaVersion,
    /// API key for the Ethereum JSON-RPC provider; required for Ethereum
    /// witness verification
    pub rpc_key: Option<String>,
    /// Full JSON-RPC endpoint override; takes precedence over `rpc_key`
    pub rpc_endpoint: Option<String>,
    /// Demote missing sub-results to failures
    pub strict: bool,
    /// Traverse witness Merkle proofs (on by default)
    pub verify_merkle_proof: bool,
}

impl VerifyOptions {
    /// Defaults: current schema, lenient, proofs verified
    pub fn new() -> Self {
        Self {
            verify_merkle_proof: true,
            ..Self::default()
        }
    }

    /// Select the schema by version selector string
    pub fn with_schema_selector(mut self, selector: &str) -> Self {
        self.schema = SchemaVersion::from_selector(selector);
        self
    }

    /// Set the RPC provider key
    pub fn with_rpc_key(mut self, key: impl Into<String>) -> Self {
        self.rpc_key = Some(key.into());
        self
    }

    /// Override the RPC endpoint
    pub fn with_rpc_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.rpc_endpoint = Some(endpoint.into());
        self
    }

    /// Enable strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Toggle Merkle proof traversal
    pub fn with_merkle_proof(mut self, verify: bool) -> Self {
        self.verify_merkle_proof = verify;
        self
    }
}
