//! Revision builder
//!
//! Constructs revision payloads for the five kinds and computes their
//! verification hashes. Field insertion order is fixed per kind; the scalar
//! hash covers the canonical JSON of the assembled map, and form revisions
//! are hashed in Merkle mode with the leaf list persisted under `leaves`.
//!
//! All semantic validation happens before the chain is touched, so a failed
//! build leaves the chain unchanged.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand_core::{OsRng, RngCore};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::canon::{field_leaves, scalar_verification_hash, sha3_512_hex};
use crate::chain::AquaChain;
use crate::constants::{
    signature_message, AQUA_FILE_SUFFIX, FILE_NONCE_LENGTH_BYTES, FORM_FIELD_PREFIX,
    LEAVES_FIELD, LINK_TYPE_AQUA, TIMESTAMP_FORMAT,
};
use crate::crypto::merkle::{MerkleProof, MerkleTree};
use crate::error::{AquaError, AquaResult};
use crate::signature::{SignatureBundle, Signer};
use crate::types::{normalize_hash, Revision, RevisionType};

/// Inputs for a form revision
#[derive(Debug, Clone)]
pub struct FormRevisionInput {
    /// External name of the form source file
    pub name: String,
    /// Raw bytes of the form source file
    pub bytes: Vec<u8>,
    /// Form fields, promoted to `forms_<key>` in input order
    pub fields: Map<String, Value>,
}

/// One chain cited by a link revision
#[derive(Debug, Clone)]
pub struct LinkTarget {
    /// External name of the linked aqua object
    pub uri: String,
    /// Tip verification hash of the linked chain
    pub verification_hash: String,
    /// SHA3-512 of the raw bytes of the linked aqua file
    pub file_hash: String,
}

/// Inputs for a link revision
#[derive(Debug, Clone)]
pub struct LinkRevisionInput {
    /// Require linked chains to be verified in depth
    pub require_indepth_verification: bool,
    /// The cited chains
    pub targets: Vec<LinkTarget>,
}

/// Inputs for a witness revision, produced by a witness backend
#[derive(Debug, Clone)]
pub struct WitnessInput {
    /// Merkle root the backend published
    pub merkle_root: String,
    /// Seconds since epoch at publication
    pub timestamp: u64,
    /// Witness network name
    pub network: String,
    /// Contract the anchor transaction was sent to, when applicable
    pub smart_contract_address: Option<String>,
    /// Transaction hash / event id / token serial
    pub transaction_hash: String,
    /// Publishing account
    pub sender_account_address: String,
    /// This chain's Merkle proof against the root
    pub merkle_proof: MerkleProof,
}

/// Builder for appending revisions to a chain
///
/// The default configuration stamps revisions with the current UTC time and
/// a fresh random file nonce; both can be pinned for reproducible builds.
#[derive(Debug, Clone, Default)]
pub struct RevisionBuilder {
    timestamp_override: Option<String>,
    nonce_override: Option<String>,
    embed_content: bool,
    merkle_mode: bool,
}

impl RevisionBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `local_timestamp` to a fixed `YYYYMMDDHHMMSS` value
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp_override = Some(timestamp.into());
        self
    }

    /// Pin the file nonce instead of drawing a random one
    pub fn with_file_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce_override = Some(nonce.into());
        self
    }

    /// Embed file bytes inline under `content`
    pub fn with_embedded_content(mut self, embed: bool) -> Self {
        self.embed_content = embed;
        self
    }

    /// Hash every revision in Merkle mode
    ///
    /// Form revisions are always Merkle-hashed; this opts the other kinds
    /// in as well.
    pub fn with_merkle_revisions(mut self, merkle: bool) -> Self {
        self.merkle_mode = merkle;
        self
    }

    fn timestamp(&self) -> String {
        self.timestamp_override
            .clone()
            .unwrap_or_else(|| Utc::now().format(TIMESTAMP_FORMAT).to_string())
    }

    fn nonce(&self) -> String {
        self.nonce_override.clone().unwrap_or_else(|| {
            let mut bytes = [0u8; FILE_NONCE_LENGTH_BYTES];
            OsRng.fill_bytes(&mut bytes);
            URL_SAFE_NO_PAD.encode(bytes)
        })
    }

    fn skeleton(&self, chain: &AquaChain, kind: RevisionType) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(
            "previous_verification_hash".into(),
            json!(chain.tip().to_string()),
        );
        fields.insert("local_timestamp".into(), json!(self.timestamp()));
        fields.insert("revision_type".into(), json!(kind.as_str()));
        fields
    }

    fn append_revision(
        &self,
        chain: &mut AquaChain,
        fields: Map<String, Value>,
        index_entries: Vec<(String, String)>,
    ) -> AquaResult<String> {
        if self.merkle_mode {
            return self.append_merkle(chain, fields, index_entries);
        }
        let verification_hash = scalar_verification_hash(&fields)?;
        chain.append(
            verification_hash.clone(),
            Revision::from_fields(fields),
            index_entries,
        );
        Ok(verification_hash)
    }

    fn append_merkle(
        &self,
        chain: &mut AquaChain,
        mut fields: Map<String, Value>,
        index_entries: Vec<(String, String)>,
    ) -> AquaResult<String> {
        let leaves = field_leaves(&fields);
        let verification_hash = MerkleTree::from_leaves(leaves.clone()).root().to_string();
        fields.insert(LEAVES_FIELD.into(), json!(leaves));
        chain.append(
            verification_hash.clone(),
            Revision::from_fields(fields),
            index_entries,
        );
        Ok(verification_hash)
    }

    /// Does any file/form revision in the chain already carry this hash?
    fn has_content_hash(chain: &AquaChain, file_hash: &str) -> bool {
        let wanted = normalize_hash(file_hash);
        chain.revisions().values().any(|revision| {
            revision
                .revision_type()
                .map(|kind| kind.has_file_content())
                .unwrap_or(false)
                && revision
                    .file_hash()
                    .map(|existing| normalize_hash(existing) == wanted)
                    .unwrap_or(false)
        })
    }

    /// Append a file revision
    ///
    /// The genesis revision of most chains. Fails with
    /// [`AquaError::DuplicateContent`] when the chain already carries these
    /// bytes.
    pub fn file(&self, chain: &mut AquaChain, name: &str, bytes: &[u8]) -> AquaResult<String> {
        let file_hash = sha3_512_hex(bytes);
        if Self::has_content_hash(chain, &file_hash) {
            return Err(AquaError::DuplicateContent(file_hash));
        }

        let mut fields = self.skeleton(chain, RevisionType::File);
        fields.insert("file_hash".into(), json!(file_hash));
        fields.insert("file_nonce".into(), json!(self.nonce()));
        if self.embed_content {
            fields.insert(
                "content".into(),
                json!(String::from_utf8_lossy(bytes).into_owned()),
            );
        }

        debug!(name, file_hash = %fields["file_hash"], "building file revision");
        self.append_revision(chain, fields, vec![(file_hash, name.to_string())])
    }

    /// Append a form revision
    ///
    /// Carries the file-kind fields plus every form field promoted to
    /// `forms_<key>`; hashed in Merkle mode.
    pub fn form(&self, chain: &mut AquaChain, input: FormRevisionInput) -> AquaResult<String> {
        let file_hash = sha3_512_hex(&input.bytes);
        if Self::has_content_hash(chain, &file_hash) {
            return Err(AquaError::DuplicateContent(file_hash));
        }

        let mut fields = self.skeleton(chain, RevisionType::Form);
        fields.insert("file_hash".into(), json!(file_hash));
        fields.insert("file_nonce".into(), json!(self.nonce()));
        if self.embed_content {
            fields.insert(
                "content".into(),
                json!(String::from_utf8_lossy(&input.bytes).into_owned()),
            );
        }
        for (key, value) in &input.fields {
            fields.insert(format!("{FORM_FIELD_PREFIX}{key}"), value.clone());
        }

        debug!(name = %input.name, "building form revision");
        self.append_merkle(chain, fields, vec![(file_hash, input.name)])
    }

    /// Append a signature revision, delegating to a [`Signer`]
    ///
    /// The signed message binds the chain tip:
    /// `"I sign this revision: [<tip>]"`.
    pub fn signature(&self, chain: &mut AquaChain, signer: &dyn Signer) -> AquaResult<String> {
        if chain.is_empty() {
            return Err(AquaError::EmptyChain);
        }
        let message = signature_message(chain.tip());
        let bundle = signer.sign(message.as_bytes())?;
        self.signature_from_bundle(chain, bundle)
    }

    /// Append a signature revision from a pre-produced bundle
    ///
    /// Used when the signature came from an external wallet flow.
    pub fn signature_from_bundle(
        &self,
        chain: &mut AquaChain,
        bundle: SignatureBundle,
    ) -> AquaResult<String> {
        if chain.is_empty() {
            return Err(AquaError::EmptyChain);
        }

        let mut fields = self.skeleton(chain, RevisionType::Signature);
        fields.insert("signature".into(), json!(bundle.signature));
        fields.insert("signature_public_key".into(), json!(bundle.public_key));
        fields.insert(
            "signature_wallet_address".into(),
            json!(bundle.wallet_address),
        );
        fields.insert("signature_type".into(), json!(bundle.scheme.as_str()));

        self.append_revision(chain, fields, vec![])
    }

    /// Append a witness revision recording a published anchor
    pub fn witness(&self, chain: &mut AquaChain, input: WitnessInput) -> AquaResult<String> {
        if chain.is_empty() {
            return Err(AquaError::EmptyChain);
        }

        let mut fields = self.skeleton(chain, RevisionType::Witness);
        fields.insert("witness_merkle_root".into(), json!(input.merkle_root));
        fields.insert("witness_timestamp".into(), json!(input.timestamp));
        fields.insert("witness_network".into(), json!(input.network));
        if let Some(contract) = &input.smart_contract_address {
            fields.insert("witness_smart_contract_address".into(), json!(contract));
        }
        fields.insert(
            "witness_transaction_hash".into(),
            json!(input.transaction_hash),
        );
        fields.insert(
            "witness_sender_account_address".into(),
            json!(input.sender_account_address),
        );
        fields.insert(
            "witness_merkle_proof".into(),
            input.merkle_proof.to_value(),
        );

        self.append_revision(chain, fields, vec![])
    }

    /// Append a link revision citing the tips of other chains
    ///
    /// Fails with [`AquaError::InvalidLink`] when a target URI names an aqua
    /// file directly or a linked file hash is already indexed.
    pub fn link(&self, chain: &mut AquaChain, input: LinkRevisionInput) -> AquaResult<String> {
        for target in &input.targets {
            if target.uri.ends_with(AQUA_FILE_SUFFIX) {
                return Err(AquaError::InvalidLink(format!(
                    "cannot link an aqua file directly: {}",
                    target.uri
                )));
            }
            if chain.contains_hash(&target.file_hash) {
                return Err(AquaError::InvalidLink(format!(
                    "file hash {} is already indexed by this chain",
                    target.file_hash
                )));
            }
        }

        let verification_hashes: Vec<&str> = input
            .targets
            .iter()
            .map(|t| t.verification_hash.as_str())
            .collect();
        let file_hashes: Vec<&str> =
            input.targets.iter().map(|t| t.file_hash.as_str()).collect();

        let mut fields = self.skeleton(chain, RevisionType::Link);
        fields.insert("link_type".into(), json!(LINK_TYPE_AQUA));
        fields.insert(
            "link_require_indepth_verification".into(),
            json!(input.require_indepth_verification),
        );
        fields.insert("link_verification_hashes".into(), json!(verification_hashes));
        fields.insert("link_file_hashes".into(), json!(file_hashes));

        let index_entries = input
            .targets
            .iter()
            .map(|t| (t.verification_hash.clone(), t.uri.clone()))
            .collect();
        self.append_revision(chain, fields, index_entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::EthereumSigner;

    fn pinned_builder() -> RevisionBuilder {
        RevisionBuilder::new()
            .with_timestamp("20240101000000")
            .with_file_nonce("dGVzdC1ub25jZQ")
    }

    #[test]
    fn test_genesis_file_revision() {
        let mut chain = AquaChain::new();
        let vhash = pinned_builder()
            .file(&mut chain, "hello.txt", b"hello\n")
            .unwrap();

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.tip(), vhash);
        assert!(vhash.starts_with("0x"));

        let revision = chain.get_revision(&vhash).unwrap();
        assert_eq!(revision.previous_verification_hash(), "");
        assert_eq!(revision.revision_type().unwrap(), RevisionType::File);
        assert_eq!(
            revision.file_hash().unwrap(),
            sha3_512_hex(b"hello\n")
        );
        assert_eq!(
            chain.indexed_name(&sha3_512_hex(b"hello\n")),
            Some("hello.txt")
        );
    }

    #[test]
    fn test_verification_hash_matches_canonical_json() {
        let mut chain = AquaChain::new();
        let vhash = pinned_builder()
            .file(&mut chain, "hello.txt", b"hello\n")
            .unwrap();

        let revision = chain.get_revision(&vhash).unwrap();
        let recomputed = scalar_verification_hash(revision.fields()).unwrap();
        assert_eq!(vhash, recomputed);
    }

    #[test]
    fn test_builder_is_deterministic() {
        let build = || {
            let mut chain = AquaChain::new();
            pinned_builder()
                .file(&mut chain, "hello.txt", b"hello\n")
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_duplicate_content_rejected_and_chain_unchanged() {
        let mut chain = AquaChain::new();
        let builder = pinned_builder();
        builder.file(&mut chain, "hello.txt", b"hello\n").unwrap();
        let before = chain.to_bytes().unwrap();

        let err = builder
            .file(&mut chain, "copy.txt", b"hello\n")
            .unwrap_err();
        assert!(matches!(err, AquaError::DuplicateContent(_)));
        assert_eq!(chain.to_bytes().unwrap(), before);
    }

    #[test]
    fn test_form_revision_is_merkle_mode() {
        let mut chain = AquaChain::new();
        let mut form_fields = Map::new();
        form_fields.insert("name".into(), json!("Alice"));
        form_fields.insert("age".into(), json!(30));

        let vhash = pinned_builder()
            .form(
                &mut chain,
                FormRevisionInput {
                    name: "intake.json".into(),
                    bytes: b"{\"name\":\"Alice\"}".to_vec(),
                    fields: form_fields,
                },
            )
            .unwrap();

        let revision = chain.get_revision(&vhash).unwrap();
        assert!(revision.is_merkle());
        assert_eq!(revision.get("forms_name").unwrap(), &json!("Alice"));
        assert_eq!(revision.get("forms_age").unwrap(), &json!(30));

        // The root over the recomputed leaves is the storage key
        let leaves = field_leaves(&revision.fields_without_leaves());
        assert_eq!(revision.leaves().unwrap(), leaves);
        assert_eq!(MerkleTree::from_leaves(leaves).root(), vhash);
    }

    #[test]
    fn test_signature_revision_binds_parent() {
        let mut chain = AquaChain::new();
        let builder = pinned_builder();
        let parent = builder.file(&mut chain, "hello.txt", b"hello\n").unwrap();

        let signer = EthereumSigner::generate();
        let vhash = builder.signature(&mut chain, &signer).unwrap();

        let revision = chain.get_revision(&vhash).unwrap();
        assert_eq!(revision.previous_verification_hash(), parent);
        assert_eq!(revision.signature_type(), Some("ethereum:eip-191"));
        assert_eq!(
            revision.signature_wallet_address().unwrap(),
            signer.address()
        );
    }

    #[test]
    fn test_signature_on_empty_chain_rejected() {
        let mut chain = AquaChain::new();
        let signer = EthereumSigner::generate();
        assert!(matches!(
            pinned_builder().signature(&mut chain, &signer),
            Err(AquaError::EmptyChain)
        ));
    }

    #[test]
    fn test_link_revision_indexes_targets() {
        let mut chain = AquaChain::new();
        let builder = pinned_builder();
        builder.file(&mut chain, "hello.txt", b"hello\n").unwrap();

        let vhash = builder
            .link(
                &mut chain,
                LinkRevisionInput {
                    require_indepth_verification: false,
                    targets: vec![LinkTarget {
                        uri: "other-document".into(),
                        verification_hash: "0xfeed".into(),
                        file_hash: sha3_512_hex(b"other aqua bytes"),
                    }],
                },
            )
            .unwrap();

        let revision = chain.get_revision(&vhash).unwrap();
        assert_eq!(
            revision.link_verification_hashes().unwrap(),
            vec!["0xfeed".to_string()]
        );
        assert_eq!(chain.indexed_name("0xfeed"), Some("other-document"));
    }

    #[test]
    fn test_link_to_aqua_file_rejected() {
        let mut chain = AquaChain::new();
        let builder = pinned_builder();
        builder.file(&mut chain, "hello.txt", b"hello\n").unwrap();
        let before = chain.to_bytes().unwrap();

        let err = builder
            .link(
                &mut chain,
                LinkRevisionInput {
                    require_indepth_verification: false,
                    targets: vec![LinkTarget {
                        uri: "other.aqua.json".into(),
                        verification_hash: "0xfeed".into(),
                        file_hash: "aa".into(),
                    }],
                },
            )
            .unwrap_err();
        assert!(matches!(err, AquaError::InvalidLink(_)));
        assert_eq!(chain.to_bytes().unwrap(), before);
    }

    #[test]
    fn test_link_with_indexed_file_hash_rejected() {
        let mut chain = AquaChain::new();
        let builder = pinned_builder();
        builder.file(&mut chain, "hello.txt", b"hello\n").unwrap();
        let before = chain.to_bytes().unwrap();

        let err = builder
            .link(
                &mut chain,
                LinkRevisionInput {
                    require_indepth_verification: false,
                    targets: vec![LinkTarget {
                        uri: "other-document".into(),
                        verification_hash: "0xfeed".into(),
                        // Hash already present via the file revision
                        file_hash: sha3_512_hex(b"hello\n"),
                    }],
                },
            )
            .unwrap_err();
        assert!(matches!(err, AquaError::InvalidLink(_)));
        assert_eq!(chain.to_bytes().unwrap(), before);
    }

    #[test]
    fn test_opt_in_merkle_mode_for_file_revisions() {
        let mut chain = AquaChain::new();
        let vhash = pinned_builder()
            .with_merkle_revisions(true)
            .file(&mut chain, "hello.txt", b"hello\n")
            .unwrap();

        let revision = chain.get_revision(&vhash).unwrap();
        assert!(revision.is_merkle());
        assert!(!vhash.starts_with("0x"));

        let leaves = field_leaves(&revision.fields_without_leaves());
        assert_eq!(MerkleTree::from_leaves(leaves).root(), vhash);
    }

    #[test]
    fn test_embedded_content() {
        let mut chain = AquaChain::new();
        let vhash = pinned_builder()
            .with_embedded_content(true)
            .file(&mut chain, "hello.txt", b"hello\n")
            .unwrap();

        let revision = chain.get_revision(&vhash).unwrap();
        assert_eq!(revision.content(), Some("hello\n"));
    }
}
