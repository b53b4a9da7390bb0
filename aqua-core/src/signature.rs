//! Signer interfaces and signature primitives
//!
//! The chain core consumes signatures produced elsewhere (browser wallets,
//! key services) through the [`Signer`] trait; it supplies the exact message
//! bytes and never a pre-hashed digest. Two local implementations are
//! provided: an Ethereum EIP-191 personal-sign key and an Ed25519 `did:key`
//! key.
//!
//! Recovery and verification helpers live here as well so the verifier and
//! the builder share one implementation of the message algebra.

use ed25519_dalek::Verifier as _;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::{AquaError, AquaResult};
use crate::types::normalize_hash;

/// Supported signature schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureScheme {
    /// Ethereum personal-sign (EIP-191) over secp256k1
    #[serde(rename = "ethereum:eip-191")]
    EthereumEip191,
    /// Ed25519 signature bound to a did:key identity
    #[serde(rename = "did:key")]
    DidKey,
}

impl SignatureScheme {
    /// Get the wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EthereumEip191 => "ethereum:eip-191",
            Self::DidKey => "did:key",
        }
    }

    /// Parse from the wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ethereum:eip-191" => Some(Self::EthereumEip191),
            "did:key" => Some(Self::DidKey),
            _ => None,
        }
    }
}

/// Everything a signature revision records about one signing act
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureBundle {
    /// Signature bytes, hex
    pub signature: String,
    /// Declared signer identity (wallet address or did:key)
    pub wallet_address: String,
    /// Signer public key, hex
    pub public_key: String,
    /// Scheme the signature was produced under
    pub scheme: SignatureScheme,
}

/// External collaborator producing signatures over exact message bytes
pub trait Signer: Send + Sync {
    /// Sign a message; the implementation hashes per its own scheme
    fn sign(&self, message: &[u8]) -> AquaResult<SignatureBundle>;
}

// ============================================================================
// EIP-191 personal sign
// ============================================================================

/// Keccak-256 digest of the EIP-191 personal-sign envelope
///
/// The signed payload is `"\x19Ethereum Signed Message:\n" || len || message`.
pub fn eip191_digest(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

fn ethereum_address(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let mut hasher = Keccak256::new();
    hasher.update(&point.as_bytes()[1..]);
    let digest = hasher.finalize();
    format!("0x{}", hex::encode(&digest[12..]))
}

/// Recover the signer address from an EIP-191 signature
///
/// `signature_hex` is the 65-byte `r || s || v` wallet signature; `v` is
/// accepted both raw (0/1) and offset (27/28).
pub fn recover_ethereum_address(message: &[u8], signature_hex: &str) -> AquaResult<String> {
    let bytes = hex::decode(normalize_hash(signature_hex))
        .map_err(|e| AquaError::Signature(format!("invalid signature hex: {e}")))?;
    if bytes.len() != 65 {
        return Err(AquaError::Signature(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }

    let v = bytes[64];
    let recovery = RecoveryId::try_from(if v >= 27 { v - 27 } else { v })
        .map_err(|e| AquaError::Signature(format!("invalid recovery id: {e}")))?;
    let signature = EcdsaSignature::from_slice(&bytes[..64])
        .map_err(|e| AquaError::Signature(format!("malformed signature: {e}")))?;

    let digest = eip191_digest(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery)
        .map_err(|e| AquaError::Signature(format!("recovery failed: {e}")))?;
    Ok(ethereum_address(&key))
}

/// Local secp256k1 key signing with EIP-191 personal sign
#[derive(Clone)]
pub struct EthereumSigner {
    signing_key: SigningKey,
}

impl EthereumSigner {
    /// Generate a new random key
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Create from a 32-byte secret key
    pub fn from_bytes(bytes: &[u8; 32]) -> AquaResult<Self> {
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|e| AquaError::Signature(format!("invalid secret key: {e}")))?;
        Ok(Self { signing_key })
    }

    /// Create from a hex-encoded secret key
    pub fn from_hex(hex_str: &str) -> AquaResult<Self> {
        let bytes = hex::decode(normalize_hash(hex_str))
            .map_err(|e| AquaError::Signature(format!("invalid hex: {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AquaError::Signature("secret key must be 32 bytes".into()))?;
        Self::from_bytes(&arr)
    }

    /// The checksummed-free lowercase wallet address
    pub fn address(&self) -> String {
        ethereum_address(self.signing_key.verifying_key())
    }

    /// Uncompressed public key, hex
    pub fn public_key_hex(&self) -> String {
        hex::encode(
            self.signing_key
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes(),
        )
    }
}

impl Signer for EthereumSigner {
    fn sign(&self, message: &[u8]) -> AquaResult<SignatureBundle> {
        let digest = eip191_digest(message);
        let (signature, recovery) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| AquaError::Signature(format!("signing failed: {e}")))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(27 + recovery.to_byte());

        Ok(SignatureBundle {
            signature: format!("0x{}", hex::encode(bytes)),
            wallet_address: self.address(),
            public_key: self.public_key_hex(),
            scheme: SignatureScheme::EthereumEip191,
        })
    }
}

// ============================================================================
// did:key (Ed25519)
// ============================================================================

/// Verify an Ed25519 `did:key` signature against the embedded public key
pub fn verify_did_key_signature(
    message: &[u8],
    signature_hex: &str,
    public_key_hex: &str,
) -> AquaResult<bool> {
    let sig_bytes = hex::decode(normalize_hash(signature_hex))
        .map_err(|e| AquaError::Signature(format!("invalid signature hex: {e}")))?;
    let sig_arr: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| AquaError::Signature("ed25519 signature must be 64 bytes".into()))?;

    let key_bytes = hex::decode(normalize_hash(public_key_hex))
        .map_err(|e| AquaError::Signature(format!("invalid public key hex: {e}")))?;
    let key_arr: [u8; 32] = key_bytes
        .try_into()
        .map_err(|_| AquaError::Signature("ed25519 public key must be 32 bytes".into()))?;
    let key = ed25519_dalek::VerifyingKey::from_bytes(&key_arr)
        .map_err(|e| AquaError::Signature(format!("invalid public key: {e}")))?;

    let signature = ed25519_dalek::Signature::from_bytes(&sig_arr);
    Ok(key.verify(message, &signature).is_ok())
}

/// Local Ed25519 key signing under a did:key identity
#[derive(Clone)]
pub struct DidKeySigner {
    signing_key: ed25519_dalek::SigningKey,
}

impl DidKeySigner {
    /// Generate a new random key
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut OsRng),
        }
    }

    /// Create from a 32-byte secret key
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(bytes),
        }
    }

    /// Hex public key
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// The did:key identity string
    pub fn did(&self) -> String {
        format!("did:key:{}", self.public_key_hex())
    }
}

impl Signer for DidKeySigner {
    fn sign(&self, message: &[u8]) -> AquaResult<SignatureBundle> {
        let signature = ed25519_dalek::Signer::sign(&self.signing_key, message);
        Ok(SignatureBundle {
            signature: hex::encode(signature.to_bytes()),
            wallet_address: self.did(),
            public_key: self.public_key_hex(),
            scheme: SignatureScheme::DidKey,
        })
    }
}
