//! Intent signing wallet.
//!
//! Holds the private key for one of the two supported algorithms and produces
//! raw 64-byte signatures over the digest pipeline's signing bytes.

use alloy_primitives::keccak256;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use ed25519_dalek::{Signer as _, SigningKey};
use intent_core::signing::{DigestPipeline, KeyType, PublicKey, RawSignature, SignedIntent};
use intent_core::types::OrderIntent;
use std::str::FromStr;
use tracing::debug;

/// PKCS#8 prefix of a DER-encoded Ed25519 private key.
const ED25519_PKCS8_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// DER prefix of a secp256k1 private key as exported by the ledger's tools.
const SECP256K1_DER_PREFIX: [u8; 18] = [
    0x30, 0x30, 0x02, 0x01, 0x00, 0x30, 0x07, 0x06, 0x05, 0x2b, 0x81, 0x04, 0x00, 0x0a, 0x04,
    0x22, 0x04, 0x20,
];

/// A wallet able to sign order intents.
#[derive(Clone)]
pub enum IntentWallet {
    Ecdsa(PrivateKeySigner),
    Ed25519(SigningKey),
}

impl IntentWallet {
    /// Load the wallet from `INTENT_PRIVATE_KEY` and `INTENT_KEY_TYPE`.
    ///
    /// The key type defaults to `ECDSA_SECP256K1`.
    pub fn from_env() -> Result<Self> {
        let private_key = std::env::var("INTENT_PRIVATE_KEY")
            .context("INTENT_PRIVATE_KEY environment variable not set")?;

        let key_type = match std::env::var("INTENT_KEY_TYPE") {
            Ok(value) => value
                .parse::<KeyType>()
                .context("Invalid INTENT_KEY_TYPE")?,
            Err(_) => KeyType::EcdsaSecp256k1,
        };

        Self::from_private_key(key_type, &private_key)
    }

    /// Create a wallet from a hex-encoded private key, raw or DER-prefixed.
    pub fn from_private_key(key_type: KeyType, key: &str) -> Result<Self> {
        let bytes = hex::decode(key.trim().trim_start_matches("0x"))
            .context("Private key is not valid hex")?;

        match key_type {
            KeyType::EcdsaSecp256k1 => {
                let raw = bytes
                    .strip_prefix(&SECP256K1_DER_PREFIX[..])
                    .unwrap_or(&bytes);
                let signer = PrivateKeySigner::from_str(&hex::encode(raw))
                    .context("Invalid private key format - expected 32 bytes of hex")?;
                Ok(IntentWallet::Ecdsa(signer))
            }
            KeyType::Ed25519 => {
                let raw = bytes
                    .strip_prefix(&ED25519_PKCS8_PREFIX[..])
                    .unwrap_or(&bytes);
                let Ok(seed) = <[u8; 32]>::try_from(raw) else {
                    bail!("Invalid Ed25519 private key - expected 32 bytes, got {}", raw.len());
                };
                Ok(IntentWallet::Ed25519(SigningKey::from_bytes(&seed)))
            }
        }
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            IntentWallet::Ecdsa(_) => KeyType::EcdsaSecp256k1,
            IntentWallet::Ed25519(_) => KeyType::Ed25519,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            IntentWallet::Ecdsa(signer) => {
                PublicKey::EcdsaSecp256k1(*signer.credential().verifying_key())
            }
            IntentWallet::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
        }
    }

    /// Sign raw message bytes with the algorithm's primitive.
    ///
    /// secp256k1 signs `keccak256(message)` and drops the recovery byte;
    /// Ed25519 signs `message` directly.
    pub fn sign_bytes(&self, message: &[u8]) -> Result<RawSignature> {
        match self {
            IntentWallet::Ecdsa(signer) => {
                let signature = signer
                    .sign_hash_sync(&keccak256(message))
                    .context("secp256k1 signing failed")?;
                let bytes = signature.as_bytes();
                Ok(RawSignature::from_slice(&bytes[..64])?)
            }
            IntentWallet::Ed25519(key) => {
                Ok(RawSignature::from_array(key.sign(message).to_bytes()))
            }
        }
    }

    /// Run the digest pipeline for `intent` and sign the result.
    pub fn sign_intent(&self, intent: &OrderIntent) -> Result<SignedIntent> {
        self.sign_intent_with(&DigestPipeline::default(), intent)
    }

    pub fn sign_intent_with(
        &self,
        pipeline: &DigestPipeline,
        intent: &OrderIntent,
    ) -> Result<SignedIntent> {
        let signature = self.sign_bytes(&pipeline.signing_bytes(intent))?;
        debug!(
            tx_id = %intent.tx_id,
            key_type = %self.key_type(),
            "Signed order intent"
        );
        Ok(SignedIntent::new(*intent, signature, self.public_key()))
    }
}

impl std::fmt::Debug for IntentWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the private key in debug output
        f.debug_struct("IntentWallet")
            .field("key_type", &self.key_type())
            .field("public_key", &self.public_key().to_hex())
            .finish()
    }
}
