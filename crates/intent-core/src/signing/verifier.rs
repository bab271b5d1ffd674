//! Off-chain verification of intent signatures.

use super::container::open_container;
use super::digest::DigestPipeline;
use super::keys::{KeyType, PublicKey, RawSignature};
use super::SignedIntent;
use crate::types::{OrderIntent, PAYLOAD_LEN};
use crate::{Error, Result};
use ed25519_dalek::Verifier as _;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use serde::Serialize;
use sha3::{Digest, Keccak256};
use tracing::debug;

/// Outcome of a well-formed verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    Verified,
    Rejected,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified)
    }
}

impl From<bool> for Verification {
    fn from(ok: bool) -> Self {
        if ok {
            Verification::Verified
        } else {
            Verification::Rejected
        }
    }
}

/// Check `signature` over `message` with the algorithm's raw primitive.
///
/// secp256k1 signatures cover `keccak256(message)`; Ed25519 signatures cover
/// `message` itself. A 64-byte value that is not a valid curve signature is a
/// rejection, not a format error.
pub fn verify_raw(public_key: &PublicKey, message: &[u8], signature: &RawSignature) -> Verification {
    match public_key {
        PublicKey::EcdsaSecp256k1(key) => {
            let Ok(signature) = k256::ecdsa::Signature::from_slice(signature.as_bytes()) else {
                return Verification::Rejected;
            };
            let prehash = Keccak256::digest(message);
            key.verify_prehash(&prehash, &signature).is_ok().into()
        }
        PublicKey::Ed25519(key) => {
            let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
            key.verify(message, &signature).is_ok().into()
        }
    }
}

/// Verifies intents locally from bytes alone.
#[derive(Debug, Clone, Default)]
pub struct OffChainVerifier {
    pipeline: DigestPipeline,
}

impl OffChainVerifier {
    pub fn new(pipeline: DigestPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &DigestPipeline {
        &self.pipeline
    }

    /// Verify an intent against caller-supplied key material.
    pub fn verify(
        &self,
        intent: &OrderIntent,
        signature: &[u8],
        public_key: &[u8],
        key_type: KeyType,
    ) -> Result<Verification> {
        let public_key = PublicKey::from_bytes(key_type, public_key)?;
        let signature = RawSignature::from_slice(signature)?;
        Ok(self.verify_with_key(intent, &signature, &public_key))
    }

    pub fn verify_with_key(
        &self,
        intent: &OrderIntent,
        signature: &RawSignature,
        public_key: &PublicKey,
    ) -> Verification {
        let outcome = self.check(&intent.encode(), signature, public_key);
        debug!(
            tx_id = %intent.tx_id,
            key_type = %public_key.key_type(),
            ?outcome,
            "Off-chain verification"
        );
        outcome
    }

    pub fn verify_signed(&self, signed: &SignedIntent) -> Verification {
        self.verify_with_key(&signed.intent, &signed.signature, &signed.public_key)
    }

    /// Verify a stored payload without interpreting its fields.
    ///
    /// Only the length is checked: a payload with a corrupted side byte is a
    /// different message, so it is rejected rather than reported malformed.
    pub fn verify_payload(
        &self,
        payload: &[u8],
        signature: &RawSignature,
        public_key: &PublicKey,
    ) -> Result<Verification> {
        if payload.len() != PAYLOAD_LEN {
            return Err(Error::format(format!(
                "payload is {} bytes, expected {}",
                payload.len(),
                PAYLOAD_LEN
            )));
        }
        Ok(self.check(payload, signature, public_key))
    }

    /// Verify using the signature and algorithm carried in a container.
    ///
    /// The container's key prefix is ignored; `public_key` is authoritative.
    pub fn verify_container(
        &self,
        intent: &OrderIntent,
        container: &[u8],
        public_key: &PublicKey,
    ) -> Result<Verification> {
        let opened = open_container(container)?;
        if opened.key_type() != public_key.key_type() {
            debug!(
                container = %opened.key_type(),
                key = %public_key.key_type(),
                "Container algorithm does not match key"
            );
            return Ok(Verification::Rejected);
        }
        Ok(self.verify_with_key(intent, opened.signature(), public_key))
    }

    fn check(&self, payload: &[u8], signature: &RawSignature, public_key: &PublicKey) -> Verification {
        let message = self.pipeline.signing_bytes_for_payload(payload);
        verify_raw(public_key, &message, signature)
    }
}
