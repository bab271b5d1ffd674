//! Signing pipeline for order intents.
//!
//! # Architecture
//!
//! ```text
//! OrderIntent ── encode ──► payload (85 bytes)
//!                               │
//!                               ▼
//!                        DigestPipeline ──► signing bytes
//!                               │                 │
//!                               │        signing primitive (wallet)
//!                               │                 │
//!                               │                 ▼
//!                               │        RawSignature ──► SignatureContainer
//!                               ▼
//!                  OffChainVerifier / OnChainVerifier ──► Verification
//! ```

pub mod container;
pub mod digest;
pub mod keys;
pub mod verifier;

pub use container::{build_container, decode_signature_map, open_container, SignatureContainer};
pub use digest::{digest_pipeline, digest_text, payload_digest, prefix_message, DigestPipeline};
pub use keys::{KeyType, PublicKey, RawSignature, SIGNATURE_LEN};
pub use verifier::{verify_raw, OffChainVerifier, Verification};

use crate::types::OrderIntent;

/// An intent together with the signature and key that authorize it.
///
/// Produced once by the signing collaborator and consumed by a verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIntent {
    pub intent: OrderIntent,
    pub signature: RawSignature,
    pub public_key: PublicKey,
}

impl SignedIntent {
    pub fn new(intent: OrderIntent, signature: RawSignature, public_key: PublicKey) -> Self {
        Self {
            intent,
            signature,
            public_key,
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.public_key.key_type()
    }

    /// Wrap the signature for transport to the settlement layer.
    pub fn container(&self) -> SignatureContainer {
        SignatureContainer::for_key(&self.public_key, self.signature)
    }
}
