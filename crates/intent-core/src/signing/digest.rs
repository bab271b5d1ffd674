//! Digest pipeline: the exact bytes a wallet signs for an intent.
//!
//! ```text
//! payload (85 bytes)
//!     │ keccak256
//!     ▼
//! digest (32 bytes)
//!     │ base64, standard alphabet, padded
//!     ▼
//! digest text (44 chars)
//!     │ "\x19" + ledger + " Signed Message:\n" + len(text) + text
//!     ▼
//! signed bytes (UTF-8)
//! ```
//!
//! The base64 step is a textual re-encoding, not a second hash, and no hash
//! is applied after prefixing. Signer and verifier must agree on every byte
//! here or valid signatures fail with no distinguishing error.

use crate::config::DEFAULT_LEDGER_NAME;
use crate::types::OrderIntent;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha3::{Digest, Keccak256};

/// keccak256 of an encoded payload.
pub fn payload_digest(payload: &[u8]) -> [u8; 32] {
    Keccak256::digest(payload).into()
}

/// Base64 text form of a raw digest.
pub fn digest_text(digest: &[u8; 32]) -> String {
    STANDARD.encode(digest)
}

/// Apply the ledger's signed-message prefix to `text`.
///
/// The length field is the character count of `text` alone.
pub fn prefix_message(ledger_name: &str, text: &str) -> Vec<u8> {
    let mut message = Vec::with_capacity(ledger_name.len() + text.len() + 24);
    message.push(0x19);
    message.extend_from_slice(ledger_name.as_bytes());
    message.extend_from_slice(b" Signed Message:\n");
    message.extend_from_slice(text.chars().count().to_string().as_bytes());
    message.extend_from_slice(text.as_bytes());
    message
}

/// Digest pipeline bound to a ledger name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestPipeline {
    ledger_name: String,
}

impl Default for DigestPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_NAME)
    }
}

impl DigestPipeline {
    pub fn new(ledger_name: impl Into<String>) -> Self {
        Self {
            ledger_name: ledger_name.into(),
        }
    }

    pub fn ledger_name(&self) -> &str {
        &self.ledger_name
    }

    /// Base64 text of the payload digest, before prefixing.
    pub fn digest_text(&self, intent: &OrderIntent) -> String {
        digest_text(&payload_digest(&intent.encode()))
    }

    /// The bytes handed to the signing primitive.
    pub fn signing_bytes(&self, intent: &OrderIntent) -> Vec<u8> {
        self.signing_bytes_for_payload(&intent.encode())
    }

    /// Same as [`signing_bytes`](Self::signing_bytes) for an already encoded payload.
    pub fn signing_bytes_for_payload(&self, payload: &[u8]) -> Vec<u8> {
        let text = digest_text(&payload_digest(payload));
        prefix_message(&self.ledger_name, &text)
    }
}

/// Run the pipeline with the default ledger name.
pub fn digest_pipeline(intent: &OrderIntent) -> Vec<u8> {
    DigestPipeline::default().signing_bytes(intent)
}
