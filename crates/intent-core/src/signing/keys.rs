//! Key types, public keys, and raw signatures for the two supported algorithms.

use crate::{Error, Result};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// DER prefix for an Ed25519 public key (SubjectPublicKeyInfo, 32-byte key).
const ED25519_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Short DER prefix for a compressed secp256k1 key.
const SECP256K1_DER_PREFIX: [u8; 14] = [
    0x30, 0x2d, 0x30, 0x07, 0x06, 0x05, 0x2b, 0x81, 0x04, 0x00, 0x0a, 0x03, 0x22, 0x00,
];

/// Full SubjectPublicKeyInfo prefix for a compressed secp256k1 key.
const SECP256K1_SPKI_PREFIX: [u8; 23] = [
    0x30, 0x36, 0x30, 0x10, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x05,
    0x2b, 0x81, 0x04, 0x00, 0x0a, 0x03, 0x22, 0x00,
];

/// Raw signature length for both algorithms (r || s, or R || S).
pub const SIGNATURE_LEN: usize = 64;

/// Supported signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "ECDSA_SECP256K1")]
    EcdsaSecp256k1,
    #[serde(rename = "ED25519")]
    Ed25519,
}

impl KeyType {
    /// Tag as reported by the ledger's mirror node.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::EcdsaSecp256k1 => "ECDSA_SECP256K1",
            KeyType::Ed25519 => "ED25519",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "ECDSA_SECP256K1" | "SECP256K1" => Ok(KeyType::EcdsaSecp256k1),
            "ED25519" => Ok(KeyType::Ed25519),
            _ => Err(Error::UnsupportedAlgorithm {
                algorithm: s.to_string(),
            }),
        }
    }
}

/// A signer's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    EcdsaSecp256k1(k256::ecdsa::VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PublicKey {
    /// Parse raw or DER-prefixed key bytes.
    pub fn from_bytes(key_type: KeyType, bytes: &[u8]) -> Result<Self> {
        match key_type {
            KeyType::EcdsaSecp256k1 => {
                let raw = bytes
                    .strip_prefix(&SECP256K1_SPKI_PREFIX[..])
                    .or_else(|| bytes.strip_prefix(&SECP256K1_DER_PREFIX[..]))
                    .unwrap_or(bytes);
                k256::ecdsa::VerifyingKey::from_sec1_bytes(raw)
                    .map(PublicKey::EcdsaSecp256k1)
                    .map_err(|_| {
                        Error::format(format!(
                            "invalid secp256k1 public key ({} bytes)",
                            bytes.len()
                        ))
                    })
            }
            KeyType::Ed25519 => {
                let raw = bytes.strip_prefix(&ED25519_DER_PREFIX[..]).unwrap_or(bytes);
                let array: [u8; 32] = raw.try_into().map_err(|_| {
                    Error::format(format!(
                        "Ed25519 public key is {} bytes, expected 32",
                        raw.len()
                    ))
                })?;
                ed25519_dalek::VerifyingKey::from_bytes(&array)
                    .map(PublicKey::Ed25519)
                    .map_err(|_| Error::format("invalid Ed25519 public key"))
            }
        }
    }

    pub fn from_hex(key_type: KeyType, hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim().trim_start_matches("0x"))
            .map_err(|e| Error::format(format!("public key is not hex: {}", e)))?;
        Self::from_bytes(key_type, &bytes)
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            PublicKey::EcdsaSecp256k1(_) => KeyType::EcdsaSecp256k1,
            PublicKey::Ed25519(_) => KeyType::Ed25519,
        }
    }

    /// Raw key bytes: 33-byte compressed point, or 32-byte Ed25519 key.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::EcdsaSecp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
            PublicKey::Ed25519(key) => key.to_bytes().to_vec(),
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// EVM address derived from a secp256k1 key. Ed25519 keys have none.
    pub fn evm_address(&self) -> Option<Address> {
        match self {
            PublicKey::EcdsaSecp256k1(key) => {
                let point = key.to_encoded_point(false);
                let hash = Keccak256::digest(&point.as_bytes()[1..]);
                Some(Address::from_slice(&hash[12..]))
            }
            PublicKey::Ed25519(_) => None,
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key_type(), self.to_hex())
    }
}

/// A 64-byte signature with no recovery id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawSignature([u8; SIGNATURE_LEN]);

impl RawSignature {
    pub const fn from_array(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            Error::format(format!(
                "signature is {} bytes, expected {}",
                bytes.len(),
                SIGNATURE_LEN
            ))
        })?;
        Ok(Self(array))
    }

    pub fn from_hex(hex_sig: &str) -> Result<Self> {
        let bytes = hex::decode(hex_sig.trim().trim_start_matches("0x"))
            .map_err(|e| Error::format(format!("signature is not hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for RawSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawSignature({}..)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for RawSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
