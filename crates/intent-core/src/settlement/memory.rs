//! In-process stand-in for the ledger's account service.

use super::{AuthorizationResponse, LedgerAuthorization, RESPONSE_CODE_INVALID_SIGNATURE};
use crate::signing::{decode_signature_map, PublicKey};
use crate::Result;
use alloy_primitives::{keccak256, Address};
use async_trait::async_trait;
use ed25519_dalek::Verifier as _;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use std::collections::HashMap;
use tracing::debug;

/// Ledger emulation holding the key registered for each account.
///
/// secp256k1 signatures are checked by recovering the signer from the
/// signature, the way the ledger does for EVM-compatible accounts. Ed25519
/// signatures are checked against the account key when the container's key
/// prefix matches it. Unknown accounts are never authorized.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    accounts: HashMap<Address, PublicKey>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: Address, key: PublicKey) -> Self {
        self.register(account, key);
        self
    }

    pub fn register(&mut self, account: Address, key: PublicKey) {
        self.accounts.insert(account, key);
    }

    pub fn account_key(&self, account: &Address) -> Option<&PublicKey> {
        self.accounts.get(account)
    }

    fn recovers_to(key: &VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        let prehash = keccak256(message);
        [false, true].into_iter().any(|odd| {
            VerifyingKey::recover_from_prehash(
                prehash.as_slice(),
                &signature,
                RecoveryId::new(odd, false),
            )
            .is_ok_and(|recovered| recovered == *key)
        })
    }
}

#[async_trait]
impl LedgerAuthorization for InMemoryLedger {
    async fn is_authorized(
        &self,
        account: Address,
        message: &[u8],
        signature_blob: &[u8],
    ) -> Result<AuthorizationResponse> {
        let pairs = match decode_signature_map(signature_blob) {
            Ok(pairs) if !pairs.is_empty() => pairs,
            _ => {
                debug!(%account, "Signature blob rejected");
                return Ok(AuthorizationResponse {
                    response_code: RESPONSE_CODE_INVALID_SIGNATURE,
                    authorized: false,
                });
            }
        };

        let Some(key) = self.accounts.get(&account) else {
            debug!(%account, "Unknown account");
            return Ok(AuthorizationResponse::success(false));
        };

        let key_bytes = key.to_bytes();
        let authorized = pairs.iter().any(|pair| {
            if pair.key_type() != key.key_type() {
                return false;
            }
            let signature = pair.signature().as_bytes();
            match key {
                PublicKey::EcdsaSecp256k1(verifying) => {
                    Self::recovers_to(verifying, message, signature)
                }
                PublicKey::Ed25519(verifying) => {
                    key_bytes.starts_with(pair.public_key_prefix())
                        && verifying
                            .verify(message, &ed25519_dalek::Signature::from_bytes(signature))
                            .is_ok()
                }
            }
        });

        debug!(
            %account,
            key_type = %key.key_type(),
            authorized,
            "In-memory authorization"
        );
        Ok(AuthorizationResponse::success(authorized))
    }
}

impl From<(Address, PublicKey)> for InMemoryLedger {
    fn from((account, key): (Address, PublicKey)) -> Self {
        Self::new().with_account(account, key)
    }
}
