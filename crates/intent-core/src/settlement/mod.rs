//! On-chain verification path.
//!
//! The settlement layer receives the raw intent fields, recomputes the signed
//! message on its own ([`recompute`]), and asks the ledger whether the
//! signature authorizes that message for the signer's account. The
//! [`LedgerAuthorization`] trait is the seam between this recomputation and
//! the ledger: [`RelayClient`](crate::api::RelayClient) talks to a JSON-RPC
//! relay, [`InMemoryLedger`] emulates the check in-process.

pub mod memory;
pub mod recompute;

pub use memory::InMemoryLedger;

use crate::signing::{
    open_container, OffChainVerifier, PublicKey, RawSignature, SignatureContainer, Verification,
};
use crate::types::{OrderIntent, PAYLOAD_LEN};
use crate::{Error, Result};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

/// Ledger response code for a successful query.
pub const RESPONSE_CODE_SUCCESS: i64 = 22;

/// Ledger response code for an unusable signature blob.
pub const RESPONSE_CODE_INVALID_SIGNATURE: i64 = 7;

/// Intent fields as the settlement contract receives them.
///
/// `side` is the raw sentinel byte; the contract does not interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementFields {
    pub side: u8,
    pub collateral_abs_scaled: U256,
    pub signer: Address,
    pub market_id: u128,
    pub tx_id: u128,
}

impl From<&OrderIntent> for SettlementFields {
    fn from(intent: &OrderIntent) -> Self {
        Self {
            side: intent.side.as_u8(),
            collateral_abs_scaled: intent.collateral_abs_scaled,
            signer: intent.signer_address,
            market_id: intent.market_id.as_u128(),
            tx_id: intent.tx_id.as_u128(),
        }
    }
}

impl SettlementFields {
    /// Split a stored payload into fields without validating the side byte.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() != PAYLOAD_LEN {
            return Err(Error::format(format!(
                "payload is {} bytes, expected {}",
                payload.len(),
                PAYLOAD_LEN
            )));
        }

        let (side, rest) = payload.split_at(1);
        let (collateral, rest) = rest.split_at(32);
        let (signer, rest) = rest.split_at(20);
        let (market, tx) = rest.split_at(16);

        Ok(Self {
            side: side[0],
            collateral_abs_scaled: U256::from_be_slice(collateral),
            signer: Address::from_slice(signer),
            market_id: u128::from_be_bytes(market.try_into().map_err(|_| Error::format("market id"))?),
            tx_id: u128::from_be_bytes(tx.try_into().map_err(|_| Error::format("tx id"))?),
        })
    }
}

/// Result of the ledger's authorization query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub response_code: i64,
    pub authorized: bool,
}

impl AuthorizationResponse {
    pub fn success(authorized: bool) -> Self {
        Self {
            response_code: RESPONSE_CODE_SUCCESS,
            authorized,
        }
    }
}

/// Ledger query: does `signature_blob` authorize `message` for `account`?
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerAuthorization: Send + Sync {
    async fn is_authorized(
        &self,
        account: Address,
        message: &[u8],
        signature_blob: &[u8],
    ) -> Result<AuthorizationResponse>;
}

/// Verifier that recomputes the message settlement-side and defers the
/// signature check to the ledger.
pub struct OnChainVerifier<L> {
    ledger: L,
    ledger_name: String,
    timeout: Duration,
}

impl<L: LedgerAuthorization> OnChainVerifier<L> {
    pub fn new(ledger: L, ledger_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ledger,
            ledger_name: ledger_name.into(),
            timeout,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Verify a signature over the fields, wrapping it in a container for the ledger.
    pub async fn verify(
        &self,
        fields: &SettlementFields,
        signature: &RawSignature,
        public_key: &PublicKey,
    ) -> Result<Verification> {
        let container = SignatureContainer::for_key(public_key, *signature).encode();
        self.authorize(fields, &container).await
    }

    /// Verify with a container supplied by the caller.
    pub async fn verify_container(
        &self,
        fields: &SettlementFields,
        container: &[u8],
    ) -> Result<Verification> {
        open_container(container)?;
        self.authorize(fields, container).await
    }

    async fn authorize(&self, fields: &SettlementFields, container: &[u8]) -> Result<Verification> {
        let message = recompute::settlement_message(&self.ledger_name, fields);

        let response = tokio::time::timeout(
            self.timeout,
            self.ledger.is_authorized(fields.signer, &message, container),
        )
        .await
        .map_err(|_| Error::Timeout {
            after_ms: self.timeout.as_millis() as u64,
        })??;

        debug!(
            signer = %fields.signer,
            response_code = response.response_code,
            authorized = response.authorized,
            "Ledger authorization response"
        );

        match response.response_code {
            RESPONSE_CODE_SUCCESS => Ok(response.authorized.into()),
            code => Err(Error::Ledger { code }),
        }
    }
}

/// Outcomes of both verification paths for one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualVerification {
    pub off_chain: Verification,
    pub on_chain: Verification,
}

impl DualVerification {
    pub fn agree(&self) -> bool {
        self.off_chain == self.on_chain
    }

    pub fn verified(&self) -> bool {
        self.off_chain.is_verified() && self.on_chain.is_verified()
    }
}

/// Run both paths on the same input.
///
/// Errors from either path are returned as-is; one path never stands in for
/// the other.
pub async fn verify_both<L: LedgerAuthorization>(
    off_chain: &OffChainVerifier,
    on_chain: &OnChainVerifier<L>,
    intent: &OrderIntent,
    signature: &RawSignature,
    public_key: &PublicKey,
) -> Result<DualVerification> {
    let off = off_chain.verify_with_key(intent, signature, public_key);
    let on = on_chain
        .verify(&SettlementFields::from(intent), signature, public_key)
        .await?;

    let outcome = DualVerification {
        off_chain: off,
        on_chain: on,
    };
    if !outcome.agree() {
        error!(
            tx_id = %intent.tx_id,
            key_type = %public_key.key_type(),
            off_chain = ?off,
            on_chain = ?on,
            "Verification paths disagree"
        );
    }
    Ok(outcome)
}
