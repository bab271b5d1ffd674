//! Settlement-side recomputation of the signed message.
//!
//! Mirrors what the settlement contract does with the raw fields it receives:
//! `abi.encodePacked(side, collateral, signer, marketId, txId)`, keccak256,
//! base64, then the signed-message prefix. It shares no code with
//! [`crate::signing::digest`] so that the two paths check each other.

use super::SettlementFields;
use alloy_primitives::{keccak256, FixedBytes, B256};
use alloy_sol_types::SolValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// `abi.encodePacked` of the five intent fields.
///
/// The side travels as `bytes1` so that it packs to a single byte.
pub fn packed_payload(fields: &SettlementFields) -> Vec<u8> {
    (
        FixedBytes::<1>::from([fields.side]),
        fields.collateral_abs_scaled,
        fields.signer,
        fields.market_id,
        fields.tx_id,
    )
        .abi_encode_packed()
}

pub fn payload_hash(fields: &SettlementFields) -> B256 {
    keccak256(packed_payload(fields))
}

/// The message the ledger is asked to authorize.
pub fn settlement_message(ledger_name: &str, fields: &SettlementFields) -> Vec<u8> {
    let encoded = STANDARD.encode(payload_hash(fields));
    format!(
        "\u{19}{} Signed Message:\n{}{}",
        ledger_name,
        encoded.len(),
        encoded
    )
    .into_bytes()
}
