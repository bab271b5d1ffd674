//! Order intents and their fixed 85-byte wire payload.
//!
//! Layout (big-endian, no padding between fields):
//!
//! ```text
//! offset  width  field
//!      0      1  side sentinel (0x0f buy, 0xf1 sell)
//!      1     32  collateral_abs_scaled
//!     33     20  signer_address
//!     53     16  market_id
//!     69     16  tx_id
//! ```

use super::identifier::IntentId;
use crate::{Error, Result};
use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoded payload length in bytes.
pub const PAYLOAD_LEN: usize = 85;

const SIDE_OFFSET: usize = 0;
const COLLATERAL_OFFSET: usize = 1;
const SIGNER_OFFSET: usize = 33;
const MARKET_OFFSET: usize = 53;
const TX_OFFSET: usize = 69;

/// Side of the intent, carried as a single sentinel byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub const BUY_SENTINEL: u8 = 0x0f;
    pub const SELL_SENTINEL: u8 = 0xf1;

    pub fn as_u8(&self) -> u8 {
        match self {
            Side::Buy => Self::BUY_SENTINEL,
            Side::Sell => Self::SELL_SENTINEL,
        }
    }

    pub fn from_u8(byte: u8) -> Result<Self> {
        match byte {
            Self::BUY_SENTINEL => Ok(Side::Buy),
            Self::SELL_SENTINEL => Ok(Side::Sell),
            other => Err(Error::format(format!(
                "unrecognized side sentinel 0x{:02x}",
                other
            ))),
        }
    }

    /// Side implied by the sign of a signed quantity. Zero counts as a buy.
    pub fn from_signed(quantity: Decimal) -> Self {
        if quantity < Decimal::ZERO {
            Side::Sell
        } else {
            Side::Buy
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(Error::format(format!("unknown side '{}'", other))),
        }
    }
}

/// Scale an absolute USD amount by the collateral token's decimals.
///
/// Amounts carrying more fractional digits than `decimals` are rejected.
pub fn scale_collateral(usd: Decimal, decimals: u32) -> Result<U256> {
    let abs = usd.abs().normalize();
    let scale = abs.scale();

    if scale > decimals {
        return Err(Error::format(format!(
            "collateral {} has {} fractional digits, token supports {}",
            usd, scale, decimals
        )));
    }

    let mantissa = U256::from(abs.mantissa().unsigned_abs());
    let factor = U256::from(10u8)
        .checked_pow(U256::from(decimals - scale))
        .ok_or_else(|| Error::format(format!("10^{} overflows 256 bits", decimals - scale)))?;

    mantissa
        .checked_mul(factor)
        .ok_or_else(|| Error::format(format!("scaled collateral {} overflows 256 bits", usd)))
}

/// A user's instruction to trade, prior to any on-chain execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderIntent {
    pub side: Side,
    pub collateral_abs_scaled: U256,
    pub signer_address: Address,
    pub market_id: IntentId,
    pub tx_id: IntentId,
}

impl OrderIntent {
    pub fn new(
        side: Side,
        collateral_abs_scaled: U256,
        signer_address: Address,
        market_id: IntentId,
        tx_id: IntentId,
    ) -> Self {
        Self {
            side,
            collateral_abs_scaled,
            signer_address,
            market_id,
            tx_id,
        }
    }

    /// Build an intent from a signed USD collateral amount.
    ///
    /// The sign selects the side; the magnitude is scaled by `decimals`.
    pub fn from_signed_collateral(
        usd: Decimal,
        decimals: u32,
        signer_address: Address,
        market_id: IntentId,
        tx_id: IntentId,
    ) -> Result<Self> {
        Ok(Self {
            side: Side::from_signed(usd),
            collateral_abs_scaled: scale_collateral(usd, decimals)?,
            signer_address,
            market_id,
            tx_id,
        })
    }

    /// Pack the intent into its 85-byte payload.
    pub fn encode(&self) -> [u8; PAYLOAD_LEN] {
        let mut out = [0u8; PAYLOAD_LEN];
        out[SIDE_OFFSET] = self.side.as_u8();
        out[COLLATERAL_OFFSET..SIGNER_OFFSET]
            .copy_from_slice(&self.collateral_abs_scaled.to_be_bytes::<32>());
        out[SIGNER_OFFSET..MARKET_OFFSET].copy_from_slice(self.signer_address.as_slice());
        out[MARKET_OFFSET..TX_OFFSET].copy_from_slice(&self.market_id.to_be_bytes());
        out[TX_OFFSET..PAYLOAD_LEN].copy_from_slice(&self.tx_id.to_be_bytes());
        out
    }

    pub fn encode_hex(&self) -> String {
        hex::encode(self.encode())
    }

    /// Unpack an 85-byte payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PAYLOAD_LEN {
            return Err(Error::format(format!(
                "payload is {} bytes, expected {}",
                bytes.len(),
                PAYLOAD_LEN
            )));
        }

        let side = Side::from_u8(bytes[SIDE_OFFSET])?;
        let collateral_abs_scaled = U256::from_be_slice(&bytes[COLLATERAL_OFFSET..SIGNER_OFFSET]);
        let signer_address = Address::from_slice(&bytes[SIGNER_OFFSET..MARKET_OFFSET]);
        let market_id = IntentId::from_be_bytes(fixed_16(&bytes[MARKET_OFFSET..TX_OFFSET]));
        let tx_id = IntentId::from_be_bytes(fixed_16(&bytes[TX_OFFSET..PAYLOAD_LEN]));

        Ok(Self {
            side,
            collateral_abs_scaled,
            signer_address,
            market_id,
            tx_id,
        })
    }

    pub fn decode_hex(payload: &str) -> Result<Self> {
        let bytes = hex::decode(payload.trim().trim_start_matches("0x"))
            .map_err(|e| Error::format(format!("payload is not hex: {}", e)))?;
        Self::decode(&bytes)
    }
}

fn fixed_16(slice: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(slice);
    out
}

/// Loosely-typed order parameters as supplied by collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderParams {
    pub side: String,
    /// Decimal or `0x`-prefixed hex integer.
    pub collateral_abs_scaled: String,
    pub signer_address: String,
    pub market_id: String,
    pub tx_id: String,
}

impl TryFrom<&RawOrderParams> for OrderIntent {
    type Error = Error;

    fn try_from(raw: &RawOrderParams) -> Result<Self> {
        let collateral_abs_scaled = U256::from_str(raw.collateral_abs_scaled.trim())
            .map_err(|e| {
                Error::format(format!(
                    "collateral '{}' is not a 256-bit unsigned integer: {}",
                    raw.collateral_abs_scaled, e
                ))
            })?;

        let signer_address = Address::from_str(raw.signer_address.trim()).map_err(|e| {
            Error::format(format!("signer address '{}': {}", raw.signer_address, e))
        })?;

        Ok(Self {
            side: raw.side.parse()?,
            collateral_abs_scaled,
            signer_address,
            market_id: raw.market_id.parse()?,
            tx_id: raw.tx_id.parse()?,
        })
    }
}
