//! 128-bit identifiers in their hyphenated hex display form.
//!
//! Market and transaction ids are UUIDv7 values on the wire, but this codec
//! treats them as opaque 128-bit integers: version and variant bits are
//! neither checked nor set.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const HEX_DIGITS: usize = 32;

/// Parse a hyphenated identifier into its integer value.
///
/// Separators are stripped wherever they appear; what remains must be exactly
/// 32 hex digits, in either case. Parsing is therefore many-to-one:
/// `format_identifier(parse_identifier(text))` returns `text` only when
/// `text` is already canonical (lowercase, 8-4-4-4-12).
pub fn parse_identifier(text: &str) -> Result<u128> {
    let digits: String = text.chars().filter(|c| *c != '-').collect();

    if digits.len() != HEX_DIGITS {
        return Err(Error::format(format!(
            "identifier '{}' has {} hex digits, expected {}",
            text,
            digits.len(),
            HEX_DIGITS
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::format(format!(
            "identifier '{}' contains non-hex characters",
            text
        )));
    }

    u128::from_str_radix(&digits, 16)
        .map_err(|e| Error::format(format!("identifier '{}': {}", text, e)))
}

/// Render a value as a zero-padded 8-4-4-4-12 identifier.
pub fn format_identifier(value: u128) -> String {
    Uuid::from_u128(value).hyphenated().to_string()
}

/// A market or transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct IntentId(u128);

impl IntentId {
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    /// Mint a fresh time-ordered identifier for a new intent.
    pub fn now_v7() -> Self {
        Self(Uuid::now_v7().as_u128())
    }

    pub fn to_be_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }
}

impl From<u128> for IntentId {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<IntentId> for u128 {
    fn from(id: IntentId) -> Self {
        id.0
    }
}

impl From<Uuid> for IntentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.as_u128())
    }
}

impl FromStr for IntentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_identifier(s).map(Self)
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_identifier(self.0))
    }
}

impl Serialize for IntentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IntentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
