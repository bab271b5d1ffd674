//! Core domain types: identifiers and order intents.

pub mod identifier;
pub mod intent;

pub use identifier::{format_identifier, parse_identifier, IntentId};
pub use intent::{scale_collateral, OrderIntent, RawOrderParams, Side, PAYLOAD_LEN};
