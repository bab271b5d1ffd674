//! Intent Signing Wallets
//!
//! Private-key handling and the signing primitive for order intents.

pub mod wallet;

pub use wallet::IntentWallet;
