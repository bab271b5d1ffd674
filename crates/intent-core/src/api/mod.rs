//! Clients for the ledger's external services.

pub mod mirror;
pub mod relay;

pub use mirror::{AccountInfo, MirrorNodeClient};
pub use relay::RelayClient;
