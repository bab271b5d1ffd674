//! Intent Core Library
//!
//! Order-intent payload codec, the digest pipeline shared by signers and
//! verifiers, signature containers, and the two verification paths.

pub mod api;
pub mod config;
pub mod error;
pub mod settlement;
pub mod signing;
pub mod types;

pub use error::{Error, Result};
