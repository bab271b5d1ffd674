//! intent-sig: order-intent signing and verification
//!
//! This is the root crate that provides benchmark and integration-test access
//! to the workspace. For actual functionality, use the individual crates:
//!
//! - `intent-core`: payload codec, digest pipeline, containers, both verification paths
//! - `auth`: wallet signing primitive
//! - `intent-cli`: command-line encoder, signer, and verifier

// Re-export for benchmarks
pub use auth as wallet;
pub use intent_core as core;
