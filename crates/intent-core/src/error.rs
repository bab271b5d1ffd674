//! Error types for the order-intent signing core.
//!
//! A failed signature check is not an error: it is reported as
//! [`Verification::Rejected`](crate::signing::Verification). The variants here
//! cover malformed input, unsupported algorithms, and transport failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Format error: {message}")]
    Format { message: String },

    #[error("Unsupported signature algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Signature container has no populated signature slot")]
    MissingSignature,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Ledger returned response code {code}")]
    Ledger { code: i64 },

    #[error("Verification timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl Error {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Error::Format {
            message: message.into(),
        }
    }

    /// True for failures of the remote path that a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Timeout { .. } | Error::Api { status: Some(500..=599), .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
