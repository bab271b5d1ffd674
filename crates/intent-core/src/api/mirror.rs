//! Mirror node REST client for account key lookups.

use crate::config::Config;
use crate::signing::{KeyType, PublicKey};
use crate::{Error, Result};
use serde::Deserialize;
use tracing::debug;

/// Read-only client for the ledger's mirror node.
pub struct MirrorNodeClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl MirrorNodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.relay.timeout())
            .build()?;

        Ok(Self {
            base_url: config.get_mirror_url().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Fetch account info by account id (`0.0.1234`) or EVM address.
    pub async fn get_account(&self, account: &str) -> Result<AccountInfo> {
        let url = format!("{}/api/v1/accounts/{}", self.base_url, account);
        debug!(%url, "Fetching account");

        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Api {
                message: format!("Mirror node request failed: {}", response.status()),
                status: Some(response.status().as_u16()),
            });
        }

        Ok(response.json().await?)
    }

    /// Public key registered for an account.
    pub async fn account_key(&self, account: &str) -> Result<PublicKey> {
        self.get_account(account).await?.public_key()
    }
}

/// Subset of the mirror node's account document.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub account: String,
    #[serde(default)]
    pub evm_address: Option<String>,
    pub key: Option<AccountKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountKey {
    #[serde(rename = "_type")]
    pub key_type: String,
    pub key: String,
}

impl AccountInfo {
    /// Decode the account key. Threshold and key-list keys are unsupported.
    pub fn public_key(&self) -> Result<PublicKey> {
        let key = self.key.as_ref().ok_or_else(|| Error::Api {
            message: format!("account {} has no key", self.account),
            status: None,
        })?;
        let key_type: KeyType = key.key_type.parse()?;
        PublicKey::from_hex(key_type, &key.key)
    }
}
