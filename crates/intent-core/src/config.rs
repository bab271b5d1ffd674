//! Configuration management for intent signing and verification.

use crate::{Error, Result};
use alloy_primitives::Address;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Hedera Account Service system contract (HIP-632).
pub const ACCOUNT_SERVICE_ADDRESS: &str = "0x000000000000000000000000000000000000016a";

/// Ledger name used in the signed-message prefix.
pub const DEFAULT_LEDGER_NAME: &str = "Hedera";

/// Decimal precision of the settlement collateral token.
pub const DEFAULT_COLLATERAL_DECIMALS: u32 = 6;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub relay: RelayConfig,
    pub mirror: MirrorConfig,
}

/// Hedera network selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Previewnet,
}

impl Network {
    /// Public JSON-RPC relay for this network.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://mainnet.hashio.io/api",
            Network::Testnet => "https://testnet.hashio.io/api",
            Network::Previewnet => "https://previewnet.hashio.io/api",
        }
    }

    /// Public mirror node REST endpoint for this network.
    pub fn default_mirror_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://mainnet-public.mirrornode.hedera.com",
            Network::Testnet => "https://testnet.mirrornode.hedera.com",
            Network::Previewnet => "https://previewnet.mirrornode.hedera.com",
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "previewnet" => Ok(Network::Previewnet),
            other => Err(Error::Config {
                message: format!("unknown network '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub network: Network,
    /// Name inserted into `"\x19<name> Signed Message:\n"`.
    pub name: String,
    pub collateral_decimals: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            name: DEFAULT_LEDGER_NAME.to_string(),
            collateral_decimals: DEFAULT_COLLATERAL_DECIMALS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub rpc_url: Option<String>,
    pub account_service: String,
    pub timeout_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            account_service: ACCOUNT_SERVICE_ADDRESS.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct MirrorConfig {
    pub url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let network = match env::var("HEDERA_NETWORK") {
            Ok(value) => value.parse()?,
            Err(_) => Network::default(),
        };

        let config = Self {
            ledger: LedgerConfig {
                network,
                name: env::var("LEDGER_NAME").unwrap_or_else(|_| DEFAULT_LEDGER_NAME.to_string()),
                collateral_decimals: env::var("COLLATERAL_DECIMALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_COLLATERAL_DECIMALS),
            },
            relay: RelayConfig {
                rpc_url: env::var("HEDERA_RPC_URL").ok(),
                account_service: env::var("ACCOUNT_SERVICE_ADDRESS")
                    .unwrap_or_else(|_| ACCOUNT_SERVICE_ADDRESS.to_string()),
                timeout_ms: env::var("VERIFY_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_MS),
            },
            mirror: MirrorConfig {
                url: env::var("MIRROR_NODE_URL").ok(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, with `INTENT__SECTION__KEY` overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("INTENT").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// JSON-RPC relay URL, falling back to the network default.
    pub fn get_rpc_url(&self) -> String {
        self.relay
            .rpc_url
            .clone()
            .unwrap_or_else(|| self.ledger.network.default_rpc_url().to_string())
    }

    /// Mirror node URL, falling back to the network default.
    pub fn get_mirror_url(&self) -> String {
        self.mirror
            .url
            .clone()
            .unwrap_or_else(|| self.ledger.network.default_mirror_url().to_string())
    }

    pub fn account_service_address(&self) -> Result<Address> {
        self.relay
            .account_service
            .parse()
            .map_err(|e| Error::Config {
                message: format!("invalid account service address: {}", e),
            })
    }

    /// Check URLs, addresses, and ranges before anything talks to the network.
    pub fn validate(&self) -> Result<()> {
        if self.ledger.name.is_empty() {
            return Err(Error::Config {
                message: "ledger name must not be empty".to_string(),
            });
        }
        if self.ledger.collateral_decimals > 28 {
            return Err(Error::Config {
                message: format!(
                    "collateral decimals {} exceeds the supported maximum of 28",
                    self.ledger.collateral_decimals
                ),
            });
        }
        if self.relay.timeout_ms == 0 {
            return Err(Error::Config {
                message: "verification timeout must be positive".to_string(),
            });
        }

        for (label, value) in [("rpc", self.get_rpc_url()), ("mirror", self.get_mirror_url())] {
            url::Url::parse(&value).map_err(|e| Error::Config {
                message: format!("invalid {} url '{}': {}", label, value, e),
            })?;
        }

        self.account_service_address()?;
        Ok(())
    }
}
