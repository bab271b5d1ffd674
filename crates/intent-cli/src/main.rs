//! Intent CLI
//!
//! Encodes, signs, and verifies order intents from the command line.

use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use auth::IntentWallet;
use clap::{Args, Parser, Subcommand};
use intent_core::api::{MirrorNodeClient, RelayClient};
use intent_core::config::Config;
use intent_core::settlement::{OnChainVerifier, SettlementFields};
use intent_core::signing::{
    open_container, DigestPipeline, KeyType, OffChainVerifier, PublicKey, RawSignature,
    Verification,
};
use intent_core::types::{
    format_identifier, parse_identifier, IntentId, OrderIntent, RawOrderParams, Side, PAYLOAD_LEN,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "intent-cli", version, about = "Order-intent signing and verification")]
struct Cli {
    /// Configuration file; environment variables are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the 85-byte payload as hex.
    Encode(IntentArgs),
    /// Print the digest text and the bytes handed to the signer.
    Digest(PayloadArgs),
    /// Sign an intent with the wallet from INTENT_PRIVATE_KEY.
    Sign(IntentArgs),
    /// Verify a signature off-chain, and optionally through the ledger.
    Verify(VerifyArgs),
    /// Convert between identifier text and its integer value.
    Identifier {
        #[command(subcommand)]
        action: IdentifierAction,
    },
}

#[derive(Debug, Subcommand)]
enum IdentifierAction {
    /// Hyphenated or bare hex identifier to decimal.
    Parse { text: String },
    /// Decimal value to hyphenated identifier.
    Format { value: u128 },
}

#[derive(Debug, Clone, Args)]
struct IntentArgs {
    /// JSON object with side, collateralAbsScaled, signerAddress, marketId, txId.
    #[arg(long, conflicts_with_all = ["side", "collateral", "collateral_scaled"])]
    params: Option<String>,

    #[arg(long)]
    side: Option<Side>,

    /// Signed USD amount; the sign selects the side.
    #[arg(long, allow_negative_numbers = true, conflicts_with = "collateral_scaled")]
    collateral: Option<Decimal>,

    /// Collateral already scaled to token units.
    #[arg(long)]
    collateral_scaled: Option<U256>,

    #[arg(long)]
    signer: Option<Address>,

    #[arg(long)]
    market: Option<IntentId>,

    /// Defaults to a fresh time-ordered identifier.
    #[arg(long)]
    tx: Option<IntentId>,
}

impl IntentArgs {
    fn resolve(&self, config: &Config) -> Result<OrderIntent> {
        if let Some(params) = &self.params {
            let raw: RawOrderParams =
                serde_json::from_str(params).context("Invalid --params JSON")?;
            return Ok(OrderIntent::try_from(&raw)?);
        }

        let signer = self.signer.context("--signer is required")?;
        let market = self.market.context("--market is required")?;
        let tx = self.tx.unwrap_or_else(IntentId::now_v7);

        match (self.collateral, self.collateral_scaled) {
            (Some(usd), None) => {
                let intent = OrderIntent::from_signed_collateral(
                    usd,
                    config.ledger.collateral_decimals,
                    signer,
                    market,
                    tx,
                )?;
                if let Some(side) = self.side {
                    if side != intent.side {
                        bail!("--side {} contradicts the sign of --collateral {}", side, usd);
                    }
                }
                Ok(intent)
            }
            (None, Some(scaled)) => {
                let side = self.side.context("--side is required with --collateral-scaled")?;
                Ok(OrderIntent::new(side, scaled, signer, market, tx))
            }
            _ => bail!("one of --collateral or --collateral-scaled is required"),
        }
    }
}

#[derive(Debug, Clone, Args)]
struct PayloadArgs {
    /// Hex payload; takes precedence over the intent fields.
    #[arg(long)]
    payload: Option<String>,

    #[command(flatten)]
    intent: IntentArgs,
}

impl PayloadArgs {
    fn payload_bytes(&self, config: &Config) -> Result<Vec<u8>> {
        let Some(payload) = &self.payload else {
            return Ok(self.intent.resolve(config)?.encode().to_vec());
        };
        let bytes = hex::decode(payload.trim().trim_start_matches("0x"))
            .context("Payload is not valid hex")?;
        if bytes.len() != PAYLOAD_LEN {
            bail!("payload is {} bytes, expected {}", bytes.len(), PAYLOAD_LEN);
        }
        Ok(bytes)
    }
}

#[derive(Debug, Clone, Args)]
struct VerifyArgs {
    #[command(flatten)]
    payload: PayloadArgs,

    /// Hex signature (64 bytes).
    #[arg(long, required_unless_present = "container")]
    signature: Option<String>,

    /// Hex signature container; its algorithm slot selects the key type.
    #[arg(long, conflicts_with = "signature")]
    container: Option<String>,

    /// Hex public key, raw or DER-prefixed.
    #[arg(long, required_unless_present = "lookup_key")]
    public_key: Option<String>,

    #[arg(long, default_value = "ECDSA_SECP256K1")]
    key_type: KeyType,

    /// Resolve the public key from the mirror node by account id or EVM address.
    #[arg(long, conflicts_with = "public_key")]
    lookup_key: Option<String>,

    /// Also ask the ledger to authorize the signature.
    #[arg(long)]
    on_chain: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignOutput {
    payload: String,
    digest_text: String,
    key_type: KeyType,
    public_key: String,
    signature: String,
    container: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOutput {
    off_chain: Verification,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_chain: Option<Verification>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intent_cli=info,intent_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::from_env().context("Failed to load configuration")?,
    };
    let pipeline = DigestPipeline::new(config.ledger.name.clone());

    match cli.command {
        Command::Encode(args) => {
            println!("{}", args.resolve(&config)?.encode_hex());
        }
        Command::Digest(args) => {
            let payload = args.payload_bytes(&config)?;
            let signing_bytes = pipeline.signing_bytes_for_payload(&payload);
            println!("{}", String::from_utf8_lossy(&signing_bytes).trim_start_matches('\u{19}'));
            println!("{}", hex::encode(&signing_bytes));
        }
        Command::Sign(args) => {
            let intent = args.resolve(&config)?;
            let wallet = IntentWallet::from_env()?;
            let signed = wallet.sign_intent_with(&pipeline, &intent)?;
            info!(tx_id = %intent.tx_id, key_type = %signed.key_type(), "Intent signed");

            let output = SignOutput {
                payload: intent.encode_hex(),
                digest_text: pipeline.digest_text(&intent),
                key_type: signed.key_type(),
                public_key: signed.public_key.to_hex(),
                signature: signed.signature.to_hex(),
                container: hex::encode(signed.container().encode()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Verify(args) => {
            let output = verify(&config, &pipeline, &args).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);

            let agreed = output.on_chain.map_or(true, |on| on == output.off_chain);
            if !agreed {
                error!(off_chain = ?output.off_chain, on_chain = ?output.on_chain, "Verification paths disagree");
                bail!("verification paths disagree");
            }
            if !output.off_chain.is_verified() {
                bail!("signature rejected");
            }
        }
        Command::Identifier { action } => match action {
            IdentifierAction::Parse { text } => println!("{}", parse_identifier(&text)?),
            IdentifierAction::Format { value } => println!("{}", format_identifier(value)),
        },
    }

    Ok(())
}

async fn verify(config: &Config, pipeline: &DigestPipeline, args: &VerifyArgs) -> Result<VerifyOutput> {
    let payload = args.payload.payload_bytes(config)?;

    let (signature, key_type) = match (&args.signature, &args.container) {
        (_, Some(container)) => {
            let bytes = hex::decode(container.trim().trim_start_matches("0x"))
                .context("Container is not valid hex")?;
            let opened = open_container(&bytes)?;
            (*opened.signature(), opened.key_type())
        }
        (Some(signature), None) => (RawSignature::from_hex(signature)?, args.key_type),
        (None, None) => bail!("--signature or --container is required"),
    };

    let public_key = match (&args.public_key, &args.lookup_key) {
        (Some(hex_key), _) => PublicKey::from_hex(key_type, hex_key)?,
        (None, Some(account)) => {
            let mirror = MirrorNodeClient::from_config(config)?;
            let key = mirror
                .account_key(account)
                .await
                .with_context(|| format!("Failed to resolve key for {}", account))?;
            info!(%account, key_type = %key.key_type(), "Resolved public key");
            key
        }
        (None, None) => bail!("--public-key or --lookup-key is required"),
    };

    let off_chain = OffChainVerifier::new(pipeline.clone()).verify_payload(&payload, &signature, &public_key)?;

    let on_chain = if args.on_chain {
        let relay = RelayClient::from_config(config)?;
        let verifier = OnChainVerifier::new(relay, pipeline.ledger_name(), config.relay.timeout());
        let fields = SettlementFields::from_payload(&payload)?;
        Some(verifier.verify(&fields, &signature, &public_key).await?)
    } else {
        None
    };

    Ok(VerifyOutput { off_chain, on_chain })
}
