//! Command-line driver for the wallet negotiation and token-mint gateway.
//!
//! Runs the full flow (connect, negotiate, bind, operate) against a
//! JSON-RPC HTTP bridge (a wallet bridge or a dev node). This binary is
//! the rendering layer: it prints results and error kinds; the library
//! itself only returns structured values.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use tokengate::config::load_config;
use tokengate::session::short_address;
use tokengate::{
    ContractBinder, DashboardConfig, HttpBridgeTransport, MintRequest, NetworkNegotiator,
    TokenOperations, TokenUriQuery, TransferRequest, WalletGateway, WalletSessionManager,
};

#[derive(Parser)]
#[command(name = "tokengate")]
#[command(about = "Wallet negotiation and token-mint gateway", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; defaults target Polygon Amoy.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the wallet bridge or dev node.
    #[arg(short, long, default_value = "http://127.0.0.1:8545")]
    bridge_url: String,

    /// Per-request bridge timeout in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active account and verified chain.
    Status,
    /// Mint a token with the given metadata URI and encryption key.
    Mint {
        #[arg(long)]
        uri: String,
        #[arg(long)]
        key: String,
    },
    /// Read the metadata URI for a token id.
    TokenUri {
        #[arg(long)]
        token_id: u64,
    },
    /// Read the owner of a token id.
    OwnerOf {
        #[arg(long)]
        token_id: u64,
    },
    /// Read the total minted supply.
    Supply,
    /// Transfer a token to another address.
    Transfer {
        #[arg(long)]
        to: String,
        #[arg(long)]
        token_id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokengate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DashboardConfig::default(),
    };
    tracing::info!(
        chain_id = config.chain.chain_id,
        chain = %config.chain.display_name,
        contract = %config.contract.address,
        "configuration loaded"
    );

    let endpoint: Url = cli.bridge_url.parse()?;
    let transport = HttpBridgeTransport::new(
        endpoint,
        Duration::from_secs(cli.request_timeout_secs),
    )?;
    let gateway = WalletGateway::new(Arc::new(transport));

    // connect → ensure → bind; each step must succeed before the next.
    let manager = WalletSessionManager::new(gateway.clone());
    let session = manager.connect().await?;

    let negotiator = NetworkNegotiator::new(config.chain.clone());
    let verified = negotiator.ensure(&gateway).await?;

    let binder = ContractBinder::new(config.chain.clone());
    let bound = binder.bind(&session, &config.contract)?;

    let operations = TokenOperations::new(config.operations.clone());

    match cli.command {
        Commands::Status => {
            let account = session.account().map(|a| short_address(&a));
            println!(
                "account: {}",
                account.as_deref().unwrap_or("(disconnected)")
            );
            println!("chain:   {} ({})", verified.chain_id, config.chain.display_name);
        }
        Commands::Mint { uri, key } => {
            let result = operations
                .mint(
                    &bound,
                    MintRequest {
                        token_uri: uri,
                        encryption_key: key,
                    },
                )
                .await?;
            println!("minted token {}", result.token_id);
        }
        Commands::TokenUri { token_id } => {
            let result = operations
                .token_uri(&bound, TokenUriQuery { token_id })
                .await?;
            println!("{}", result.uri);
        }
        Commands::OwnerOf { token_id } => {
            let owner = operations.owner_of(&bound, token_id).await?;
            println!("{owner}");
        }
        Commands::Supply => {
            let supply = operations.total_supply(&bound).await?;
            println!("{supply}");
        }
        Commands::Transfer { to, token_id } => {
            let to = to.parse()?;
            operations
                .transfer(&bound, TransferRequest { to, token_id })
                .await?;
            println!("transferred token {token_id} to {}", short_address(&to));
        }
    }

    Ok(())
}
