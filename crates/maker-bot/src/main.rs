//! Saturn Network market-maker bot - Entry Point

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Market making bot for Saturn Network
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Private key of the wallet to use for trading
    #[arg(short, long)]
    pkey: Option<String>,

    /// Mnemonic (i.e. from Saturn Wallet) of the wallet to use for trading
    #[arg(short, long)]
    mnemonic: Option<String>,

    /// If using a mnemonic, choose which wallet to use (Account 2 of Saturn Wallet / MetaMask by default)
    #[arg(short = 'i', long, default_value_t = 2)]
    walletid: u32,

    /// Trading bot config file (can also be set via MAKER_CONFIG env var)
    #[arg(short, long, env = "MAKER_CONFIG")]
    json: Option<String>,

    /// Polling delay in seconds
    #[arg(short, long, default_value_t = 60)]
    delay: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    maker_telemetry::init_logging()?;

    info!("Loading market-maker bot v{} ...", env!("CARGO_PKG_VERSION"));

    let source = maker_bot::wallet_source(args.pkey, args.mnemonic, args.walletid)?;
    let wallet = maker_executor::Wallet::load(source)?;

    let config_path = args.json.ok_or_else(|| {
        maker_bot::AppError::Config(
            "Must specify bot config .json file location (-j or MAKER_CONFIG)".to_string(),
        )
    })?;

    info!(config_path = %config_path, "Loading configuration");
    let config = maker_bot::BotConfig::from_file(&config_path)?;
    info!(mode = ?config.mode, blockchain = %config.blockchain, "Configuration loaded");

    let app = maker_bot::Application::new(config, wallet, Duration::from_secs(args.delay))?;
    app.run().await?;

    Ok(())
}
