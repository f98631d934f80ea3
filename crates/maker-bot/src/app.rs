//! Application wiring.

use std::sync::Arc;
use std::time::Duration;

use maker_executor::{
    ActionDispatcher, BridgeExecutor, ExecutorRegistry, RpcClient, SaturnQuery,
    SequentialPipeline, Wallet,
};
use maker_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::config::{BotConfig, OperatingMode};
use crate::context::BotContext;
use crate::error::{AppError, AppResult};
use crate::poller::PollingLoop;
use crate::strategy::HttpStrategy;

/// Main application.
pub struct Application {
    config: BotConfig,
    context: Arc<BotContext>,
}

impl Application {
    /// Build executors, query client and strategy from validated config.
    ///
    /// Only the configured chain gets an executor. Actions targeting any other
    /// chain fail with `UnknownChain`.
    pub fn new(config: BotConfig, wallet: Wallet, delay: Duration) -> AppResult<Self> {
        if delay.is_zero() {
            return Err(AppError::Config("delay must be at least 1 second".to_string()));
        }

        let chain = config.chain()?;
        let wallet = Arc::new(wallet);
        let address = wallet.address().to_string();

        let query = SaturnQuery::new(config.api_url.clone(), config.receipt_poll_interval())?;

        let mut registry = ExecutorRegistry::new();
        if config.mode == OperatingMode::Trading {
            let bridge_url = config
                .bridge_url
                .clone()
                .ok_or_else(|| AppError::Config("bridgeUrl is required in trading mode".to_string()))?;
            let rpc = RpcClient::new(config.rpc_url()?)?;
            info!(%chain, chain_id = chain.chain_id(), rpc = %rpc.url(), "Chain executor ready");
            registry.register(Arc::new(BridgeExecutor::new(
                chain,
                bridge_url,
                rpc,
                Arc::clone(&wallet),
            )?));
        }

        let strategy_url = config
            .strategy_url
            .clone()
            .ok_or_else(|| AppError::Config("strategyUrl is required".to_string()))?;
        let strategy = HttpStrategy::new(strategy_url, &config, address.clone())?;

        let dispatcher = ActionDispatcher::new(Arc::new(registry), Arc::new(query), config.token.clone());
        let pipeline = SequentialPipeline::with_step_timeout(config.confirmation_timeout());

        let context = Arc::new(BotContext::new(
            config.mode,
            Arc::new(strategy),
            dispatcher,
            pipeline,
            delay,
        ));

        info!(
            mode = ?config.mode,
            %chain,
            token = %config.token,
            wallet = %address,
            delay_secs = delay.as_secs(),
            "Application initialized"
        );

        Ok(Self { config, context })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn context(&self) -> Arc<BotContext> {
        Arc::clone(&self.context)
    }

    /// Run the polling loop until Ctrl+C.
    pub async fn run(self) -> AppResult<()> {
        if self.config.is_observation_mode() {
            warn!("Observation mode: actions are logged, not executed");
        }

        let polling = PollingLoop::new(self.context());
        polling
            .run_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
                info!("Shutdown signal received");
            })
            .await;

        match Metrics::render() {
            Ok(text) => debug!(metrics = %text, "Final metrics"),
            Err(e) => warn!(error = %e, "Failed to render metrics"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maker_executor::WalletSource;
    use zeroize::Zeroizing;

    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn wallet() -> Wallet {
        Wallet::load(WalletSource::PrivateKey(Zeroizing::new(
            TEST_PRIVATE_KEY.to_string(),
        )))
        .unwrap()
    }

    fn config(mode: &str) -> BotConfig {
        BotConfig::from_json_str(&config_json(&format!(r#""mode": "{mode}","#))).unwrap()
    }

    fn config_json(mode_entry: &str) -> String {
        format!(
            r#"{{
                "blockchain": "ETH",
                "token": "0xtoken",
                "fundMinimum": "0.5",
                "tokenLimit": "1000",
                "spread": "0.05",
                "dustCutoff": "0.01",
                "bandSize": "0.01",
                {mode_entry}
                "strategyUrl": "http://127.0.0.1:9/actions",
                "bridgeUrl": "http://127.0.0.1:9"
            }}"#
        )
    }

    #[test]
    fn test_observation_app_builds() {
        let app = Application::new(config("observation"), wallet(), Duration::from_secs(60)).unwrap();
        assert_eq!(app.context().mode, OperatingMode::Observation);
        assert_eq!(app.context().delay, Duration::from_secs(60));
    }

    #[test]
    fn test_trading_app_builds() {
        let app = Application::new(config("trading"), wallet(), Duration::from_secs(5)).unwrap();
        assert_eq!(app.config().mode, OperatingMode::Trading);
    }

    #[test]
    fn test_config_without_mode_trades() {
        let config = BotConfig::from_json_str(&config_json("")).unwrap();
        let app = Application::new(config, wallet(), Duration::from_secs(60)).unwrap();
        assert_eq!(app.context().mode, OperatingMode::Trading);
    }

    #[test]
    fn test_zero_delay_rejected() {
        let result = Application::new(config("observation"), wallet(), Duration::ZERO);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
