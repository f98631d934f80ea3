//! Strategy seam.
//!
//! The strategy decides what to do each cycle; the bot only executes. A
//! strategy returns the cycle's actions in the order they must run.

use std::time::Duration;

use maker_core::{Action, TradingParams};
use maker_executor::BoxFuture;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::BotConfig;
use crate::error::{StrategyError, StrategyResult};

/// Source of each cycle's actions.
pub trait Strategy: Send + Sync {
    /// Actions for the current cycle. An empty list means nothing to do.
    fn get_actions(&self) -> BoxFuture<'_, StrategyResult<Vec<Action>>>;
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StrategyRequest {
    blockchain: String,
    token: String,
    #[serde(flatten)]
    params: TradingParams,
    wallet_address: String,
}

/// Strategy served over HTTP.
///
/// Every cycle POSTs the bot parameters and wallet address to `strategyUrl`
/// and expects a JSON array of actions back.
#[derive(Debug, Clone)]
pub struct HttpStrategy {
    client: Client,
    url: String,
    request: StrategyRequest,
}

impl HttpStrategy {
    pub fn new(url: impl Into<String>, config: &BotConfig, wallet_address: impl Into<String>) -> StrategyResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| StrategyError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            request: StrategyRequest {
                blockchain: config.blockchain.clone(),
                token: config.token.clone(),
                params: config.params.clone(),
                wallet_address: wallet_address.into(),
            },
        })
    }

    async fn fetch(&self) -> StrategyResult<Vec<Action>> {
        let response = self.client.post(&self.url).json(&self.request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StrategyError::Http(format!("HTTP {status}: {body}")));
        }

        let body = response.text().await?;
        let actions: Vec<Action> = serde_json::from_str(&body)
            .map_err(|e| StrategyError::InvalidResponse(e.to_string()))?;

        debug!(count = actions.len(), "Strategy returned actions");
        Ok(actions)
    }
}

impl Strategy for HttpStrategy {
    fn get_actions(&self) -> BoxFuture<'_, StrategyResult<Vec<Action>>> {
        Box::pin(self.fetch())
    }
}
