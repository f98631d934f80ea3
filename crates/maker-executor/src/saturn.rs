//! [`QueryClient`] backed by the Saturn Network ticker API.
//!
//! Confirmation is two-staged: first the transaction receipt is polled
//! through the chain executor until mined, then the exchange API is polled
//! until the order or trade shows up in its index.

use std::time::Duration;

use maker_core::{Chain, OrderRecord, TradeRecord, TxHash, TxReceipt};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::chain_executor::{BoxFuture, ChainExecutor};
use crate::error::{ExecutorError, ExecutorResult};
use crate::query::QueryClient;

/// Public Saturn Network ticker API.
pub const DEFAULT_API_URL: &str = "https://ticker.saturn.network/api/v2";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Saturn API client.
#[derive(Debug, Clone)]
pub struct SaturnQuery {
    client: Client,
    api_url: String,
    poll_interval: Duration,
}

impl SaturnQuery {
    /// # Arguments
    /// * `api_url` - API base URL, e.g. [`DEFAULT_API_URL`]
    /// * `poll_interval` - Delay between receipt and index polls
    pub fn new(api_url: impl Into<String>, poll_interval: Duration) -> ExecutorResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExecutorError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            poll_interval,
        })
    }

    fn order_url(&self, chain: Chain, tx: &TxHash) -> String {
        format!("{}/orders/by_tx/{}/{}.json", self.api_url, chain, tx)
    }

    fn trade_url(&self, chain: Chain, tx: &TxHash) -> String {
        format!("{}/trades/by_tx/{}/{}.json", self.api_url, chain, tx)
    }

    /// GET a JSON document; `None` on 404.
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> ExecutorResult<Option<T>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutorError::Network(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| ExecutorError::InvalidResponse(format!("{url}: {e}")))
    }

    /// Poll until `tx` is mined. A reverted receipt is an error.
    async fn wait_for_receipt(
        &self,
        tx: &TxHash,
        executor: &dyn ChainExecutor,
    ) -> ExecutorResult<TxReceipt> {
        loop {
            if let Some(receipt) = executor.transaction_receipt(tx).await? {
                if !receipt.success {
                    return Err(ExecutorError::Reverted(tx.clone()));
                }
                debug!(%tx, block = receipt.block_number, "Transaction mined");
                return Ok(receipt);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Poll `url` until the API has indexed the record.
    async fn wait_for_index<T: DeserializeOwned>(&self, url: &str) -> ExecutorResult<T> {
        loop {
            if let Some(record) = self.fetch(url).await? {
                return Ok(record);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl QueryClient for SaturnQuery {
    fn get_order_by_tx<'a>(
        &'a self,
        order_tx: &'a TxHash,
        chain: Chain,
    ) -> BoxFuture<'a, ExecutorResult<OrderRecord>> {
        Box::pin(async move {
            self.fetch(&self.order_url(chain, order_tx))
                .await?
                .ok_or_else(|| ExecutorError::OrderNotFound {
                    order_tx: order_tx.clone(),
                    chain,
                })
        })
    }

    fn await_order_tx<'a>(
        &'a self,
        tx: &'a TxHash,
        executor: &'a dyn ChainExecutor,
    ) -> BoxFuture<'a, ExecutorResult<OrderRecord>> {
        Box::pin(async move {
            info!(%tx, chain = %executor.chain(), "Awaiting order creation");
            self.wait_for_receipt(tx, executor).await?;
            let order: OrderRecord = self
                .wait_for_index(&self.order_url(executor.chain(), tx))
                .await?;
            info!(%tx, order_id = order.order_id, "Order created");
            Ok(order)
        })
    }

    fn await_trade_tx<'a>(
        &'a self,
        tx: &'a TxHash,
        executor: &'a dyn ChainExecutor,
    ) -> BoxFuture<'a, ExecutorResult<TradeRecord>> {
        Box::pin(async move {
            info!(%tx, chain = %executor.chain(), "Awaiting trade");
            self.wait_for_receipt(tx, executor).await?;
            let trade = self
                .wait_for_index(&self.trade_url(executor.chain(), tx))
                .await?;
            info!(%tx, "Trade executed");
            Ok(trade)
        })
    }

    fn await_transaction<'a>(
        &'a self,
        tx: &'a TxHash,
        executor: &'a dyn ChainExecutor,
        description: &'a str,
    ) -> BoxFuture<'a, ExecutorResult<TxReceipt>> {
        Box::pin(async move {
            info!(%tx, chain = %executor.chain(), "{description}");
            let receipt = self.wait_for_receipt(tx, executor).await?;
            info!(%tx, block = receipt.block_number, "{description}: confirmed");
            Ok(receipt)
        })
    }
}
