//! [`ChainExecutor`] that submits through the exchange SDK bridge.
//!
//! Contract encoding, gas pricing and raw transaction signing live behind the
//! bridge. The bot posts a wallet-signed request describing the exchange call
//! and gets the transaction hash back. Receipts are read directly from the
//! chain's JSON-RPC node.
//!
//! # Request format
//!
//! ```text
//! POST {bridge_url}/transactions
//! X-Maker-Address:   0x<wallet address>
//! X-Maker-Signature: 0x<EIP-191 signature over the body>
//!
//! {"id":1,"blockchain":"ETC","from":"0x..","call":{"method":"newOrder","params":{..}}}
//! ```
//!
//! Response: `{"tx":"0x.."}` on success, `{"error":".."}` otherwise.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use maker_core::{Amount, Chain, OrderType, Price, TxHash, TxReceipt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain_executor::{BoxFuture, ChainExecutor};
use crate::error::{ExecutorError, ExecutorResult};
use crate::rpc::RpcClient;
use crate::wallet::Wallet;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Wire Format Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
enum BridgeCall<'a> {
    #[serde(rename_all = "camelCase")]
    NewOrder {
        token: &'a str,
        order_type: OrderType,
        amount: Amount,
        price: Price,
    },
    #[serde(rename_all = "camelCase")]
    NewTrade { amount: Amount, order_tx: &'a TxHash },
    #[serde(rename_all = "camelCase")]
    CancelOrder { order_id: u64, contract: &'a str },
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    blockchain: Chain,
    from: String,
    call: BridgeCall<'a>,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    tx: Option<TxHash>,
    #[serde(default)]
    error: Option<String>,
}

// ============================================================================
// BridgeExecutor
// ============================================================================

/// Chain executor for one blockchain, backed by the SDK bridge.
#[derive(Debug)]
pub struct BridgeExecutor {
    chain: Chain,
    client: Client,
    bridge_url: String,
    rpc: RpcClient,
    wallet: Arc<Wallet>,
    next_request_id: AtomicU64,
}

impl BridgeExecutor {
    pub fn new(
        chain: Chain,
        bridge_url: impl Into<String>,
        rpc: RpcClient,
        wallet: Arc<Wallet>,
    ) -> ExecutorResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExecutorError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            chain,
            client,
            bridge_url: bridge_url.into().trim_end_matches('/').to_string(),
            rpc,
            wallet,
            next_request_id: AtomicU64::new(1),
        })
    }

    async fn submit(&self, call: BridgeCall<'_>) -> ExecutorResult<TxHash> {
        let request = BridgeRequest {
            id: self.next_request_id.fetch_add(1, Ordering::Relaxed),
            blockchain: self.chain,
            from: self.wallet.address().to_string(),
            call,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| ExecutorError::SubmissionFailed(format!("encode request: {e}")))?;
        let signature = self.wallet.sign_payload(&body).await?;

        debug!(chain = %self.chain, id = request.id, "Submitting to bridge");

        let response = self
            .client
            .post(format!("{}/transactions", self.bridge_url))
            .header("content-type", "application/json")
            .header("X-Maker-Address", &request.from)
            .header("X-Maker-Signature", signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let parsed: Option<BridgeResponse> = serde_json::from_str(&text).ok();

        match parsed {
            Some(BridgeResponse { tx: Some(tx), .. }) if status.is_success() => {
                info!(chain = %self.chain, %tx, "Transaction submitted");
                Ok(tx)
            }
            Some(BridgeResponse {
                error: Some(error), ..
            }) => Err(ExecutorError::SubmissionFailed(format!("HTTP {status}: {error}"))),
            _ => Err(ExecutorError::SubmissionFailed(format!("HTTP {status}: {text}"))),
        }
    }
}

impl ChainExecutor for BridgeExecutor {
    fn chain(&self) -> Chain {
        self.chain
    }

    fn new_order<'a>(
        &'a self,
        token: &'a str,
        order_type: OrderType,
        amount: Amount,
        price: Price,
    ) -> BoxFuture<'a, ExecutorResult<TxHash>> {
        Box::pin(self.submit(BridgeCall::NewOrder {
            token,
            order_type,
            amount,
            price,
        }))
    }

    fn new_trade<'a>(
        &'a self,
        amount: Amount,
        order_tx: &'a TxHash,
    ) -> BoxFuture<'a, ExecutorResult<TxHash>> {
        Box::pin(self.submit(BridgeCall::NewTrade { amount, order_tx }))
    }

    fn cancel_order<'a>(
        &'a self,
        order_id: u64,
        contract: &'a str,
    ) -> BoxFuture<'a, ExecutorResult<TxHash>> {
        Box::pin(self.submit(BridgeCall::CancelOrder { order_id, contract }))
    }

    fn transaction_receipt<'a>(
        &'a self,
        tx: &'a TxHash,
    ) -> BoxFuture<'a, ExecutorResult<Option<TxReceipt>>> {
        Box::pin(self.rpc.transaction_receipt(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::WalletSource;
    use mockito::Matcher;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use zeroize::Zeroizing;

    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn executor(url: String, chain: Chain) -> BridgeExecutor {
        let wallet = Wallet::load(WalletSource::PrivateKey(Zeroizing::new(
            TEST_PRIVATE_KEY.to_string(),
        )))
        .unwrap();
        let rpc = RpcClient::new(url.clone()).unwrap();
        BridgeExecutor::new(chain, url, rpc, Arc::new(wallet)).unwrap()
    }

    #[tokio::test]
    async fn test_new_order_posts_signed_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/transactions")
            .match_header("X-Maker-Signature", Matcher::Regex("^0x[0-9a-f]{130}$".into()))
            .match_body(Matcher::PartialJson(json!({
                "blockchain": "ETC",
                "call": {
                    "method": "newOrder",
                    "params": {
                        "token": "0xtoken",
                        "orderType": "sell",
                        "amount": "25",
                        "price": "0.002"
                    }
                }
            })))
            .with_body(r#"{"tx":"0xsubmitted"}"#)
            .create_async()
            .await;

        let exec = executor(server.url(), Chain::Etc);
        let tx = exec
            .new_order(
                "0xtoken",
                OrderType::Sell,
                Amount::new(dec!(25)),
                Price::new(dec!(0.002)),
            )
            .await
            .unwrap();

        assert_eq!(tx.as_str(), "0xsubmitted");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bridge_error_is_submission_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/transactions")
            .with_status(400)
            .with_body(r#"{"error":"insufficient funds"}"#)
            .create_async()
            .await;

        let exec = executor(server.url(), Chain::Eth);
        let err = exec.cancel_order(5, "0xexchange").await.unwrap_err();

        match err {
            ExecutorError::SubmissionFailed(msg) => assert!(msg.contains("insufficient funds")),
            other => panic!("expected SubmissionFailed, got {other:?}"),
        }
    }
}
