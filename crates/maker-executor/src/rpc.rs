//! Minimal Ethereum JSON-RPC client.
//!
//! Only what confirmation tracking needs: `eth_getTransactionReceipt`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use maker_core::{TxHash, TxReceipt};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::trace;

use crate::error::{ExecutorError, ExecutorResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// JSON-RPC over HTTP against a single node URL.
#[derive(Debug)]
pub struct RpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> ExecutorResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExecutorError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one call and return its `result` member (possibly `null`).
    pub async fn call(&self, method: &str, params: Value) -> ExecutorResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        trace!(method, id, url = %self.url, "JSON-RPC request");

        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutorError::Network(format!(
                "{method}: HTTP {status}: {body}"
            )));
        }

        let mut value: Value = response.json().await.map_err(|e| {
            ExecutorError::InvalidResponse(format!("failed to parse {method} response JSON: {e}"))
        })?;

        if let Some(error) = value.get("error") {
            return Err(ExecutorError::InvalidResponse(format!(
                "rpc returned error for {method}: {error}"
            )));
        }

        Ok(value.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    /// Receipt for `tx`, or `None` while the transaction is pending.
    pub async fn transaction_receipt(&self, tx: &TxHash) -> ExecutorResult<Option<TxReceipt>> {
        let result = self
            .call("eth_getTransactionReceipt", json!([tx.as_str()]))
            .await?;
        parse_receipt(tx, &result)
    }
}

/// Reduce a raw receipt object to a [`TxReceipt`].
///
/// A receipt without `blockNumber` is still pending. A missing `status` field
/// (pre-Byzantium receipts) counts as success.
fn parse_receipt(tx: &TxHash, raw: &Value) -> ExecutorResult<Option<TxReceipt>> {
    if raw.is_null() {
        return Ok(None);
    }

    let block_number = match raw.get("blockNumber").and_then(Value::as_str) {
        Some(block) => parse_hex_u64(block, "blockNumber")?,
        None => return Ok(None),
    };

    let success = match raw.get("status").and_then(Value::as_str) {
        Some(status) => parse_hex_u64(status, "status")? == 1,
        None => true,
    };

    Ok(Some(TxReceipt {
        tx_hash: tx.clone(),
        block_number,
        success,
    }))
}

fn parse_hex_u64(raw: &str, field: &str) -> ExecutorResult<u64> {
    let value = raw.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| ExecutorError::InvalidResponse(format!("{field} must be 0x-prefixed hex")))?;
    u64::from_str_radix(digits, 16).map_err(|e| {
        ExecutorError::InvalidResponse(format!("failed to parse {field} as hex u64: {e}"))
    })
}
