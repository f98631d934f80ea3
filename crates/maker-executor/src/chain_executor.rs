//! Per-chain transaction submission seam.
//!
//! A [`ChainExecutor`] submits exchange transactions on one blockchain and
//! reports their receipts. Submission returns as soon as the transaction hash
//! is known; confirmation is the [`crate::QueryClient`]'s job.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use maker_core::{Amount, Chain, OrderType, Price, TxHash, TxReceipt};

use crate::error::{ExecutorError, ExecutorResult};

/// Boxed future type for trait object compatibility.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Submits exchange transactions on a single blockchain.
pub trait ChainExecutor: Send + Sync {
    /// Chain this executor is bound to.
    fn chain(&self) -> Chain;

    /// Place an order for `token`. Resolves to the order-creation tx hash.
    fn new_order<'a>(
        &'a self,
        token: &'a str,
        order_type: OrderType,
        amount: Amount,
        price: Price,
    ) -> BoxFuture<'a, ExecutorResult<TxHash>>;

    /// Fill `amount` of the order created by `order_tx`.
    fn new_trade<'a>(
        &'a self,
        amount: Amount,
        order_tx: &'a TxHash,
    ) -> BoxFuture<'a, ExecutorResult<TxHash>>;

    /// Cancel order `order_id` held by exchange `contract`.
    fn cancel_order<'a>(
        &'a self,
        order_id: u64,
        contract: &'a str,
    ) -> BoxFuture<'a, ExecutorResult<TxHash>>;

    /// Receipt of a mined transaction, `None` while still pending.
    fn transaction_receipt<'a>(
        &'a self,
        tx: &'a TxHash,
    ) -> BoxFuture<'a, ExecutorResult<Option<TxReceipt>>>;
}

/// Arc wrapper for ChainExecutor trait objects.
pub type DynChainExecutor = Arc<dyn ChainExecutor>;

// ============================================================================
// Mock
// ============================================================================

/// Ordered record of calls shared between mocks.
///
/// Executor and query mocks append to the same log so tests can assert the
/// exact interleaving of submissions and confirmations.
#[derive(Debug, Default)]
pub struct CallLog {
    entries: parking_lot::Mutex<Vec<String>>,
}

impl CallLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Mock chain executor for testing.
///
/// Hands out sequential tx hashes (`0xeth0001`, `0xeth0002`, ...) and records
/// every call in its [`CallLog`].
#[derive(Debug)]
pub struct MockChainExecutor {
    chain: Chain,
    log: Arc<CallLog>,
    next_tx: AtomicU64,
    /// Fail every submission with `SubmissionFailed`.
    fail_submissions: AtomicBool,
    /// Report mined receipts as reverted.
    revert_receipts: AtomicBool,
}

impl MockChainExecutor {
    /// Create a mock with its own call log.
    pub fn new(chain: Chain) -> Self {
        Self::with_log(chain, CallLog::new())
    }

    /// Create a mock writing to a shared call log.
    pub fn with_log(chain: Chain, log: Arc<CallLog>) -> Self {
        Self {
            chain,
            log,
            next_tx: AtomicU64::new(1),
            fail_submissions: AtomicBool::new(false),
            revert_receipts: AtomicBool::new(false),
        }
    }

    pub fn set_fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::SeqCst);
    }

    pub fn set_revert_receipts(&self, revert: bool) {
        self.revert_receipts.store(revert, Ordering::SeqCst);
    }

    pub fn log(&self) -> Arc<CallLog> {
        Arc::clone(&self.log)
    }

    /// Recorded calls, in order.
    pub fn calls(&self) -> Vec<String> {
        self.log.entries()
    }

    fn submit(&self, entry: String) -> ExecutorResult<TxHash> {
        self.log.push(entry);
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(ExecutorError::SubmissionFailed(format!(
                "mock {} submission rejected",
                self.chain
            )));
        }
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        Ok(TxHash::new(format!(
            "0x{}{:04}",
            self.chain.as_str().to_lowercase(),
            n
        )))
    }
}

impl ChainExecutor for MockChainExecutor {
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
        Box::pin(async move {
            self.submit(format!(
                "new_order:{}:{token}:{order_type}:{amount}@{price}",
                self.chain
            ))
        })
    }

    fn new_trade<'a>(
        &'a self,
        amount: Amount,
        order_tx: &'a TxHash,
    ) -> BoxFuture<'a, ExecutorResult<TxHash>> {
        Box::pin(async move { self.submit(format!("new_trade:{}:{amount}:{order_tx}", self.chain)) })
    }

    fn cancel_order<'a>(
        &'a self,
        order_id: u64,
        contract: &'a str,
    ) -> BoxFuture<'a, ExecutorResult<TxHash>> {
        Box::pin(async move {
            self.submit(format!("cancel_order:{}:{order_id}:{contract}", self.chain))
        })
    }

    fn transaction_receipt<'a>(
        &'a self,
        tx: &'a TxHash,
    ) -> BoxFuture<'a, ExecutorResult<Option<TxReceipt>>> {
        Box::pin(async move {
            Ok(Some(TxReceipt {
                tx_hash: tx.clone(),
                block_number: 1,
                success: !self.revert_receipts.load(Ordering::SeqCst),
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_hands_out_sequential_hashes() {
        let exec = MockChainExecutor::new(Chain::Etc);

        let first = exec
            .new_order("0xtoken", OrderType::Buy, Amount::new(dec!(10)), Price::new(dec!(0.5)))
            .await
            .unwrap();
        let second = exec
            .new_trade(Amount::new(dec!(1)), &first)
            .await
            .unwrap();

        assert_eq!(first.as_str(), "0xetc0001");
        assert_eq!(second.as_str(), "0xetc0002");
        assert_eq!(
            exec.calls(),
            vec![
                "new_order:ETC:0xtoken:buy:10@0.5".to_string(),
                "new_trade:ETC:1:0xetc0001".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_submission_failure() {
        let exec = MockChainExecutor::new(Chain::Eth);
        exec.set_fail_submissions(true);

        let result = exec.cancel_order(3, "0xexchange").await;
        assert!(matches!(result, Err(ExecutorError::SubmissionFailed(_))));
        assert_eq!(exec.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_receipt_reflects_revert_flag() {
        let exec = MockChainExecutor::new(Chain::Eth);
        let tx = TxHash::from("0xabc");

        assert!(exec.transaction_receipt(&tx).await.unwrap().unwrap().success);
        exec.set_revert_receipts(true);
        assert!(!exec.transaction_receipt(&tx).await.unwrap().unwrap().success);
    }
}
