//! Exchange query seam: order lookup and confirmation waits.
//!
//! The three `await_*` operations resolve only once a submitted transaction is
//! mined and, for orders and trades, indexed by the exchange. They are the
//! points where the pipeline blocks before starting the next action.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use maker_core::{Chain, OrderRecord, TradeRecord, TxHash, TxReceipt};

use crate::chain_executor::{BoxFuture, CallLog, ChainExecutor};
use crate::error::{ExecutorError, ExecutorResult};

/// Reads exchange state and waits for confirmations.
pub trait QueryClient: Send + Sync {
    /// Look up the order created by `order_tx` on `chain`.
    ///
    /// Fails with `OrderNotFound` when the exchange does not know the order.
    fn get_order_by_tx<'a>(
        &'a self,
        order_tx: &'a TxHash,
        chain: Chain,
    ) -> BoxFuture<'a, ExecutorResult<OrderRecord>>;

    /// Wait until order-creation `tx` is mined and the order is indexed.
    fn await_order_tx<'a>(
        &'a self,
        tx: &'a TxHash,
        executor: &'a dyn ChainExecutor,
    ) -> BoxFuture<'a, ExecutorResult<OrderRecord>>;

    /// Wait until trade `tx` is mined and the trade is indexed.
    fn await_trade_tx<'a>(
        &'a self,
        tx: &'a TxHash,
        executor: &'a dyn ChainExecutor,
    ) -> BoxFuture<'a, ExecutorResult<TradeRecord>>;

    /// Wait until an arbitrary `tx` is mined successfully.
    ///
    /// `description` is a human-readable label used for progress logging.
    fn await_transaction<'a>(
        &'a self,
        tx: &'a TxHash,
        executor: &'a dyn ChainExecutor,
        description: &'a str,
    ) -> BoxFuture<'a, ExecutorResult<TxReceipt>>;
}

/// Arc wrapper for QueryClient trait objects.
pub type DynQueryClient = Arc<dyn QueryClient>;

// ============================================================================
// Mock
// ============================================================================

const MOCK_EXCHANGE_CONTRACT: &str = "0xexchange";

/// Mock query client for testing.
///
/// Orders confirmed through [`QueryClient::await_order_tx`] are remembered so a
/// later cancel in the same test can find them.
#[derive(Debug)]
pub struct MockQueryClient {
    log: Arc<CallLog>,
    orders: parking_lot::Mutex<HashMap<TxHash, OrderRecord>>,
    next_order_id: AtomicU64,
    /// Fail every confirmation wait with `Reverted`.
    fail_confirmations: AtomicBool,
    /// Never resolve confirmation waits.
    stall_confirmations: AtomicBool,
}

impl Default for MockQueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueryClient {
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    pub fn with_log(log: Arc<CallLog>) -> Self {
        Self {
            log,
            orders: parking_lot::Mutex::new(HashMap::new()),
            next_order_id: AtomicU64::new(1),
            fail_confirmations: AtomicBool::new(false),
            stall_confirmations: AtomicBool::new(false),
        }
    }

    /// Seed an order the exchange already knows about.
    pub fn insert_order(&self, order_tx: TxHash, order: OrderRecord) {
        self.orders.lock().insert(order_tx, order);
    }

    pub fn set_fail_confirmations(&self, fail: bool) {
        self.fail_confirmations.store(fail, Ordering::SeqCst);
    }

    pub fn set_stall_confirmations(&self, stall: bool) {
        self.stall_confirmations.store(stall, Ordering::SeqCst);
    }

    async fn confirm(&self, tx: &TxHash) -> ExecutorResult<()> {
        if self.stall_confirmations.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_confirmations.load(Ordering::SeqCst) {
            return Err(ExecutorError::Reverted(tx.clone()));
        }
        Ok(())
    }
}

impl QueryClient for MockQueryClient {
    fn get_order_by_tx<'a>(
        &'a self,
        order_tx: &'a TxHash,
        chain: Chain,
    ) -> BoxFuture<'a, ExecutorResult<OrderRecord>> {
        Box::pin(async move {
            self.log.push(format!("get_order_by_tx:{chain}:{order_tx}"));
            self.orders
                .lock()
                .get(order_tx)
                .cloned()
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
            self.log.push(format!("await_order_tx:{}:{tx}", executor.chain()));
            self.confirm(tx).await?;
            let order = OrderRecord {
                order_id: self.next_order_id.fetch_add(1, Ordering::SeqCst),
                contract: MOCK_EXCHANGE_CONTRACT.to_string(),
                transaction: Some(tx.clone()),
                active: Some(true),
            };
            self.orders.lock().insert(tx.clone(), order.clone());
            Ok(order)
        })
    }

    fn await_trade_tx<'a>(
        &'a self,
        tx: &'a TxHash,
        executor: &'a dyn ChainExecutor,
    ) -> BoxFuture<'a, ExecutorResult<TradeRecord>> {
        Box::pin(async move {
            self.log.push(format!("await_trade_tx:{}:{tx}", executor.chain()));
            self.confirm(tx).await?;
            Ok(TradeRecord {
                transaction: tx.clone(),
                order_id: None,
            })
        })
    }

    fn await_transaction<'a>(
        &'a self,
        tx: &'a TxHash,
        executor: &'a dyn ChainExecutor,
        description: &'a str,
    ) -> BoxFuture<'a, ExecutorResult<TxReceipt>> {
        Box::pin(async move {
            self.log.push(format!(
                "await_transaction:{}:{tx}:{description}",
                executor.chain()
            ));
            self.confirm(tx).await?;
            Ok(TxReceipt {
                tx_hash: tx.clone(),
                block_number: 1,
                success: true,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_executor::MockChainExecutor;

    #[tokio::test]
    async fn test_confirmed_order_is_found_later() {
        let query = MockQueryClient::new();
        let exec = MockChainExecutor::new(Chain::Eth);
        let tx = TxHash::from("0xorder");

        let confirmed = query.await_order_tx(&tx, &exec).await.unwrap();
        let found = query.get_order_by_tx(&tx, Chain::Eth).await.unwrap();

        assert_eq!(confirmed, found);
        assert!(found.is_open());
    }

    #[tokio::test]
    async fn test_unknown_order_not_found() {
        let query = MockQueryClient::new();
        let err = query
            .get_order_by_tx(&TxHash::from("0xmissing"), Chain::Etc)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::OrderNotFound { chain: Chain::Etc, .. }));
    }

    #[tokio::test]
    async fn test_failed_confirmation() {
        let query = MockQueryClient::new();
        query.set_fail_confirmations(true);
        let exec = MockChainExecutor::new(Chain::Eth);

        let result = query
            .await_transaction(&TxHash::from("0xdead"), &exec, "Cancelling order 0xabc")
            .await;
        assert!(matches!(result, Err(ExecutorError::Reverted(_))));
    }
}
