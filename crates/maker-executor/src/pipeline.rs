//! Strictly sequential, abort-on-failure task runner.
//!
//! Task k+1 is invoked only after task k has resolved successfully. The first
//! failure stops the batch: later tasks are never invoked and the error is
//! returned to the caller together with what already completed. Completed
//! actions are on-chain and are not rolled back.

use std::time::{Duration, Instant};

use maker_core::{ActionKind, ActionOutcome};
use maker_telemetry::Metrics;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::dispatch::ActionTask;
use crate::error::ExecutorError;

/// Batch stopped at a failing action.
#[derive(Debug, Error)]
#[error("action #{failed_index} ({label}) failed, {skipped} skipped: {source}")]
pub struct PipelineAbort {
    /// Zero-based position of the failed task in the batch.
    pub failed_index: usize,
    pub kind: ActionKind,
    pub label: String,
    /// Outcomes of tasks that confirmed before the failure.
    pub completed: Vec<ActionOutcome>,
    /// Number of tasks never invoked.
    pub skipped: usize,
    #[source]
    pub source: ExecutorError,
}

/// Sequential pipeline.
#[derive(Debug, Clone, Default)]
pub struct SequentialPipeline {
    /// Upper bound on one task's submit-to-confirmation time. `None` waits forever.
    step_timeout: Option<Duration>,
}

impl SequentialPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step_timeout(step_timeout: Duration) -> Self {
        Self {
            step_timeout: Some(step_timeout),
        }
    }

    /// Run `tasks` in order.
    ///
    /// An empty batch succeeds immediately with no outcomes.
    pub async fn run(&self, tasks: Vec<ActionTask>) -> Result<Vec<ActionOutcome>, PipelineAbort> {
        let total = tasks.len();
        let mut completed = Vec::with_capacity(total);
        let mut remaining = tasks.into_iter().enumerate();

        while let Some((index, task)) = remaining.next() {
            let kind = task.kind();
            let chain_label = task.chain_label();
            let label = task.label().to_string();

            debug!(index, total, action = %label, "Executing action");
            let started = Instant::now();

            match self.run_one(task).await {
                Ok(outcome) => {
                    let elapsed = started.elapsed().as_secs_f64();
                    Metrics::action_executed(kind.as_str(), chain_label, "confirmed");
                    Metrics::action_latency(kind.as_str(), elapsed);
                    info!(
                        index,
                        total,
                        action = %label,
                        tx = %outcome.tx_hash,
                        elapsed_secs = elapsed,
                        "Action confirmed"
                    );
                    completed.push(outcome);
                }
                Err(source) => {
                    Metrics::action_executed(kind.as_str(), chain_label, "failed");
                    let skipped: Vec<ActionTask> = remaining.map(|(_, t)| t).collect();
                    for t in &skipped {
                        Metrics::action_executed(t.kind().as_str(), t.chain_label(), "skipped");
                    }
                    error!(index, total, action = %label, error = %source, "Action failed, aborting batch");
                    if !skipped.is_empty() {
                        warn!(count = skipped.len(), "Skipping remaining actions");
                    }
                    return Err(PipelineAbort {
                        failed_index: index,
                        kind,
                        label,
                        completed,
                        skipped: skipped.len(),
                        source,
                    });
                }
            }
        }

        Ok(completed)
    }

    async fn run_one(&self, task: ActionTask) -> Result<ActionOutcome, ExecutorError> {
        match self.step_timeout {
            None => task.invoke().await,
            Some(limit) => {
                let action = task.label().to_string();
                tokio::time::timeout(limit, task.invoke())
                    .await
                    .map_err(|_| ExecutorError::ConfirmationTimeout {
                        action,
                        timeout_secs: limit.as_secs(),
                    })?
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_executor::{BoxFuture, CallLog, MockChainExecutor};
    use crate::dispatch::ActionDispatcher;
    use crate::error::ExecutorResult;
    use crate::query::MockQueryClient;
    use crate::registry::ExecutorRegistry;
    use maker_core::{Action, Amount, CancelOrder, Chain, NewOrder, OrderType, Price, Trade, TxHash};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(index: usize, counter: Arc<AtomicUsize>, order: Arc<CallLog>, fail: bool) -> ActionTask {
        ActionTask::new(ActionKind::NewOrder, "ETH", format!("task{index}"), move || -> BoxFuture<'static, ExecutorResult<ActionOutcome>> {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                order.push(format!("task{index}"));
                if fail {
                    return Err(ExecutorError::SubmissionFailed(format!("task{index}")));
                }
                Ok(ActionOutcome::new(
                    ActionKind::NewOrder,
                    Chain::Eth,
                    TxHash::new(format!("0x{index}")),
                    maker_core::Confirmation::Transaction(maker_core::TxReceipt {
                        tx_hash: TxHash::new(format!("0x{index}")),
                        block_number: 1,
                        success: true,
                    }),
                ))
            })
        })
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds() {
        let outcomes = SequentialPipeline::new().run(Vec::new()).await.unwrap();
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let log = CallLog::new();
        let tasks = (0..3)
            .map(|i| counting_task(i, counter.clone(), log.clone(), false))
            .collect();

        let outcomes = SequentialPipeline::new().run(tasks).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(log.entries(), vec!["task0", "task1", "task2"]);
    }

    #[tokio::test]
    async fn test_first_failure_skips_rest() {
        let counter = Arc::new(AtomicUsize::new(0));
        let log = CallLog::new();
        let tasks = vec![
            counting_task(0, counter.clone(), log.clone(), false),
            counting_task(1, counter.clone(), log.clone(), true),
            counting_task(2, counter.clone(), log.clone(), false),
        ];

        let abort = SequentialPipeline::new().run(tasks).await.unwrap_err();

        assert_eq!(abort.failed_index, 1);
        assert_eq!(abort.completed.len(), 1);
        assert_eq!(abort.skipped, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(matches!(abort.source, ExecutorError::SubmissionFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_timeout_aborts() {
        let log = CallLog::new();
        let query = Arc::new(MockQueryClient::with_log(log.clone()));
        query.set_stall_confirmations(true);
        let registry = ExecutorRegistry::new().with_executor(MockChainExecutor::with_log(Chain::Eth, log.clone()));
        let dispatcher = ActionDispatcher::new(Arc::new(registry), query, "0xtoken");

        let action = Action::NewOrder(NewOrder {
            blockchain: "ETH".to_string(),
            order_type: OrderType::Sell,
            amount: Amount::new(dec!(1)),
            price: Price::new(dec!(1)),
        });
        let tasks = vec![dispatcher.dispatch(action.clone()), dispatcher.dispatch(action)];

        let abort = SequentialPipeline::with_step_timeout(Duration::from_secs(600))
            .run(tasks)
            .await
            .unwrap_err();

        assert_eq!(abort.failed_index, 0);
        assert_eq!(abort.skipped, 1);
        assert!(matches!(
            abort.source,
            ExecutorError::ConfirmationTimeout { timeout_secs: 600, .. }
        ));
        // Only the first submission happened.
        assert_eq!(log.entries().iter().filter(|e| e.starts_with("new_order")).count(), 1);
    }

    #[tokio::test]
    async fn test_new_order_then_trade_on_same_order() {
        let log = CallLog::new();
        let query = Arc::new(MockQueryClient::with_log(log.clone()));
        let registry = ExecutorRegistry::new()
            .with_executor(MockChainExecutor::with_log(Chain::Eth, log.clone()))
            .with_executor(MockChainExecutor::with_log(Chain::Etc, log.clone()));
        let dispatcher = ActionDispatcher::new(Arc::new(registry), query, "0xtoken");

        let actions = vec![
            Action::NewOrder(NewOrder {
                blockchain: "ETH".to_string(),
                order_type: OrderType::Buy,
                amount: Amount::new(dec!(10)),
                price: Price::new(dec!(0.2)),
            }),
            Action::Trade(Trade {
                blockchain: "ETH".to_string(),
                amount: Amount::new(dec!(5)),
                order_tx: TxHash::from("0xeth0001"),
            }),
            Action::CancelOrder(CancelOrder {
                blockchain: "eth".to_string(),
                order_tx: TxHash::from("0xeth0001"),
            }),
        ];
        let tasks = actions.into_iter().map(|a| dispatcher.dispatch(a)).collect();

        let outcomes = SequentialPipeline::new().run(tasks).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            log.entries(),
            vec![
                "new_order:ETH:0xtoken:buy:10@0.2",
                "await_order_tx:ETH:0xeth0001",
                "new_trade:ETH:5:0xeth0001",
                "await_trade_tx:ETH:0xeth0002",
                "get_order_by_tx:ETH:0xeth0001",
                "cancel_order:ETH:1:0xexchange",
                "await_transaction:ETH:0xeth0003:Cancelling order 0xeth0001",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_type_aborts_rest_of_batch() {
        let log = CallLog::new();
        let query = Arc::new(MockQueryClient::with_log(log.clone()));
        let registry = ExecutorRegistry::new().with_executor(MockChainExecutor::with_log(Chain::Eth, log.clone()));
        let dispatcher = ActionDispatcher::new(Arc::new(registry), query, "0xtoken");

        let actions = vec![
            Action::Unsupported {
                kind: "Bogus".to_string(),
                blockchain: Some("ETH".to_string()),
            },
            Action::NewOrder(NewOrder {
                blockchain: "ETH".to_string(),
                order_type: OrderType::Buy,
                amount: Amount::new(dec!(1)),
                price: Price::new(dec!(1)),
            }),
        ];
        let tasks = actions.into_iter().map(|a| dispatcher.dispatch(a)).collect();

        let abort = SequentialPipeline::new().run(tasks).await.unwrap_err();

        assert_eq!(abort.failed_index, 0);
        assert!(matches!(abort.source, ExecutorError::UnknownActionType(_)));
        assert!(log.entries().is_empty());
    }
}
