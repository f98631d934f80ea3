//! Action to executable task mapping.
//!
//! [`ActionDispatcher::dispatch`] performs no I/O. It captures everything an
//! action needs into an [`ActionTask`] whose work starts only when the
//! pipeline invokes it, so nothing runs before its predecessor is confirmed.

use std::sync::Arc;

use maker_core::{
    Action, ActionKind, ActionOutcome, CancelOrder, Chain, Confirmation, NewOrder, Trade,
};
use tracing::info;

use crate::chain_executor::BoxFuture;
use crate::error::{ExecutorError, ExecutorResult};
use crate::query::DynQueryClient;
use crate::registry::ExecutorRegistry;

type TaskFn = Box<dyn FnOnce() -> BoxFuture<'static, ExecutorResult<ActionOutcome>> + Send>;

/// Metrics label for identifiers that are not a supported chain.
pub const UNKNOWN_CHAIN_LABEL: &str = "unknown";

/// Deferred unit of work for one action.
pub struct ActionTask {
    kind: ActionKind,
    chain_label: &'static str,
    label: String,
    run: TaskFn,
}

impl ActionTask {
    pub fn new<F>(kind: ActionKind, chain_label: &'static str, label: impl Into<String>, run: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, ExecutorResult<ActionOutcome>> + Send + 'static,
    {
        Self {
            kind,
            chain_label,
            label: label.into(),
            run: Box::new(run),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Canonical chain name, or [`UNKNOWN_CHAIN_LABEL`]. Bounded set, safe as a metric label.
    pub fn chain_label(&self) -> &'static str {
        self.chain_label
    }

    /// Human-readable description of the action.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Start the work.
    pub fn invoke(self) -> BoxFuture<'static, ExecutorResult<ActionOutcome>> {
        (self.run)()
    }
}

impl std::fmt::Debug for ActionTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionTask")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Maps strategy actions onto executor and query calls.
#[derive(Clone)]
pub struct ActionDispatcher {
    registry: Arc<ExecutorRegistry>,
    query: DynQueryClient,
    /// Token contract every new order is placed for.
    token: Arc<str>,
}

impl ActionDispatcher {
    pub fn new(registry: Arc<ExecutorRegistry>, query: DynQueryClient, token: impl Into<Arc<str>>) -> Self {
        Self {
            registry,
            query,
            token: token.into(),
        }
    }

    /// Build the task for `action`.
    ///
    /// - `NewOrder`: submit, then wait for the order to be indexed.
    /// - `Trade`: submit, then wait for the trade to be indexed.
    /// - `CancelOrder`: look up the order, submit the cancel, wait for it to be mined.
    /// - anything else: fails with `UnknownActionType` when invoked.
    pub fn dispatch(&self, action: Action) -> ActionTask {
        let kind = action.kind();
        let chain_label = action
            .blockchain()
            .and_then(|name| name.parse::<Chain>().ok())
            .map_or(UNKNOWN_CHAIN_LABEL, Chain::as_str);
        let label = action.to_string();

        let this = self.clone();
        let run = move || -> BoxFuture<'static, ExecutorResult<ActionOutcome>> {
            Box::pin(async move {
                match action {
                    Action::NewOrder(order) => this.new_order(order).await,
                    Action::Trade(trade) => this.new_trade(trade).await,
                    Action::CancelOrder(cancel) => this.cancel_order(cancel).await,
                    Action::Unsupported { kind, .. } => Err(ExecutorError::UnknownActionType(kind)),
                }
            })
        };

        ActionTask::new(kind, chain_label, label, run)
    }

    async fn new_order(&self, order: NewOrder) -> ExecutorResult<ActionOutcome> {
        let executor = self.registry.resolve(&order.blockchain)?;
        let tx = executor
            .new_order(&self.token, order.order_type, order.amount, order.price)
            .await?;
        let record = self.query.await_order_tx(&tx, executor.as_ref()).await?;
        info!(chain = %executor.chain(), %tx, order_id = record.order_id, "NewOrder confirmed");

        Ok(ActionOutcome::new(
            ActionKind::NewOrder,
            executor.chain(),
            tx,
            Confirmation::Order(record),
        ))
    }

    async fn new_trade(&self, trade: Trade) -> ExecutorResult<ActionOutcome> {
        let executor = self.registry.resolve(&trade.blockchain)?;
        let tx = executor.new_trade(trade.amount, &trade.order_tx).await?;
        let record = self.query.await_trade_tx(&tx, executor.as_ref()).await?;
        info!(chain = %executor.chain(), %tx, order_tx = %trade.order_tx, "Trade confirmed");

        Ok(ActionOutcome::new(
            ActionKind::Trade,
            executor.chain(),
            tx,
            Confirmation::Trade(record),
        ))
    }

    async fn cancel_order(&self, cancel: CancelOrder) -> ExecutorResult<ActionOutcome> {
        let executor = self.registry.resolve(&cancel.blockchain)?;
        let order = self
            .query
            .get_order_by_tx(&cancel.order_tx, executor.chain())
            .await?;
        if !order.is_open() {
            return Err(ExecutorError::OrderInactive {
                order_tx: cancel.order_tx,
            });
        }

        let tx = executor.cancel_order(order.order_id, &order.contract).await?;
        let description = format!("Cancelling order {}", cancel.order_tx);
        let receipt = self
            .query
            .await_transaction(&tx, executor.as_ref(), &description)
            .await?;

        Ok(ActionOutcome::new(
            ActionKind::CancelOrder,
            executor.chain(),
            tx,
            Confirmation::Transaction(receipt),
        ))
    }
}
