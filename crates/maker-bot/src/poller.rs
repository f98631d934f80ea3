//! Poll / execute / sleep loop.
//!
//! State machine with two states, broadcast on a watch channel:
//!
//! ```text
//! Idle --(start, or delay elapsed)--> Running --(cycle settled)--> Idle
//! ```
//!
//! Every cycle error is caught and logged here; the loop always re-arms after
//! exactly one delay. Only the injected shutdown future ends it.

use std::future::Future;
use std::sync::Arc;

use maker_core::Action;
use maker_telemetry::Metrics;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::OperatingMode;
use crate::context::BotContext;

/// Polling loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// How a cycle settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Strategy returned no actions; the pipeline was not invoked.
    Idle,
    /// Observation mode: actions were logged, not executed.
    Observed { actions: usize },
    /// Every action confirmed.
    Executed { actions: usize },
    StrategyFailed,
    /// Batch aborted at `failed_index` after `completed` confirmations.
    PipelineFailed { failed_index: usize, completed: usize },
}

impl CycleOutcome {
    /// Metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleOutcome::Idle => "idle",
            CycleOutcome::Observed { .. } => "observed",
            CycleOutcome::Executed { .. } => "ok",
            CycleOutcome::StrategyFailed => "strategy_error",
            CycleOutcome::PipelineFailed { .. } => "pipeline_error",
        }
    }
}

/// The bot's main loop.
pub struct PollingLoop {
    ctx: Arc<BotContext>,
    state_tx: watch::Sender<LoopState>,
}

impl PollingLoop {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        let (state_tx, _) = watch::channel(LoopState::Idle);
        Self { ctx, state_tx }
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LoopState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> LoopState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: LoopState) {
        self.state_tx.send_replace(state);
        Metrics::loop_running(state == LoopState::Running);
    }

    /// Run cycles until `shutdown` resolves. Returns the number of cycles started.
    ///
    /// A shutdown arriving mid-cycle drops the in-flight cycle: a transaction
    /// already submitted stays on-chain but is no longer awaited.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles: u64 = 0;

        loop {
            cycles += 1;
            self.set_state(LoopState::Running);

            tokio::select! {
                outcome = self.run_cycle() => {
                    Metrics::cycle_completed(outcome.as_str());
                    debug!(cycle = cycles, outcome = outcome.as_str(), "Cycle settled");
                }
                _ = &mut shutdown => {
                    warn!(cycle = cycles, "Shutdown during cycle, abandoning in-flight actions");
                    self.set_state(LoopState::Idle);
                    break;
                }
            }

            self.set_state(LoopState::Idle);

            tokio::select! {
                _ = tokio::time::sleep(self.ctx.delay) => {}
                _ = &mut shutdown => break,
            }
        }

        info!(cycles, "Polling loop stopped");
        cycles
    }

    /// One poll / execute pass. Never fails; errors become the outcome.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let actions = match self.ctx.strategy.get_actions().await {
            Ok(actions) => actions,
            Err(e) => {
                error!(error = %e, "Strategy query failed");
                return CycleOutcome::StrategyFailed;
            }
        };

        Metrics::actions_received(actions.len());
        if actions.is_empty() {
            debug!("No actions this cycle");
            return CycleOutcome::Idle;
        }

        match self.ctx.mode {
            OperatingMode::Observation => self.observe(&actions),
            OperatingMode::Trading => self.execute(actions).await,
        }
    }

    fn observe(&self, actions: &[Action]) -> CycleOutcome {
        for (index, action) in actions.iter().enumerate() {
            info!(index, kind = %action.kind(), %action, "Observed action (not executed)");
        }
        CycleOutcome::Observed {
            actions: actions.len(),
        }
    }

    async fn execute(&self, actions: Vec<Action>) -> CycleOutcome {
        let total = actions.len();
        info!(total, "Executing actions");

        let tasks = actions
            .into_iter()
            .map(|action| self.ctx.dispatcher.dispatch(action))
            .collect();

        match self.ctx.pipeline.run(tasks).await {
            Ok(outcomes) => {
                info!(total = outcomes.len(), "All actions confirmed");
                CycleOutcome::Executed {
                    actions: outcomes.len(),
                }
            }
            Err(abort) => {
                error!(
                    failed_index = abort.failed_index,
                    kind = %abort.kind,
                    completed = abort.completed.len(),
                    skipped = abort.skipped,
                    error = %abort.source,
                    "Batch aborted"
                );
                CycleOutcome::PipelineFailed {
                    failed_index: abort.failed_index,
                    completed: abort.completed.len(),
                }
            }
        }
    }
}
