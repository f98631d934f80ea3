//! Strategy that replays pre-recorded batches.

use std::collections::VecDeque;

use maker_bot::{Strategy, StrategyError, StrategyResult};
use maker_core::Action;
use maker_executor::BoxFuture;
use parking_lot::Mutex;
use tokio::time::Instant;

/// Replays queued responses, then returns `fallback` forever.
pub struct ScriptedStrategy {
    script: Mutex<VecDeque<StrategyResult<Vec<Action>>>>,
    fallback: Fallback,
    calls: Mutex<Vec<Instant>>,
}

#[derive(Clone, Copy)]
pub enum Fallback {
    Empty,
    Fail,
}

impl ScriptedStrategy {
    pub fn new(fallback: Fallback) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Strategy that always fails.
    pub fn failing() -> Self {
        Self::new(Fallback::Fail)
    }

    pub fn then_actions(self, actions: Vec<Action>) -> Self {
        self.script.lock().push_back(Ok(actions));
        self
    }

    /// Instants at which `get_actions` was called.
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Strategy for ScriptedStrategy {
    fn get_actions(&self) -> BoxFuture<'_, StrategyResult<Vec<Action>>> {
        Box::pin(async move {
            self.calls.lock().push(Instant::now());
            let next = self.script.lock().pop_front();
            match next {
                Some(result) => result,
                None => match self.fallback {
                    Fallback::Empty => Ok(Vec::new()),
                    Fallback::Fail => Err(StrategyError::Http("strategy unavailable".to_string())),
                },
            }
        })
    }
}
