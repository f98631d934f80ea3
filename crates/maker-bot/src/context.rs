//! Immutable runtime context shared by the polling loop.

use std::sync::Arc;
use std::time::Duration;

use maker_executor::{ActionDispatcher, SequentialPipeline};

use crate::config::OperatingMode;
use crate::strategy::Strategy;

/// Everything one cycle needs, built once at startup.
pub struct BotContext {
    pub mode: OperatingMode,
    pub strategy: Arc<dyn Strategy>,
    pub dispatcher: ActionDispatcher,
    pub pipeline: SequentialPipeline,
    /// Sleep between the end of one cycle and the start of the next.
    pub delay: Duration,
}

impl BotContext {
    pub fn new(
        mode: OperatingMode,
        strategy: Arc<dyn Strategy>,
        dispatcher: ActionDispatcher,
        pipeline: SequentialPipeline,
        delay: Duration,
    ) -> Self {
        Self {
            mode,
            strategy,
            dispatcher,
            pipeline,
            delay,
        }
    }
}

impl std::fmt::Debug for BotContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotContext")
            .field("mode", &self.mode)
            .field("pipeline", &self.pipeline)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
