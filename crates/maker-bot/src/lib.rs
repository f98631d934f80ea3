//! Saturn Network market-maker bot.
//!
//! Orchestrates one polling loop:
//! - Strategy query for the cycle's actions
//! - Sequential, confirmation-gated execution (trading mode)
//! - Action logging only (observation mode)

pub mod app;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod poller;
pub mod strategy;

pub use app::Application;
pub use config::{BotConfig, OperatingMode};
pub use context::BotContext;
pub use credentials::wallet_source;
pub use error::{AppError, AppResult, StrategyError, StrategyResult};
pub use poller::{CycleOutcome, LoopState, PollingLoop};
pub use strategy::{HttpStrategy, Strategy};
