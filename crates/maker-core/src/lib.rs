//! Core domain types for the Saturn market-maker bot.
//!
//! This crate provides the types shared by the execution pipeline and the bot:
//! - `Action`: Strategy-emitted instruction (new order, trade, cancel)
//! - `Chain`: Supported blockchain networks (ETH, ETC)
//! - `Price`, `Amount`: Precision-safe numeric types
//! - `TradingParams`: Decimal trading parameters from the bot config
//! - `ActionOutcome`: Confirmed result of one executed action

pub mod action;
pub mod chain;
pub mod decimal;
pub mod error;
pub mod execution;
pub mod params;

pub use action::{Action, ActionKind, CancelOrder, NewOrder, OrderType, Trade, TxHash};
pub use chain::Chain;
pub use decimal::{Amount, Price};
pub use error::{CoreError, Result};
pub use execution::{ActionOutcome, Confirmation, OrderRecord, TradeRecord, TxReceipt};
pub use params::TradingParams;
