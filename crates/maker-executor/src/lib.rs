//! Action dispatch and sequential on-chain execution.
//!
//! Turns the strategy's abstract actions into confirmed transactions.
//!
//! # Key Components
//!
//! - [`ExecutorRegistry`]: Resolves a blockchain identifier to its [`ChainExecutor`]
//! - [`ActionDispatcher`]: Maps each [`maker_core::Action`] to a deferred [`ActionTask`]
//! - [`SequentialPipeline`]: Runs tasks one at a time, aborting the batch on failure
//! - [`SaturnQuery`]: [`QueryClient`] backed by the Saturn ticker API and chain receipts
//! - [`BridgeExecutor`]: [`ChainExecutor`] that submits wallet-signed requests to the SDK bridge
//! - [`RpcClient`]: JSON-RPC client for transaction receipts
//! - [`Wallet`]: Private key / mnemonic wallet used to sign bridge requests
//!
//! # Batch contract
//!
//! Actions of one batch run strictly in emission order. Action k+1 starts only
//! after action k is confirmed on-chain; the first failure skips the rest of
//! the batch. Already confirmed actions are never rolled back.

pub mod bridge;
pub mod chain_executor;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod registry;
pub mod rpc;
pub mod saturn;
pub mod wallet;

pub use bridge::BridgeExecutor;
pub use chain_executor::{BoxFuture, CallLog, ChainExecutor, DynChainExecutor, MockChainExecutor};
pub use dispatch::{ActionDispatcher, ActionTask};
pub use error::{ExecutorError, ExecutorResult};
pub use pipeline::{PipelineAbort, SequentialPipeline};
pub use query::{DynQueryClient, MockQueryClient, QueryClient};
pub use registry::ExecutorRegistry;
pub use rpc::RpcClient;
pub use saturn::SaturnQuery;
pub use wallet::{derivation_path, Wallet, WalletError, WalletSource};
