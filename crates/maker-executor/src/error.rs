//! Executor error types.

use maker_core::{Chain, TxHash};
use thiserror::Error;

use crate::wallet::WalletError;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Order not found for tx {order_tx} on {chain}")]
    OrderNotFound { order_tx: TxHash, chain: Chain },

    #[error("Order {order_tx} is no longer active")]
    OrderInactive { order_tx: TxHash },

    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    #[error("Confirmation timed out after {timeout_secs}s: {action}")]
    ConfirmationTimeout { action: String, timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
}

impl From<reqwest::Error> for ExecutorError {
    fn from(e: reqwest::Error) -> Self {
        ExecutorError::Network(e.to_string())
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
