//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Wallet error: {0}")]
    Wallet(#[from] maker_executor::WalletError),

    #[error("Executor error: {0}")]
    Executor(#[from] maker_executor::ExecutorError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] maker_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Failure to obtain a cycle's actions.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid strategy response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for StrategyError {
    fn from(e: reqwest::Error) -> Self {
        StrategyError::Http(e.to_string())
    }
}

pub type StrategyResult<T> = Result<T, StrategyError>;
