//! Bot configuration.

use std::time::Duration;

use maker_core::{Chain, TradingParams};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Dry run: fetch and log actions only, nothing is submitted.
    Observation,
    /// Dispatch actions on-chain.
    #[default]
    Trading,
}

fn default_api_url() -> String {
    maker_executor::saturn::DEFAULT_API_URL.to_string()
}

fn default_confirmation_timeout_secs() -> u64 {
    600
}

fn default_receipt_poll_ms() -> u64 {
    4_000
}

/// Bot configuration, loaded once from the `-j` JSON file.
///
/// Keys are camelCase. The five trading parameters sit at the top level next
/// to `blockchain` and `token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Chain to trade on ("ETH" / "ETC", any case).
    pub blockchain: String,
    /// Token contract address.
    pub token: String,
    #[serde(flatten)]
    pub params: TradingParams,
    /// JSON-RPC URL override. Defaults to the chain's public node.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub mode: OperatingMode,
    /// Saturn ticker API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Strategy endpoint returning each cycle's actions.
    #[serde(default)]
    pub strategy_url: Option<String>,
    /// Exchange SDK bridge that submits transactions. Required unless observing.
    #[serde(default)]
    pub bridge_url: Option<String>,
    /// Per-action submit-to-confirmation limit.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    /// Receipt / index polling interval while awaiting confirmation.
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
}

impl BotConfig {
    /// Load and validate configuration from a JSON file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(content: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.chain()?;

        if self.token.trim().is_empty() {
            return Err(AppError::Config("token must not be empty".to_string()));
        }

        self.params
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if self.strategy_url.is_none() {
            return Err(AppError::Config("strategyUrl is required".to_string()));
        }

        if self.mode == OperatingMode::Trading && self.bridge_url.is_none() {
            return Err(AppError::Config(
                "bridgeUrl is required in trading mode".to_string(),
            ));
        }

        if self.confirmation_timeout_secs == 0 {
            return Err(AppError::Config(
                "confirmationTimeoutSecs must be positive".to_string(),
            ));
        }

        if self.receipt_poll_ms == 0 {
            return Err(AppError::Config("receiptPollMs must be positive".to_string()));
        }

        Ok(())
    }

    /// Configured chain. Unknown identifiers are a configuration error.
    pub fn chain(&self) -> AppResult<Chain> {
        self.blockchain
            .parse()
            .map_err(|_| AppError::Config(format!("Unknown chain: {}", self.blockchain)))
    }

    /// RPC URL: `provider` if set, else the chain's default node.
    pub fn rpc_url(&self) -> AppResult<String> {
        match &self.provider {
            Some(url) => Ok(url.clone()),
            None => Ok(self.chain()?.default_rpc_url().to_string()),
        }
    }

    pub fn is_observation_mode(&self) -> bool {
        self.mode == OperatingMode::Observation
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MINIMAL: &str = r#"{
        "blockchain": "ETC",
        "token": "0xac55641cbb734bdf6510d1bbd62e240c2409040f",
        "fundMinimum": "0.1",
        "tokenLimit": 100000,
        "spread": 0.05,
        "dustCutoff": "0.0001",
        "bandSize": "0.01",
        "strategyUrl": "http://localhost:8080/actions",
        "bridgeUrl": "http://localhost:8090"
    }"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = BotConfig::from_json_str(MINIMAL).unwrap();

        assert_eq!(config.chain().unwrap(), Chain::Etc);
        assert_eq!(config.mode, OperatingMode::Trading);
        assert!(!config.is_observation_mode());
        assert_eq!(config.api_url, "https://ticker.saturn.network/api/v2");
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(600));
        assert_eq!(config.receipt_poll_interval(), Duration::from_millis(4000));
        assert_eq!(config.params.spread, dec!(0.05));
        assert_eq!(config.params.token_limit, dec!(100000));
    }

    #[test]
    fn test_rpc_url_default_and_override() {
        let config = BotConfig::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.rpc_url().unwrap(), "https://etc-rpc.binancechain.io/");

        let overridden = BotConfig {
            provider: Some("http://localhost:8545".to_string()),
            ..config
        };
        assert_eq!(overridden.rpc_url().unwrap(), "http://localhost:8545");
    }

    #[test]
    fn test_unknown_chain_rejected() {
        let json = MINIMAL.replace(r#""ETC""#, r#""BSC""#);
        let err = BotConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("BSC")));
    }

    #[test]
    fn test_lowercase_chain_accepted() {
        let json = MINIMAL.replace(r#""ETC""#, r#""eth""#);
        let config = BotConfig::from_json_str(&json).unwrap();
        assert_eq!(config.chain().unwrap(), Chain::Eth);
    }

    #[test]
    fn test_trading_mode_requires_bridge() {
        let json = MINIMAL.replace(
            r#""bridgeUrl": "http://localhost:8090""#,
            r#""provider": "http://localhost:8545""#,
        );
        let err = BotConfig::from_json_str(&json).unwrap_err();
        assert!(err.to_string().contains("bridgeUrl"));
    }

    #[test]
    fn test_observation_is_opt_in_and_needs_no_bridge() {
        let json = MINIMAL.replace(
            r#""bridgeUrl": "http://localhost:8090""#,
            r#""mode": "observation""#,
        );
        let config = BotConfig::from_json_str(&json).unwrap();
        assert!(config.is_observation_mode());
        assert!(config.bridge_url.is_none());
    }

    #[test]
    fn test_high_precision_parameter_survives_flatten() {
        let json = MINIMAL.replace(r#""spread": 0.05"#, r#""spread": 0.050000000000000000001"#);
        let config = BotConfig::from_json_str(&json).unwrap();
        assert_eq!(config.params.spread, dec!(0.050000000000000000001));
    }

    #[test]
    fn test_negative_parameter_rejected() {
        let json = MINIMAL.replace(r#""0.0001""#, r#""-1""#);
        let err = BotConfig::from_json_str(&json).unwrap_err();
        assert!(err.to_string().contains("dustCutoff"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            BotConfig::from_json_str("{not json"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            BotConfig::from_file("/nonexistent/maker.json"),
            Err(AppError::Config(_))
        ));
    }
}
