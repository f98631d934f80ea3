//! Trading parameters shared with the strategy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Numeric trading parameters from the bot config.
///
/// Opaque to the execution pipeline; forwarded to the strategy. All values are
/// exact decimals since spread, dust and band comparisons decide order prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingParams {
    /// Minimum base-currency balance to keep trading.
    pub fund_minimum: Decimal,
    /// Maximum token inventory.
    pub token_limit: Decimal,
    /// Quoted spread as a fraction (0.05 = 5%).
    pub spread: Decimal,
    /// Orders below this amount are ignored as dust.
    pub dust_cutoff: Decimal,
    /// Width of each price band.
    pub band_size: Decimal,
}

impl TradingParams {
    /// Reject negative values.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("fundMinimum", self.fund_minimum),
            ("tokenLimit", self.token_limit),
            ("spread", self.spread),
            ("dustCutoff", self.dust_cutoff),
            ("bandSize", self.band_size),
        ];
        for (name, value) in fields {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> TradingParams {
        TradingParams {
            fund_minimum: dec!(0.1),
            token_limit: dec!(10000),
            spread: dec!(0.05),
            dust_cutoff: dec!(0.001),
            band_size: dec!(0.01),
        }
    }

    #[test]
    fn test_valid_params() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_negative_param_rejected() {
        let params = TradingParams {
            spread: dec!(-0.01),
            ..sample()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("spread"));
    }

    #[test]
    fn test_params_are_exact_from_json() {
        let json = r#"{"fundMinimum":"0.1","tokenLimit":10000,"spread":0.05,"dustCutoff":"0.001","bandSize":"0.01"}"#;
        let params: TradingParams = serde_json::from_str(json).unwrap();
        assert_eq!(params, sample());
    }

    #[test]
    fn test_high_precision_json_number() {
        let json = r#"{"fundMinimum":0.123456789012345678901,"tokenLimit":"10000","spread":0.05,"dustCutoff":"0.001","bandSize":"0.01"}"#;
        let params: TradingParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.fund_minimum, dec!(0.123456789012345678901));
        assert_eq!(params.spread, dec!(0.05));
    }
}
