//! Execution results and exchange records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, TxHash};
use crate::chain::Chain;

/// Mined transaction receipt, reduced to what the pipeline inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `false` when the transaction was mined but reverted.
    pub success: bool,
}

/// Order as indexed by the exchange API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: u64,
    /// Exchange contract holding the order.
    pub contract: String,
    #[serde(default)]
    pub transaction: Option<TxHash>,
    /// `Some(false)` once the order is filled or cancelled.
    #[serde(default)]
    pub active: Option<bool>,
}

impl OrderRecord {
    /// Whether the order can still be traded against or cancelled.
    pub fn is_open(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

/// Trade as indexed by the exchange API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(alias = "tx")]
    pub transaction: TxHash,
    #[serde(default)]
    pub order_id: Option<u64>,
}

/// Confirmation evidence for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confirmation {
    Order(OrderRecord),
    Trade(TradeRecord),
    Transaction(TxReceipt),
}

/// Successful, confirmed execution of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub kind: ActionKind,
    pub chain: Chain,
    pub tx_hash: TxHash,
    pub confirmation: Confirmation,
    pub confirmed_at: DateTime<Utc>,
}

impl ActionOutcome {
    pub fn new(kind: ActionKind, chain: Chain, tx_hash: TxHash, confirmation: Confirmation) -> Self {
        Self {
            kind,
            chain,
            tx_hash,
            confirmation,
            confirmed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_record_from_api_json() {
        let json = r#"{"order_id":42,"contract":"0xexchange","transaction":"0xabc","active":true,"price":"0.1"}"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();

        assert_eq!(order.order_id, 42);
        assert_eq!(order.contract, "0xexchange");
        assert!(order.is_open());
    }

    #[test]
    fn test_order_record_inactive() {
        let json = r#"{"order_id":7,"contract":"0xexchange","active":false}"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();
        assert!(!order.is_open());
    }

    #[test]
    fn test_trade_record_tx_alias() {
        let trade: TradeRecord = serde_json::from_str(r#"{"tx":"0xfeed"}"#).unwrap();
        assert_eq!(trade.transaction.as_str(), "0xfeed");
        assert_eq!(trade.order_id, None);
    }
}
