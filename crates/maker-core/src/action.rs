//! Strategy actions.
//!
//! The strategy emits a JSON array of objects tagged by `type`. Known tags map
//! onto the typed variants below; any other tag is kept as
//! [`Action::Unsupported`] so the dispatcher can fail it explicitly instead of
//! dropping it or rejecting the whole batch at parse time.

use crate::decimal::{Amount, Price};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Order direction on the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[serde(alias = "BUY", alias = "Buy")]
    Buy,
    #[serde(alias = "SELL", alias = "Sell")]
    Sell,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Transaction hash as returned by the chain ("0x..." hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Place a new order on the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub blockchain: String,
    pub order_type: OrderType,
    pub amount: Amount,
    pub price: Price,
}

/// Fill (part of) an existing order, referenced by its creation transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub blockchain: String,
    pub amount: Amount,
    pub order_tx: TxHash,
}

/// Cancel an existing order, referenced by its creation transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub blockchain: String,
    pub order_tx: TxHash,
}

/// One strategy-emitted instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NewOrder(NewOrder),
    Trade(Trade),
    CancelOrder(CancelOrder),
    /// Action whose `type` tag is not recognised.
    Unsupported {
        kind: String,
        blockchain: Option<String>,
    },
}

/// Variant tag of an [`Action`], used for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    NewOrder,
    Trade,
    CancelOrder,
    Unsupported,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewOrder => "NewOrder",
            Self::Trade => "Trade",
            Self::CancelOrder => "CancelOrder",
            Self::Unsupported => "Unsupported",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::NewOrder(_) => ActionKind::NewOrder,
            Action::Trade(_) => ActionKind::Trade,
            Action::CancelOrder(_) => ActionKind::CancelOrder,
            Action::Unsupported { .. } => ActionKind::Unsupported,
        }
    }

    /// Target chain identifier exactly as the strategy wrote it.
    pub fn blockchain(&self) -> Option<&str> {
        match self {
            Action::NewOrder(a) => Some(&a.blockchain),
            Action::Trade(a) => Some(&a.blockchain),
            Action::CancelOrder(a) => Some(&a.blockchain),
            Action::Unsupported { blockchain, .. } => blockchain.as_deref(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::NewOrder(a) => write!(
                f,
                "NewOrder[{}] {} {} @ {}",
                a.blockchain, a.order_type, a.amount, a.price
            ),
            Action::Trade(a) => write!(f, "Trade[{}] {} against {}", a.blockchain, a.amount, a.order_tx),
            Action::CancelOrder(a) => write!(f, "CancelOrder[{}] {}", a.blockchain, a.order_tx),
            Action::Unsupported { kind, .. } => write!(f, "Unsupported[{kind}]"),
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_string();

        match kind.as_str() {
            "NewOrder" => serde_json::from_value(value)
                .map(Action::NewOrder)
                .map_err(D::Error::custom),
            "Trade" => serde_json::from_value(value)
                .map(Action::Trade)
                .map_err(D::Error::custom),
            "CancelOrder" => serde_json::from_value(value)
                .map(Action::CancelOrder)
                .map_err(D::Error::custom),
            _ => Ok(Action::Unsupported {
                blockchain: value
                    .get("blockchain")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                kind,
            }),
        }
    }
}
