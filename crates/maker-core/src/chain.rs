//! Blockchain network identifiers.

use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Blockchain network the exchange contracts are deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chain {
    /// Ethereum mainnet.
    Eth,
    /// Ethereum Classic.
    Etc,
}

impl Chain {
    /// EIP-155 chain id.
    #[inline]
    pub fn chain_id(self) -> u64 {
        match self {
            Chain::Eth => 1,
            Chain::Etc => 61,
        }
    }

    /// Public RPC node used when the config does not override `provider`.
    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Chain::Eth => "https://mainnet.infura.io/mew",
            Chain::Etc => "https://etc-rpc.binancechain.io/",
        }
    }

    /// Canonical identifier used by the exchange API ("ETH", "ETC").
    pub fn as_str(self) -> &'static str {
        match self {
            Chain::Eth => "ETH",
            Chain::Etc => "ETC",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: "eth", "Eth" and "ETH" all parse to `Chain::Eth`.
impl FromStr for Chain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ETH" => Ok(Chain::Eth),
            "ETC" => Ok(Chain::Etc),
            _ => Err(CoreError::UnknownChain(s.to_string())),
        }
    }
}

impl Serialize for Chain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
