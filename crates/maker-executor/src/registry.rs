//! Chain identifier to executor resolution.

use std::collections::HashMap;
use std::sync::Arc;

use maker_core::Chain;
use tracing::debug;

use crate::chain_executor::{ChainExecutor, DynChainExecutor};
use crate::error::{ExecutorError, ExecutorResult};

/// Fixed table of chain executors, built once at startup.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<Chain, DynChainExecutor>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor under the chain it reports.
    ///
    /// A later registration for the same chain replaces the earlier one.
    pub fn register(&mut self, executor: DynChainExecutor) {
        let chain = executor.chain();
        debug!(%chain, "Registered chain executor");
        self.executors.insert(chain, executor);
    }

    /// Builder-style [`Self::register`].
    pub fn with_executor(mut self, executor: impl ChainExecutor + 'static) -> Self {
        self.register(Arc::new(executor));
        self
    }

    /// Resolve a strategy-supplied identifier ("ETH", "etc", ...).
    ///
    /// Matching is case-insensitive. Unknown identifiers and supported chains
    /// without a registered executor both fail with `UnknownChain`.
    pub fn resolve(&self, blockchain: &str) -> ExecutorResult<DynChainExecutor> {
        let chain: Chain = blockchain
            .parse()
            .map_err(|_| ExecutorError::UnknownChain(blockchain.to_string()))?;
        self.get(chain)
    }

    /// Executor for an already parsed chain.
    pub fn get(&self, chain: Chain) -> ExecutorResult<DynChainExecutor> {
        self.executors
            .get(&chain)
            .cloned()
            .ok_or_else(|| ExecutorError::UnknownChain(chain.to_string()))
    }

    /// Registered chains, sorted.
    pub fn chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self.executors.keys().copied().collect();
        chains.sort();
        chains
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("chains", &self.chains())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_executor::MockChainExecutor;
    use tokio_test::assert_ok;

    fn registry() -> ExecutorRegistry {
        ExecutorRegistry::new()
            .with_executor(MockChainExecutor::new(Chain::Eth))
            .with_executor(MockChainExecutor::new(Chain::Etc))
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = registry();

        let upper = assert_ok!(registry.resolve("ETH"));
        let lower = assert_ok!(registry.resolve("eth"));
        assert!(Arc::ptr_eq(&upper, &lower));
        assert_eq!(assert_ok!(registry.resolve("Etc")).chain(), Chain::Etc);
    }

    #[test]
    fn test_resolve_unknown_chain() {
        match registry().resolve("BSC") {
            Err(ExecutorError::UnknownChain(name)) => assert_eq!(name, "BSC"),
            Err(other) => panic!("expected UnknownChain, got {other:?}"),
            Ok(_) => panic!("BSC must not resolve"),
        }
    }

    #[test]
    fn test_supported_chain_without_executor() {
        let registry = ExecutorRegistry::new().with_executor(MockChainExecutor::new(Chain::Eth));
        assert!(matches!(
            registry.resolve("ETC"),
            Err(ExecutorError::UnknownChain(_))
        ));
        assert_eq!(registry.chains(), vec![Chain::Eth]);
    }
}
