//! Execution strategy registry: the pluggable hooks the broker consults to
//! decide how a request gets signed and submitted.
//!
//! The registry is an ordinary value. Brokers either own one or share one
//! explicitly through [`SharedStrategies`]; every `execute` call works on a
//! snapshot taken when the call starts.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::capability::{SignerProvider, WalletInfoResolver};
use crate::error::RequestError;
use crate::ledger::{TransactionDelegate, WalletExecutor};
use crate::request::OperationKind;

#[derive(Clone, Default)]
pub struct ExecutionStrategyConfig {
    signer_provider: Option<Arc<dyn SignerProvider>>,
    wallet_info_resolver: Option<Arc<dyn WalletInfoResolver>>,
    operation_delegates: HashMap<OperationKind, Arc<dyn TransactionDelegate>>,
    wallet_executor: Option<Arc<dyn WalletExecutor>>,
    prefer_wallet_only: bool,
}

impl ExecutionStrategyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_signer_provider(&mut self, provider: Arc<dyn SignerProvider>) {
        self.signer_provider = Some(provider);
    }

    pub fn clear_signer_provider(&mut self) {
        self.signer_provider = None;
    }

    pub fn set_wallet_info_resolver(&mut self, resolver: Arc<dyn WalletInfoResolver>) {
        self.wallet_info_resolver = Some(resolver);
    }

    pub fn clear_wallet_info_resolver(&mut self) {
        self.wallet_info_resolver = None;
    }

    /// Register (or replace) the transaction builder for one operation.
    pub fn set_delegate(&mut self, operation: OperationKind, delegate: Arc<dyn TransactionDelegate>) {
        self.operation_delegates.insert(operation, delegate);
    }

    pub fn set_delegate_by_name(
        &mut self,
        operation_name: &str,
        delegate: Arc<dyn TransactionDelegate>,
    ) -> Result<(), RequestError> {
        let operation = operation_name.parse::<OperationKind>()?;
        self.set_delegate(operation, delegate);
        Ok(())
    }

    pub fn clear_delegate(&mut self, operation: OperationKind) {
        self.operation_delegates.remove(&operation);
    }

    pub fn set_wallet_executor(&mut self, executor: Arc<dyn WalletExecutor>) {
        self.wallet_executor = Some(executor);
    }

    pub fn clear_wallet_executor(&mut self) {
        self.wallet_executor = None;
    }

    pub fn set_prefer_wallet_only(&mut self, prefer: bool) {
        self.prefer_wallet_only = prefer;
    }

    pub fn with_signer_provider(mut self, provider: Arc<dyn SignerProvider>) -> Self {
        self.set_signer_provider(provider);
        self
    }

    pub fn with_wallet_info_resolver(mut self, resolver: Arc<dyn WalletInfoResolver>) -> Self {
        self.set_wallet_info_resolver(resolver);
        self
    }

    pub fn with_delegate(
        mut self,
        operation: OperationKind,
        delegate: Arc<dyn TransactionDelegate>,
    ) -> Self {
        self.set_delegate(operation, delegate);
        self
    }

    pub fn with_wallet_executor(mut self, executor: Arc<dyn WalletExecutor>) -> Self {
        self.set_wallet_executor(executor);
        self
    }

    pub fn with_prefer_wallet_only(mut self, prefer: bool) -> Self {
        self.set_prefer_wallet_only(prefer);
        self
    }

    pub fn signer_provider(&self) -> Option<&Arc<dyn SignerProvider>> {
        self.signer_provider.as_ref()
    }

    pub fn wallet_info_resolver(&self) -> Option<&Arc<dyn WalletInfoResolver>> {
        self.wallet_info_resolver.as_ref()
    }

    pub fn delegate(&self, operation: OperationKind) -> Option<&Arc<dyn TransactionDelegate>> {
        self.operation_delegates.get(&operation)
    }

    pub fn wallet_executor(&self) -> Option<&Arc<dyn WalletExecutor>> {
        self.wallet_executor.as_ref()
    }

    pub fn prefer_wallet_only(&self) -> bool {
        self.prefer_wallet_only
    }

    pub fn registered_delegates(&self) -> Vec<OperationKind> {
        let mut kinds: Vec<_> = self.operation_delegates.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }
}

impl fmt::Debug for ExecutionStrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionStrategyConfig")
            .field("signer_provider", &self.signer_provider.is_some())
            .field("wallet_info_resolver", &self.wallet_info_resolver.is_some())
            .field("operation_delegates", &self.registered_delegates())
            .field("wallet_executor", &self.wallet_executor.is_some())
            .field("prefer_wallet_only", &self.prefer_wallet_only)
            .finish()
    }
}

/// Strategy registry shared by reference between brokers.
#[derive(Clone, Default)]
pub struct SharedStrategies {
    inner: Arc<RwLock<ExecutionStrategyConfig>>,
}

impl SharedStrategies {
    pub fn new(config: ExecutionStrategyConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut ExecutionStrategyConfig),
    {
        let mut guard = self.inner.write().await;
        mutate(&mut guard);
    }

    pub async fn snapshot(&self) -> ExecutionStrategyConfig {
        self.inner.read().await.clone()
    }
}

impl From<ExecutionStrategyConfig> for SharedStrategies {
    fn from(config: ExecutionStrategyConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{wallet_info_fn, WalletInfo};
    use crate::error::LedgerError;
    use crate::ledger::UnsignedTransaction;
    use crate::request::{Network, OperationRequest};
    use async_trait::async_trait;

    struct FixedDelegate;

    #[async_trait]
    impl TransactionDelegate for FixedDelegate {
        async fn build(
            &self,
            _request: &OperationRequest,
            _wallet: &WalletInfo,
        ) -> Result<UnsignedTransaction, LedgerError> {
            Ok(UnsignedTransaction::new(b"AAA".to_vec()))
        }
    }

    #[test]
    fn setters_overwrite_and_clear() {
        let mut config = ExecutionStrategyConfig::new();
        assert!(!config.prefer_wallet_only());
        assert!(config.wallet_info_resolver().is_none());

        config.set_prefer_wallet_only(true);
        config.set_wallet_info_resolver(wallet_info_fn(|| None));
        config.set_delegate(OperationKind::RegisterEntry, Arc::new(FixedDelegate));
        assert!(config.prefer_wallet_only());
        assert!(config.wallet_info_resolver().is_some());
        assert!(config.delegate(OperationKind::RegisterEntry).is_some());
        assert!(config.delegate(OperationKind::DeleteEntry).is_none());

        config.set_prefer_wallet_only(false);
        config.clear_wallet_info_resolver();
        config.clear_delegate(OperationKind::RegisterEntry);
        assert!(!config.prefer_wallet_only());
        assert!(config.wallet_info_resolver().is_none());
        assert!(config.registered_delegates().is_empty());
    }

    #[test]
    fn delegates_register_by_wire_name() {
        let mut config = ExecutionStrategyConfig::new();
        config
            .set_delegate_by_name("inscriber.inscribe", Arc::new(FixedDelegate))
            .unwrap();
        assert_eq!(config.registered_delegates(), vec![OperationKind::Inscribe]);

        let err = config
            .set_delegate_by_name("hcs2.nope", Arc::new(FixedDelegate))
            .unwrap_err();
        assert!(matches!(err, RequestError::UnknownOperation(_)));
    }

    #[tokio::test]
    async fn snapshots_are_isolated_from_later_updates() {
        let shared = SharedStrategies::new(ExecutionStrategyConfig::new());
        let before = shared.snapshot().await;

        shared
            .update(|config| {
                config.set_prefer_wallet_only(true);
                config.set_wallet_info_resolver(wallet_info_fn(|| {
                    Some(WalletInfo::new("0.0.9", Network::Testnet))
                }));
            })
            .await;

        let after = shared.snapshot().await;
        assert!(!before.prefer_wallet_only());
        assert!(before.wallet_info_resolver().is_none());
        assert!(after.prefer_wallet_only());
        assert!(after.wallet_info_resolver().is_some());
    }
}
