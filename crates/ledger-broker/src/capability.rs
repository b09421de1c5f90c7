use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credential::OperatorCredential;
use crate::ledger::DirectSigner;
use crate::request::Network;

/// Signing capability handed to the broker by a signer provider. The set of
/// variants is closed: a provider decides which one it returns when it is
/// registered, the broker never inspects the value's shape at call time.
#[derive(Clone)]
pub enum SignerCapability {
    /// External signer that signs and submits on its own.
    Submitting(Arc<dyn DirectSigner>),
    /// In-process key; the broker submits through the ledger write client.
    Operator(OperatorCredential),
}

impl SignerCapability {
    pub fn submitting(signer: Arc<dyn DirectSigner>) -> Self {
        Self::Submitting(signer)
    }

    pub fn account_id(&self) -> &str {
        match self {
            Self::Submitting(signer) => signer.account_id(),
            Self::Operator(credential) => credential.account_id(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitting(_) => "submitting",
            Self::Operator(_) => "operator",
        }
    }
}

impl fmt::Debug for SignerCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerCapability")
            .field("kind", &self.as_str())
            .field("account_id", &self.account_id())
            .finish()
    }
}

/// Account connected through the user's wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub account_id: String,
    pub network: Network,
}

impl WalletInfo {
    pub fn new(account_id: impl Into<String>, network: Network) -> Self {
        Self {
            account_id: account_id.into(),
            network,
        }
    }
}

/// Resolves the direct signer, if any, at the start of each request.
#[async_trait]
pub trait SignerProvider: Send + Sync {
    async fn resolve(&self) -> Option<SignerCapability>;
}

/// Resolves the connected wallet, if any, at the start of each request.
#[async_trait]
pub trait WalletInfoResolver: Send + Sync {
    async fn resolve(&self) -> Option<WalletInfo>;
}

struct SyncFn<F>(F);

struct AsyncFn<F>(F);

#[async_trait]
impl<F> SignerProvider for SyncFn<F>
where
    F: Fn() -> Option<SignerCapability> + Send + Sync,
{
    async fn resolve(&self) -> Option<SignerCapability> {
        (self.0)()
    }
}

#[async_trait]
impl<F, Fut> SignerProvider for AsyncFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Option<SignerCapability>> + Send + 'static,
{
    async fn resolve(&self) -> Option<SignerCapability> {
        (self.0)().await
    }
}

#[async_trait]
impl<F> WalletInfoResolver for SyncFn<F>
where
    F: Fn() -> Option<WalletInfo> + Send + Sync,
{
    async fn resolve(&self) -> Option<WalletInfo> {
        (self.0)()
    }
}

#[async_trait]
impl<F, Fut> WalletInfoResolver for AsyncFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Option<WalletInfo>> + Send + 'static,
{
    async fn resolve(&self) -> Option<WalletInfo> {
        (self.0)().await
    }
}

/// Wrap a synchronous closure as a signer provider.
pub fn signer_provider_fn<F>(provider: F) -> Arc<dyn SignerProvider>
where
    F: Fn() -> Option<SignerCapability> + Send + Sync + 'static,
{
    Arc::new(SyncFn(provider))
}

/// Wrap a closure returning a future as a signer provider.
pub fn async_signer_provider_fn<F, Fut>(provider: F) -> Arc<dyn SignerProvider>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<SignerCapability>> + Send + 'static,
{
    Arc::new(AsyncFn(provider))
}

/// Wrap a synchronous closure as a wallet-info resolver.
pub fn wallet_info_fn<F>(resolver: F) -> Arc<dyn WalletInfoResolver>
where
    F: Fn() -> Option<WalletInfo> + Send + Sync + 'static,
{
    Arc::new(SyncFn(resolver))
}

/// Wrap a closure returning a future as a wallet-info resolver.
pub fn async_wallet_info_fn<F, Fut>(resolver: F) -> Arc<dyn WalletInfoResolver>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<WalletInfo>> + Send + 'static,
{
    Arc::new(AsyncFn(resolver))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_HEX: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    #[tokio::test]
    async fn sync_and_async_providers_resolve_alike() {
        let credential = OperatorCredential::from_hex("0.0.5", SEED_HEX).unwrap();
        let sync_credential = credential.clone();
        let sync = signer_provider_fn(move || Some(SignerCapability::Operator(sync_credential.clone())));
        let deferred = async_signer_provider_fn(move || {
            let credential = credential.clone();
            async move { Some(SignerCapability::Operator(credential)) }
        });

        let a = sync.resolve().await.expect("sync provider yields signer");
        let b = deferred.resolve().await.expect("async provider yields signer");
        assert_eq!(a.account_id(), "0.0.5");
        assert_eq!(b.account_id(), "0.0.5");
        assert_eq!(a.as_str(), "operator");
    }

    #[tokio::test]
    async fn wallet_resolvers_may_yield_absent() {
        let none = wallet_info_fn(|| None);
        assert!(none.resolve().await.is_none());

        let some = async_wallet_info_fn(|| async { Some(WalletInfo::new("0.0.7", Network::Testnet)) });
        let info = some.resolve().await.unwrap();
        assert_eq!(info.account_id, "0.0.7");
        assert_eq!(serde_json::to_value(&info).unwrap()["accountId"], "0.0.7");
    }
}
