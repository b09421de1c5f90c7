use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::capability::{SignerCapability, WalletInfo};
use crate::classify::{classify, StrategyFailure};
use crate::credential::OperatorCredential;
use crate::error::{CodedError, SettingsError};
use crate::ledger::{LedgerWriteClient, MirrorReader, StateStatus, UnsignedTransaction};
use crate::mirror::MirrorNodeClient;
use crate::poller::{ConfirmationPoller, PollOutcome, Sleeper, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
use crate::request::OperationRequest;
use crate::result::{Confirmation, ExecutionPath, ExecutionResult, LedgerOutcome};
use crate::settings::{BrokerSettings, ConfirmationSettings};
use crate::strategy::{ExecutionStrategyConfig, SharedStrategies};

/// Per-call knobs. Confirmation settings only matter for operations whose
/// completion is observed through the read side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    pub wait_for_confirmation: bool,
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            wait_for_confirmation: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl ExecuteOptions {
    pub fn wait_for_confirmation(mut self, wait: bool) -> Self {
        self.wait_for_confirmation = wait;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl From<&ConfirmationSettings> for ExecuteOptions {
    fn from(settings: &ConfirmationSettings) -> Self {
        Self {
            wait_for_confirmation: true,
            max_attempts: settings.max_attempts,
            interval: Duration::from_millis(settings.interval_ms),
        }
    }
}

/// Result of one strategy attempt. The broker branches on this value to
/// decide whether to try the next strategy.
#[derive(Debug)]
enum StrategyOutcome {
    Executed(LedgerOutcome),
    Declined(&'static str),
    Failed(StrategyFailure),
}

enum StrategySource {
    Owned(ExecutionStrategyConfig),
    Shared(SharedStrategies),
}

impl StrategySource {
    async fn snapshot(&self) -> ExecutionStrategyConfig {
        match self {
            Self::Owned(config) => config.clone(),
            Self::Shared(shared) => shared.snapshot().await,
        }
    }
}

/// Decides which of the three strategies executes a request, executes it,
/// and reports one uniform [`ExecutionResult`].
pub struct ExecutionBroker {
    strategies: StrategySource,
    ledger: Arc<dyn LedgerWriteClient>,
    operator: Option<OperatorCredential>,
    poller: Option<ConfirmationPoller>,
    defaults: ExecuteOptions,
}

impl ExecutionBroker {
    pub fn builder(ledger: Arc<dyn LedgerWriteClient>) -> ExecutionBrokerBuilder {
        ExecutionBrokerBuilder::new(ledger)
    }

    /// Confirmation defaults configured on the builder.
    pub fn default_options(&self) -> ExecuteOptions {
        self.defaults
    }

    /// Execute `request` through the first strategy able to sign it. At most
    /// one strategy submits to the ledger per call.
    pub async fn execute(&self, request: &OperationRequest, options: &ExecuteOptions) -> ExecutionResult {
        let span = info_span!(
            "execute",
            operation = request.operation_name(),
            network = request.network().as_str(),
            fingerprint = %request.fingerprint(),
        );
        self.execute_inner(request, options).instrument(span).await
    }

    async fn execute_inner(&self, request: &OperationRequest, options: &ExecuteOptions) -> ExecutionResult {
        let strategies = self.strategies.snapshot().await;
        let prefer_wallet_only = strategies.prefer_wallet_only();

        match self.try_direct_signer(&strategies, request).await {
            StrategyOutcome::Executed(outcome) => {
                info!(path = "direct_signer", "operation executed");
                return ExecutionResult::success(outcome);
            }
            StrategyOutcome::Failed(failure) => {
                return fail(&failure, prefer_wallet_only);
            }
            StrategyOutcome::Declined(reason) => debug!(reason, "direct signer path skipped"),
        }

        let wallet = resolve_wallet(&strategies).await;
        if wallet.is_none() && prefer_wallet_only {
            return fail(
                &StrategyFailure::no_signing_path(
                    "no wallet is connected and autonomous signing is disabled",
                ),
                prefer_wallet_only,
            );
        }

        if let Some(wallet) = &wallet {
            match self.try_wallet(&strategies, request, wallet, options).await {
                StrategyOutcome::Executed(outcome) => {
                    info!(path = "wallet", account = %wallet.account_id, "operation executed");
                    return ExecutionResult::success(outcome);
                }
                StrategyOutcome::Failed(StrategyFailure::WalletHandoff(err)) if !prefer_wallet_only => {
                    warn!(error = %err, "wallet hand-off failed; falling back to autonomous signing");
                }
                StrategyOutcome::Failed(failure) => {
                    return fail(&failure, prefer_wallet_only);
                }
                StrategyOutcome::Declined(reason) => debug!(reason, "wallet path skipped"),
            }
        }

        if prefer_wallet_only {
            return fail(
                &StrategyFailure::no_signing_path(format!(
                    "wallet signing is unavailable for {} and autonomous signing is disabled",
                    request.operation_name()
                )),
                prefer_wallet_only,
            );
        }

        match self.try_operator(request).await {
            StrategyOutcome::Executed(outcome) => {
                info!(path = "operator", "operation executed");
                ExecutionResult::success(outcome)
            }
            StrategyOutcome::Failed(failure) => fail(&failure, prefer_wallet_only),
            StrategyOutcome::Declined(reason) => fail(
                &StrategyFailure::no_signing_path(format!(
                    "no signer, wallet, or operator credential is available ({reason})"
                )),
                prefer_wallet_only,
            ),
        }
    }

    /// Build the unsigned transaction for `request` without submitting it,
    /// unless a wallet executor is configured, in which case the wallet
    /// submits it. Never falls back to autonomous signing.
    pub async fn prepare(&self, request: &OperationRequest, options: &ExecuteOptions) -> ExecutionResult {
        let span = info_span!(
            "prepare",
            operation = request.operation_name(),
            network = request.network().as_str(),
            fingerprint = %request.fingerprint(),
        );
        self.prepare_inner(request, options).instrument(span).await
    }

    async fn prepare_inner(&self, request: &OperationRequest, options: &ExecuteOptions) -> ExecutionResult {
        let strategies = self.strategies.snapshot().await;
        let prefer_wallet_only = strategies.prefer_wallet_only();

        let Some(delegate) = strategies.delegate(request.operation()) else {
            return fail(
                &StrategyFailure::no_signing_path(format!(
                    "no transaction builder is registered for {}",
                    request.operation_name()
                )),
                prefer_wallet_only,
            );
        };

        let connected = resolve_wallet(&strategies).await;
        let payer = match (&connected, &self.operator) {
            (Some(wallet), _) => wallet.clone(),
            (None, Some(operator)) => WalletInfo::new(operator.account_id(), request.network()),
            (None, None) => {
                return fail(
                    &StrategyFailure::no_signing_path("no wallet or operator account to build for"),
                    prefer_wallet_only,
                )
            }
        };

        let unsigned = match delegate.build(request, &payer).await {
            Ok(unsigned) => unsigned,
            Err(err) => return fail(&StrategyFailure::WalletHandoff(err), prefer_wallet_only),
        };

        if connected.is_some() && strategies.wallet_executor().is_some() {
            return match self
                .submit_via_wallet(&strategies, request, unsigned, options)
                .await
            {
                StrategyOutcome::Executed(outcome) => ExecutionResult::success(outcome),
                StrategyOutcome::Failed(failure) => fail(&failure, prefer_wallet_only),
                StrategyOutcome::Declined(reason) => fail(
                    &StrategyFailure::no_signing_path(reason),
                    prefer_wallet_only,
                ),
            };
        }

        info!(bytes = unsigned.bytes.len(), "unsigned transaction prepared");
        ExecutionResult::PendingSignature {
            operation_name: request.operation_name().to_string(),
            unsigned_bytes: unsigned.bytes,
            details: unsigned.details,
        }
    }

    async fn try_direct_signer(
        &self,
        strategies: &ExecutionStrategyConfig,
        request: &OperationRequest,
    ) -> StrategyOutcome {
        let Some(provider) = strategies.signer_provider() else {
            return StrategyOutcome::Declined("no signer provider configured");
        };
        let Some(capability) = provider.resolve().await else {
            return StrategyOutcome::Declined("signer provider yielded no signer");
        };

        debug!(capability = capability.as_str(), account = capability.account_id(), "using direct signer");
        let submitted = match &capability {
            SignerCapability::Submitting(signer) => signer.execute(request).await,
            SignerCapability::Operator(credential) => self.ledger.submit(request, credential).await,
        };

        match submitted {
            Ok(receipt) => {
                StrategyOutcome::Executed(LedgerOutcome::from_receipt(ExecutionPath::DirectSigner, receipt))
            }
            Err(err) => StrategyOutcome::Failed(StrategyFailure::DirectSigner(err)),
        }
    }

    async fn try_wallet(
        &self,
        strategies: &ExecutionStrategyConfig,
        request: &OperationRequest,
        wallet: &WalletInfo,
        options: &ExecuteOptions,
    ) -> StrategyOutcome {
        let Some(delegate) = strategies.delegate(request.operation()) else {
            return StrategyOutcome::Declined("no transaction builder registered for operation");
        };
        if strategies.wallet_executor().is_none() {
            return StrategyOutcome::Declined("no wallet executor configured");
        }
        if wallet.network != request.network() {
            warn!(
                wallet_network = wallet.network.as_str(),
                "connected wallet is on a different network than the request"
            );
        }

        match delegate.build(request, wallet).await {
            Ok(unsigned) => {
                self.submit_via_wallet(strategies, request, unsigned, options)
                    .await
            }
            Err(err) => StrategyOutcome::Failed(StrategyFailure::WalletHandoff(err)),
        }
    }

    async fn submit_via_wallet(
        &self,
        strategies: &ExecutionStrategyConfig,
        request: &OperationRequest,
        unsigned: UnsignedTransaction,
        options: &ExecuteOptions,
    ) -> StrategyOutcome {
        let Some(executor) = strategies.wallet_executor() else {
            return StrategyOutcome::Declined("no wallet executor configured");
        };

        let submission = match executor.execute(&unsigned.bytes, request.network()).await {
            Ok(submission) => submission,
            Err(err) => return StrategyOutcome::Failed(StrategyFailure::WalletHandoff(err)),
        };

        let mut outcome = LedgerOutcome::submitted(submission.transaction_id, unsigned.details);
        if !request.requires_confirmation() {
            return StrategyOutcome::Executed(outcome);
        }

        outcome.confirmation = Confirmation::Skipped;
        if !options.wait_for_confirmation {
            return StrategyOutcome::Executed(outcome);
        }
        let Some(poller) = &self.poller else {
            warn!("confirmation requested but no read side is configured");
            return StrategyOutcome::Executed(outcome);
        };

        let transaction_id = outcome.transaction_id.clone().unwrap_or_default();
        match poller
            .await_confirmation(&transaction_id, options.max_attempts, options.interval)
            .await
        {
            PollOutcome::Confirmed(state) => {
                if let StateStatus::Failed(reason) = &state.status {
                    return StrategyOutcome::Failed(StrategyFailure::ConfirmedFailed {
                        transaction_id,
                        reason: reason.clone(),
                    });
                }
                if state.topic_id.is_some() {
                    outcome.topic_id = state.topic_id.clone();
                }
                outcome.status = Some("completed".to_string());
                outcome.confirmation = Confirmation::Confirmed(state);
            }
            PollOutcome::Pending {
                attempts,
                last_error,
                last_state,
            } => {
                if let Some(topic_id) = last_state.and_then(|state| state.topic_id) {
                    outcome.topic_id = Some(topic_id);
                }
                outcome.status = Some("pending".to_string());
                outcome.confirmation = Confirmation::Pending {
                    attempts,
                    last_error,
                };
            }
        }
        StrategyOutcome::Executed(outcome)
    }

    async fn try_operator(&self, request: &OperationRequest) -> StrategyOutcome {
        let Some(credential) = &self.operator else {
            return StrategyOutcome::Declined("no operator credential configured");
        };

        debug!(account = credential.account_id(), "submitting with operator credential");
        match self.ledger.submit(request, credential).await {
            Ok(receipt) => {
                StrategyOutcome::Executed(LedgerOutcome::from_receipt(ExecutionPath::Operator, receipt))
            }
            Err(err) => StrategyOutcome::Failed(StrategyFailure::Operator(err)),
        }
    }
}

async fn resolve_wallet(strategies: &ExecutionStrategyConfig) -> Option<WalletInfo> {
    match strategies.wallet_info_resolver() {
        Some(resolver) => resolver.resolve().await,
        None => None,
    }
}

fn fail(failure: &StrategyFailure, prefer_wallet_only: bool) -> ExecutionResult {
    let coded: CodedError = classify(failure, prefer_wallet_only);
    warn!(kind = coded.kind.as_str(), message = %coded.message, "operation failed");
    ExecutionResult::failure(coded)
}

pub struct ExecutionBrokerBuilder {
    ledger: Arc<dyn LedgerWriteClient>,
    strategies: StrategySource,
    operator: Option<OperatorCredential>,
    mirror: Option<Arc<dyn MirrorReader>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    defaults: ExecuteOptions,
}

impl ExecutionBrokerBuilder {
    fn new(ledger: Arc<dyn LedgerWriteClient>) -> Self {
        Self {
            ledger,
            strategies: StrategySource::Owned(ExecutionStrategyConfig::default()),
            operator: None,
            mirror: None,
            sleeper: None,
            defaults: ExecuteOptions::default(),
        }
    }

    /// Give the broker its own strategy registry.
    pub fn strategies(mut self, config: ExecutionStrategyConfig) -> Self {
        self.strategies = StrategySource::Owned(config);
        self
    }

    /// Share a strategy registry with other brokers.
    pub fn shared_strategies(mut self, shared: SharedStrategies) -> Self {
        self.strategies = StrategySource::Shared(shared);
        self
    }

    pub fn operator(mut self, credential: OperatorCredential) -> Self {
        self.operator = Some(credential);
        self
    }

    pub fn mirror(mut self, reader: Arc<dyn MirrorReader>) -> Self {
        self.mirror = Some(reader);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn confirmation(mut self, settings: &ConfirmationSettings) -> Self {
        self.defaults = ExecuteOptions::from(settings);
        self
    }

    /// Apply operator credential, confirmation defaults and a mirror client
    /// for the configured network. Strategy hooks are left untouched.
    pub fn settings(mut self, settings: &BrokerSettings) -> Result<Self, SettingsError> {
        if let Some(credential) = settings.operator_credential()? {
            self.operator = Some(credential);
        }
        let mirror = MirrorNodeClient::builder()
            .network(settings.network)
            .base_url_opt(settings.mirror_base_url()?)
            .build()?;
        self.mirror = Some(Arc::new(mirror));
        Ok(self.confirmation(&settings.confirmation))
    }

    pub fn build(self) -> ExecutionBroker {
        let poller = self.mirror.map(|reader| {
            let poller = ConfirmationPoller::new(reader);
            match self.sleeper {
                Some(sleeper) => poller.with_sleeper(sleeper),
                None => poller,
            }
        });
        ExecutionBroker {
            strategies: self.strategies,
            ledger: self.ledger,
            operator: self.operator,
            poller,
            defaults: self.defaults,
        }
    }
}
