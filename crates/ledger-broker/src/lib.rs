//! Ledger operation broker: builds ledger operation requests, routes each one
//! through a direct signer, the user's wallet or the server operator account,
//! and waits on the mirror read side when completion is only observable there.

pub mod broker;
pub mod capability;
pub mod classify;
pub mod credential;
pub mod error;
pub mod inscription;
pub mod ledger;
pub mod mirror;
pub mod poller;
pub mod registry;
pub mod request;
pub mod result;
pub mod settings;
pub mod strategy;
pub mod telemetry;

pub use broker::{ExecuteOptions, ExecutionBroker, ExecutionBrokerBuilder};
pub use capability::{
    async_signer_provider_fn, async_wallet_info_fn, signer_provider_fn, wallet_info_fn,
    SignerCapability, SignerProvider, WalletInfo, WalletInfoResolver,
};
pub use classify::{classify, StrategyFailure};
pub use credential::OperatorCredential;
pub use error::{
    CodedError, CredentialError, ErrorKind, LedgerError, RequestError, SettingsError,
};
pub use inscription::{inscribe, InscriptionMode, InscriptionParams, InscriptionSource};
pub use ledger::{
    DirectSigner, LedgerReceipt, LedgerWriteClient, MirrorReader, RetrievedState, StateStatus,
    TransactionDelegate, UnsignedTransaction, WalletExecutor, WalletSubmission,
};
pub use mirror::{normalize_transaction_id, MirrorNodeClient, MirrorNodeClientBuilder};
pub use poller::{ConfirmationPoller, PollOutcome, PollState, PollStep, Sleeper, TokioSleeper};
pub use registry::{
    CreateRegistryParams, DeleteEntryParams, MigrateRegistryParams, RegisterEntryParams,
    RegistryType, SubmitMessageParams, UpdateEntryParams,
};
pub use request::{Network, OperationFamily, OperationKind, OperationRequest};
pub use result::{Confirmation, ExecutionPath, ExecutionResult, LedgerOutcome};
pub use settings::{
    resolve_settings, resolve_settings_with, BrokerSettings, ConfirmationSettings,
    OperatorSettings,
};
pub use strategy::{ExecutionStrategyConfig, SharedStrategies};
