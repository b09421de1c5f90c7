use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, enumerable failure kinds surfaced to callers of the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No signer, no wallet, and either policy forbids fallback or no
    /// operator credential is held.
    WalletUnavailable,
    /// A wallet hand-off was attempted and failed while the policy forbids
    /// falling back to autonomous signing.
    WalletSubmitFailed,
    /// The ledger operation itself was rejected, on any path.
    OperationFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WalletUnavailable => "wallet_unavailable",
            Self::WalletSubmitFailed => "wallet_submit_failed",
            Self::OperationFailed => "operation_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error value carrying a fixed kind for programmatic handling plus a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CodedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CodedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn wallet_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WalletUnavailable, message)
    }

    pub fn wallet_submit_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WalletSubmitFailed, message)
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OperationFailed, message)
    }
}

/// Failures reported by the ledger collaborators (write client, signers,
/// wallet executor, delegates and the read side).
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger (or its pre-submission validation) rejected the operation.
    #[error("operation rejected: {0}")]
    Rejected(String),
    /// Transport-level failure talking to the ledger.
    #[error("network failure: {0}")]
    Network(String),
    /// The external wallet refused or failed to sign/submit.
    #[error("wallet error: {0}")]
    Wallet(String),
    /// The unsigned transaction could not be built.
    #[error("transaction build failed: {0}")]
    Build(String),
    /// The requested record does not exist (yet).
    #[error("not found: {0}")]
    NotFound(String),
    /// HTTP request to the read side failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// A response body could not be decoded.
    #[error("response decoding failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised while constructing operation requests.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
    #[error("operation payload must serialise to a JSON object")]
    PayloadNotObject,
    #[error("invalid operation payload: {0}")]
    InvalidPayload(String),
    #[error("payload serialisation failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while loading an operator credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("operator account id must not be empty")]
    MissingAccount,
    #[error("operator key is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("operator key must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Errors raised while resolving broker settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid operator credential: {0}")]
    Credential(#[from] CredentialError),
    #[error("invalid mirror url: {0}")]
    MirrorUrl(#[from] url::ParseError),
    #[error("http client could not be built: {0}")]
    HttpClient(#[from] reqwest::Error),
}
