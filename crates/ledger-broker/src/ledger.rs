//! Seams to the external ledger: the write client used for autonomous
//! submission, the signers and wallets that submit on their own, the
//! per-operation transaction builders, and the eventually consistent read
//! side used for confirmation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capability::WalletInfo;
use crate::credential::OperatorCredential;
use crate::error::LedgerError;
use crate::request::{Network, OperationRequest};

/// What a submission reports back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl LedgerReceipt {
    pub fn with_transaction_id(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: Some(transaction_id.into()),
            ..Self::default()
        }
    }
}

/// Unsigned transaction bytes built for an external wallet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub bytes: Vec<u8>,
    /// Partial status fields known before submission (e.g. a quote or the
    /// pre-allocated topic id).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl UnsignedTransaction {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Receipt of a wallet hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSubmission {
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum StateStatus {
    Pending,
    Completed,
    Failed(String),
    Unknown(String),
}

impl StateStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// State of a submitted transaction as seen by the read side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedState {
    pub status: StateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl RetrievedState {
    pub fn new(status: StateStatus) -> Self {
        Self {
            status,
            topic_id: None,
            details: Map::new(),
        }
    }

    pub fn with_topic_id(mut self, topic_id: impl Into<String>) -> Self {
        self.topic_id = Some(topic_id.into());
        self
    }

    /// A terminal status or a concrete target identifier ends confirmation.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal() || self.topic_id.is_some()
    }
}

/// Submits operations signed with the held operator credential.
#[async_trait]
pub trait LedgerWriteClient: Send + Sync {
    async fn submit(
        &self,
        request: &OperationRequest,
        credential: &OperatorCredential,
    ) -> Result<LedgerReceipt, LedgerError>;
}

/// Signer that performs its own submission.
#[async_trait]
pub trait DirectSigner: Send + Sync {
    fn account_id(&self) -> &str;

    async fn execute(&self, request: &OperationRequest) -> Result<LedgerReceipt, LedgerError>;
}

/// Builds the unsigned transaction for one operation, shaped as the external
/// wallet-signing protocol expects. The bytes are opaque to the broker.
#[async_trait]
pub trait TransactionDelegate: Send + Sync {
    async fn build(
        &self,
        request: &OperationRequest,
        wallet: &WalletInfo,
    ) -> Result<UnsignedTransaction, LedgerError>;
}

/// Hands unsigned bytes to the user's wallet and waits for its receipt.
#[async_trait]
pub trait WalletExecutor: Send + Sync {
    async fn execute(
        &self,
        unsigned: &[u8],
        network: Network,
    ) -> Result<WalletSubmission, LedgerError>;
}

/// Eventually consistent read side. `Ok(None)` means "not found yet".
#[async_trait]
pub trait MirrorReader: Send + Sync {
    async fn retrieve_state(&self, transaction_id: &str)
        -> Result<Option<RetrievedState>, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(StateStatus::Completed.is_terminal());
        assert!(StateStatus::Failed("INVALID_SIGNATURE".into()).is_terminal());
        assert!(!StateStatus::Pending.is_terminal());
        assert!(!StateStatus::Unknown("weird".into()).is_terminal());
    }

    #[test]
    fn topic_id_alone_is_terminal() {
        let state = RetrievedState::new(StateStatus::Pending);
        assert!(!state.is_terminal());
        assert!(state.with_topic_id("0.0.42").is_terminal());
    }
}
