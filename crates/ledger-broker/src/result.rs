use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CodedError, ErrorKind};
use crate::ledger::{LedgerReceipt, RetrievedState};

/// Which strategy performed the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPath {
    DirectSigner,
    Wallet,
    Operator,
}

impl ExecutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectSigner => "direct_signer",
            Self::Wallet => "wallet",
            Self::Operator => "operator",
        }
    }
}

/// How the caller learned that the operation took effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Confirmation {
    /// Completion is known from the submission itself.
    NotRequired,
    /// Confirmation applies but was not waited for.
    Skipped,
    Confirmed(RetrievedState),
    /// The retry budget ran out before a terminal state was observed.
    Pending {
        attempts: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_error: Option<String>,
    },
}

/// Payload of a successful execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerOutcome {
    pub path: ExecutionPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    pub confirmation: Confirmation,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl LedgerOutcome {
    pub fn from_receipt(path: ExecutionPath, receipt: LedgerReceipt) -> Self {
        Self {
            path,
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            topic_id: receipt.topic_id,
            sequence_number: receipt.sequence_number,
            confirmation: Confirmation::NotRequired,
            details: receipt.details,
        }
    }

    /// Outcome of a wallet hand-off before any confirmation is folded in.
    pub fn submitted(transaction_id: String, details: Map<String, Value>) -> Self {
        let topic_id = details
            .get("topicId")
            .or_else(|| details.get("topic_id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            path: ExecutionPath::Wallet,
            transaction_id: Some(transaction_id),
            status: Some("submitted".to_string()),
            topic_id,
            sequence_number: None,
            confirmation: Confirmation::NotRequired,
            details,
        }
    }
}

/// Uniform result of a broker call; exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success {
        ledger_result: LedgerOutcome,
    },
    /// Unsigned bytes awaiting manual wallet approval. Not an error.
    PendingSignature {
        operation_name: String,
        #[serde(with = "base64_bytes")]
        unsigned_bytes: Vec<u8>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        details: Map<String, Value>,
    },
    Failure(CodedError),
}

impl ExecutionResult {
    pub fn success(ledger_result: LedgerOutcome) -> Self {
        Self::Success { ledger_result }
    }

    pub fn failure(error: CodedError) -> Self {
        Self::Failure(error)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_pending_signature(&self) -> bool {
        matches!(self, Self::PendingSignature { .. })
    }

    pub fn outcome(&self) -> Option<&LedgerOutcome> {
        match self {
            Self::Success { ledger_result } => Some(ledger_result),
            _ => None,
        }
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.outcome()
            .and_then(|outcome| outcome.transaction_id.as_deref())
    }

    pub fn error(&self) -> Option<&CodedError> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(|error| error.kind)
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
