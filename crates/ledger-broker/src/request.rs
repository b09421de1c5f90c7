use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::RequestError;

/// Ledger network an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::Testnet
    }
}

impl FromStr for Network {
    type Err = RequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| RequestError::UnknownNetwork(value.to_string()))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Groups operations by how their completion becomes observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationFamily {
    /// Topic/registry mutations; done once submission succeeds.
    Registry,
    /// Content inscriptions; done once the read side reports a terminal state.
    Inscription,
}

/// Every write operation the broker knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "hcs2.createRegistry")]
    CreateRegistry,
    #[serde(rename = "hcs2.registerEntry")]
    RegisterEntry,
    #[serde(rename = "hcs2.updateEntry")]
    UpdateEntry,
    #[serde(rename = "hcs2.deleteEntry")]
    DeleteEntry,
    #[serde(rename = "hcs2.migrateRegistry")]
    MigrateRegistry,
    #[serde(rename = "hcs.submitMessage")]
    SubmitMessage,
    #[serde(rename = "inscriber.inscribe")]
    Inscribe,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        Self::CreateRegistry,
        Self::RegisterEntry,
        Self::UpdateEntry,
        Self::DeleteEntry,
        Self::MigrateRegistry,
        Self::SubmitMessage,
        Self::Inscribe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateRegistry => "hcs2.createRegistry",
            Self::RegisterEntry => "hcs2.registerEntry",
            Self::UpdateEntry => "hcs2.updateEntry",
            Self::DeleteEntry => "hcs2.deleteEntry",
            Self::MigrateRegistry => "hcs2.migrateRegistry",
            Self::SubmitMessage => "hcs.submitMessage",
            Self::Inscribe => "inscriber.inscribe",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub fn family(&self) -> OperationFamily {
        match self {
            Self::Inscribe => OperationFamily::Inscription,
            _ => OperationFamily::Registry,
        }
    }

    /// Whether the caller only learns of completion by polling the read side.
    pub fn requires_confirmation(&self) -> bool {
        self.family() == OperationFamily::Inscription
    }
}

impl FromStr for OperationKind {
    type Err = RequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| RequestError::UnknownOperation(value.to_string()))
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical, immutable description of one ledger-changing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    operation: OperationKind,
    network: Network,
    payload: Map<String, Value>,
}

impl OperationRequest {
    pub fn new(operation: OperationKind, network: Network, payload: Map<String, Value>) -> Self {
        Self {
            operation,
            network,
            payload,
        }
    }

    /// Build a request from any serialisable payload. The payload must
    /// serialise to a JSON object.
    pub fn from_payload<P: Serialize>(
        operation: OperationKind,
        network: Network,
        payload: &P,
    ) -> Result<Self, RequestError> {
        match serde_json::to_value(payload)? {
            Value::Object(map) => Ok(Self::new(operation, network, map)),
            _ => Err(RequestError::PayloadNotObject),
        }
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn operation_name(&self) -> &'static str {
        self.operation.as_str()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn requires_confirmation(&self) -> bool {
        self.operation.requires_confirmation()
    }

    /// Hex SHA-256 over the canonical JSON of the request; used to correlate
    /// log lines for the same request.
    pub fn fingerprint(&self) -> String {
        let mut sha = Sha256::new();
        sha.update(self.operation.as_str().as_bytes());
        sha.update(b"\0");
        sha.update(self.network.as_str().as_bytes());
        sha.update(b"\0");
        // serde_json::Map is ordered by key, so serialisation is canonical.
        if let Ok(serialized) = serde_json::to_vec(&self.payload) {
            sha.update(serialized);
        }
        hex::encode(sha.finalize())
    }
}
