//! Request builders for the registry family: topic registries and plain
//! topic messages. These operations are complete once submission succeeds.

use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::request::{Network, OperationKind, OperationRequest};

/// Default registry TTL in seconds.
pub const DEFAULT_REGISTRY_TTL: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryType {
    /// Every entry is retained and addressable by sequence number.
    Indexed,
    /// Only the latest entry per target is meaningful.
    NonIndexed,
}

impl Default for RegistryType {
    fn default() -> Self {
        Self::Indexed
    }
}

fn default_ttl() -> u64 {
    DEFAULT_REGISTRY_TTL
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistryParams {
    #[serde(default, alias = "registry_type")]
    pub registry_type: RegistryType,
    #[serde(default = "default_ttl")]
    pub ttl: u64,
    /// Attach the payer's key as the topic admin key.
    #[serde(default, alias = "use_admin_key")]
    pub use_admin_key: bool,
    /// Attach the payer's key as the topic submit key.
    #[serde(default, alias = "use_submit_key")]
    pub use_submit_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Default for CreateRegistryParams {
    fn default() -> Self {
        Self {
            registry_type: RegistryType::default(),
            ttl: DEFAULT_REGISTRY_TTL,
            use_admin_key: false,
            use_submit_key: false,
            memo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEntryParams {
    #[serde(alias = "registry_topic_id")]
    pub registry_topic_id: String,
    #[serde(alias = "target_topic_id")]
    pub target_topic_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryParams {
    #[serde(alias = "registry_topic_id")]
    pub registry_topic_id: String,
    /// Sequence number of the entry being replaced.
    pub uid: String,
    #[serde(alias = "target_topic_id")]
    pub target_topic_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntryParams {
    #[serde(alias = "registry_topic_id")]
    pub registry_topic_id: String,
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateRegistryParams {
    #[serde(alias = "registry_topic_id")]
    pub registry_topic_id: String,
    #[serde(alias = "target_topic_id")]
    pub target_topic_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageParams {
    #[serde(alias = "topic_id")]
    pub topic_id: String,
    pub message: String,
}

pub fn create_registry(
    network: Network,
    params: &CreateRegistryParams,
) -> Result<OperationRequest, RequestError> {
    OperationRequest::from_payload(OperationKind::CreateRegistry, network, params)
}

pub fn register_entry(
    network: Network,
    params: &RegisterEntryParams,
) -> Result<OperationRequest, RequestError> {
    OperationRequest::from_payload(OperationKind::RegisterEntry, network, params)
}

pub fn update_entry(
    network: Network,
    params: &UpdateEntryParams,
) -> Result<OperationRequest, RequestError> {
    OperationRequest::from_payload(OperationKind::UpdateEntry, network, params)
}

pub fn delete_entry(
    network: Network,
    params: &DeleteEntryParams,
) -> Result<OperationRequest, RequestError> {
    OperationRequest::from_payload(OperationKind::DeleteEntry, network, params)
}

pub fn migrate_registry(
    network: Network,
    params: &MigrateRegistryParams,
) -> Result<OperationRequest, RequestError> {
    OperationRequest::from_payload(OperationKind::MigrateRegistry, network, params)
}

pub fn submit_message(
    network: Network,
    params: &SubmitMessageParams,
) -> Result<OperationRequest, RequestError> {
    OperationRequest::from_payload(OperationKind::SubmitMessage, network, params)
}
