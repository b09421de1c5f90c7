//! One tool per ledger operation. Each tool turns agent arguments into an
//! [`OperationRequest`] and hands it to the shared broker.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use ledger_broker::registry::{self, DEFAULT_REGISTRY_TTL};
use ledger_broker::{
    inscribe, ExecutionBroker, InscriptionParams, Network, OperationKind, OperationRequest,
    RequestError,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::args::{ToolArgs, ToolMode};
use crate::render::render_result;
use crate::tool::{LedgerTool, ToolDescription, ToolError, ToolOutput, ToolResult};

type RequestBuilder = fn(&ToolArgs) -> Result<OperationRequest, ToolError>;

pub struct OperationTool {
    description: ToolDescription,
    operation: OperationKind,
    build: RequestBuilder,
    broker: Arc<ExecutionBroker>,
    network: Network,
}

impl OperationTool {
    #[allow(clippy::too_many_arguments)]
    fn new(
        broker: Arc<ExecutionBroker>,
        network: Network,
        operation: OperationKind,
        name: &str,
        summary: &str,
        properties: Value,
        required: &[&str],
        build: RequestBuilder,
    ) -> Self {
        let description = ToolDescription::new(name, summary, input_schema(properties, required))
            .with_metadata("operation", json!(operation.as_str()))
            .with_metadata("requires_confirmation", json!(operation.requires_confirmation()));
        Self {
            description,
            operation,
            build,
            broker,
            network,
        }
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn create_registry(broker: Arc<ExecutionBroker>, network: Network) -> Self {
        Self::new(
            broker,
            network,
            OperationKind::CreateRegistry,
            "create_registry",
            "Create a new topic registry",
            json!({
                "registryType": { "type": "string", "enum": ["indexed", "non_indexed"] },
                "ttl": { "type": "integer", "minimum": 1, "default": DEFAULT_REGISTRY_TTL },
                "useAdminKey": { "type": "boolean" },
                "useSubmitKey": { "type": "boolean" },
                "memo": { "type": "string" },
            }),
            &[],
            |args| build_with(args, registry::create_registry),
        )
    }

    pub fn register_entry(broker: Arc<ExecutionBroker>, network: Network) -> Self {
        Self::new(
            broker,
            network,
            OperationKind::RegisterEntry,
            "register_entry",
            "Register a target topic in an existing registry",
            entry_properties(false),
            &["registryTopicId", "targetTopicId"],
            |args| build_with(args, registry::register_entry),
        )
    }

    pub fn update_entry(broker: Arc<ExecutionBroker>, network: Network) -> Self {
        Self::new(
            broker,
            network,
            OperationKind::UpdateEntry,
            "update_entry",
            "Replace an existing registry entry",
            entry_properties(true),
            &["registryTopicId", "uid", "targetTopicId"],
            |args| build_with(args, registry::update_entry),
        )
    }

    pub fn delete_entry(broker: Arc<ExecutionBroker>, network: Network) -> Self {
        Self::new(
            broker,
            network,
            OperationKind::DeleteEntry,
            "delete_entry",
            "Delete an entry from a registry",
            json!({
                "registryTopicId": { "type": "string" },
                "uid": { "type": "string" },
                "memo": { "type": "string" },
            }),
            &["registryTopicId", "uid"],
            |args| build_with(args, registry::delete_entry),
        )
    }

    pub fn migrate_registry(broker: Arc<ExecutionBroker>, network: Network) -> Self {
        Self::new(
            broker,
            network,
            OperationKind::MigrateRegistry,
            "migrate_registry",
            "Point a registry at a successor topic",
            entry_properties(false),
            &["registryTopicId", "targetTopicId"],
            |args| build_with(args, registry::migrate_registry),
        )
    }

    pub fn submit_message(broker: Arc<ExecutionBroker>, network: Network) -> Self {
        Self::new(
            broker,
            network,
            OperationKind::SubmitMessage,
            "submit_message",
            "Submit a message to a consensus topic",
            json!({
                "topicId": { "type": "string" },
                "message": { "type": "string" },
            }),
            &["topicId", "message"],
            |args| build_with(args, registry::submit_message),
        )
    }

    pub fn inscribe(broker: Arc<ExecutionBroker>, network: Network) -> Self {
        Self::new(
            broker,
            network,
            OperationKind::Inscribe,
            "inscribe",
            "Inscribe content from a URL or inline buffer and wait for it to land",
            json!({
                "source": {
                    "type": "object",
                    "description": "{type:\"url\",url} or {type:\"buffer\",base64,fileName,mimeType}",
                },
                "inscriptionMode": { "type": "string", "enum": ["file", "hashinal"] },
                "metadata": { "type": "object" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "chunkSize": { "type": "integer", "minimum": 1 },
                "wait_for_confirmation": { "type": "boolean", "default": true },
                "max_attempts": { "type": "integer", "minimum": 1 },
                "interval_ms": { "type": "integer", "minimum": 0 },
            }),
            &["source"],
            build_inscription,
        )
    }
}

#[async_trait]
impl LedgerTool for OperationTool {
    fn description(&self) -> &ToolDescription {
        &self.description
    }

    async fn invoke(&self, args: Value) -> ToolResult {
        let args = ToolArgs::parse(args, self.network, self.broker.default_options())?;
        let request = (self.build)(&args)?;
        debug!(tool = %self.description.name, mode = ?args.mode, "invoking ledger tool");

        let result = match args.mode {
            ToolMode::Execute => self.broker.execute(&request, &args.options).await,
            ToolMode::Prepare => self.broker.prepare(&request, &args.options).await,
        };

        let mut metadata = IndexMap::new();
        metadata.insert("operation".to_string(), json!(request.operation_name()));
        metadata.insert("network".to_string(), json!(request.network().as_str()));
        metadata.insert("fingerprint".to_string(), json!(request.fingerprint()));
        Ok(ToolOutput {
            content: render_result(&result),
            metadata,
        })
    }
}

fn build_with<P>(
    args: &ToolArgs,
    build: fn(Network, &P) -> Result<OperationRequest, RequestError>,
) -> Result<OperationRequest, ToolError>
where
    P: serde::de::DeserializeOwned,
{
    let params: P = args.params()?;
    build(args.network, &params).map_err(|err| ToolError::InvalidInput(err.to_string()))
}

/// `mode` is taken by execute/prepare, so the inscription mode travels as
/// `inscriptionMode`.
fn build_inscription(args: &ToolArgs) -> Result<OperationRequest, ToolError> {
    let mut params = args.params.clone();
    if let Some(mode) = params
        .remove("inscriptionMode")
        .or_else(|| params.remove("inscription_mode"))
    {
        params.insert("mode".into(), mode);
    }
    let params: InscriptionParams = serde_json::from_value(Value::Object(params))
        .map_err(|err| ToolError::InvalidInput(err.to_string()))?;
    inscribe(args.network, &params).map_err(|err| ToolError::InvalidInput(err.to_string()))
}

fn entry_properties(with_uid: bool) -> Value {
    let mut properties = json!({
        "registryTopicId": { "type": "string" },
        "targetTopicId": { "type": "string" },
        "metadata": { "type": "string" },
        "memo": { "type": "string" },
    });
    if with_uid {
        properties["uid"] = json!({ "type": "string" });
    }
    properties
}

fn input_schema(mut properties: Value, required: &[&str]) -> Value {
    properties["network"] = json!({ "type": "string", "enum": ["mainnet", "testnet"] });
    properties["mode"] = json!({ "type": "string", "enum": ["execute", "prepare"] });
    json!({
        "type": "object",
        "required": required,
        "properties": properties,
    })
}
