use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub input_schema: Value,
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,
}

impl ToolDescription {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            metadata: IndexMap::default(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Value,
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,
}

/// Raised only when a tool could not be run at all. Coded broker failures
/// are rendered into [`ToolOutput`] instead.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool rejected input: {0}")]
    InvalidInput(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

pub type ToolResult = Result<ToolOutput, ToolError>;

#[async_trait]
pub trait LedgerTool: Send + Sync {
    fn description(&self) -> &ToolDescription;
    async fn invoke(&self, args: Value) -> ToolResult;
}
