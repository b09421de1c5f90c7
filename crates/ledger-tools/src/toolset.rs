use std::sync::Arc;

use indexmap::IndexMap;
use ledger_broker::{ExecutionBroker, Network};
use serde_json::Value;

use crate::operations::OperationTool;
use crate::tool::{LedgerTool, ToolDescription, ToolError, ToolResult};

struct ToolRecord {
    description: ToolDescription,
    handler: Arc<dyn LedgerTool>,
}

/// Named ledger tools in registration order.
#[derive(Default)]
pub struct ToolSet {
    tools: IndexMap<String, ToolRecord>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation tool, all sharing `broker`.
    pub fn with_defaults(broker: Arc<ExecutionBroker>, network: Network) -> Self {
        let mut set = Self::new();
        let constructors: [fn(Arc<ExecutionBroker>, Network) -> OperationTool; 7] = [
            OperationTool::create_registry,
            OperationTool::register_entry,
            OperationTool::update_entry,
            OperationTool::delete_entry,
            OperationTool::migrate_registry,
            OperationTool::submit_message,
            OperationTool::inscribe,
        ];
        for build in constructors {
            set.register(Arc::new(build(broker.clone(), network)));
        }
        set
    }

    /// Registering a name twice replaces the earlier tool in place.
    pub fn register(&mut self, tool: Arc<dyn LedgerTool>) {
        let description = tool.description().clone();
        self.tools.insert(
            description.name.clone(),
            ToolRecord {
                description,
                handler: tool,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn LedgerTool>> {
        self.tools.get(name).map(|record| record.handler.clone())
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn descriptions(&self) -> Vec<ToolDescription> {
        self.tools
            .values()
            .map(|record| record.description.clone())
            .collect()
    }

    pub async fn invoke(&self, name: &str, args: Value) -> ToolResult {
        let record = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        record.handler.invoke(args).await
    }
}
