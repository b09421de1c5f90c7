//! Agent-facing tools over the ledger broker. Each tool accepts JSON
//! arguments, runs one ledger operation through the broker and renders the
//! outcome as a JSON observation.

pub mod args;
pub mod operations;
pub mod render;
pub mod tool;
pub mod toolset;

pub use args::{ToolArgs, ToolMode};
pub use operations::OperationTool;
pub use render::render_result;
pub use tool::{LedgerTool, ToolDescription, ToolError, ToolOutput, ToolResult};
pub use toolset::ToolSet;
