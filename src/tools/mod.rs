// AI-assistant tool layer
// The calculators and ledger queries exposed as schema-described tools
// over JSON-RPC, for an LLM assistant to invoke.

pub mod handlers;
pub mod protocol;
pub mod schemas;

pub use handlers::ToolHandlers;
pub use protocol::{
    JsonRpcRequest, JsonRpcResponse, Tool, ToolCallParams, ToolCallResult, ToolContent,
};
pub use schemas::get_tools;
