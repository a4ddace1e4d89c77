use crate::gateway::GatewayError;
use crate::protocol::ToolResult;
use crate::registry::RegistryError;

/// Failure of a single tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: &'static str, message: String },
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Tool failures cross the protocol boundary as `isError` results carrying
/// only the human-readable message.
impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        Self::error(format!("Error: {err}"))
    }
}

/// Anything that keeps the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("tool registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("HTTP client error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("scratch space error: {0}")]
    Scratch(#[from] std::io::Error),
}
