use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::context::ExecutionContext;
use crate::error::{StartupError, ToolError};
use crate::gateway::TargetGateway;
use crate::handlers::ToolCall;
use crate::protocol::ToolResult;
use crate::registry::{ToolDescriptor, ToolRegistry};
use crate::scratch::ScratchPaths;
use crate::templates::TemplateCatalog;

/// Routes tool invocations to their handlers.
///
/// Stateless per call: the registry and context are shared read-only, and
/// each `call_tool` runs its handler exactly once.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    context: ExecutionContext,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, context: ExecutionContext) -> Self {
        Self {
            registry: Arc::new(registry),
            context,
        }
    }

    /// Wire up the full tool set against the live Admin API.
    pub fn from_config(config: ServerConfig, scratch: ScratchPaths) -> Result<Self, StartupError> {
        let registry = ToolRegistry::load()?;
        let gateway = TargetGateway::http(&config)?;
        let templates = TemplateCatalog::load(config.templates_dir.clone());
        Ok(Self::new(
            registry,
            ExecutionContext::new(config, gateway, scratch, templates),
        ))
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn templates(&self) -> &TemplateCatalog {
        &self.context.templates
    }

    pub fn list_tools(&self) -> &[ToolDescriptor] {
        self.registry.descriptors()
    }

    /// Invoke a tool and wrap the outcome in a tool result.
    ///
    /// Never fails: every error becomes an `isError` result.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        match self.invoke(name, arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => {
                    debug!(tool = name, "tool call succeeded");
                    ToolResult::text(text)
                }
                Err(e) => ToolResult::error(format!("Error: {e}")),
            },
            Err(err) => {
                warn!(tool = name, error = %err, "tool call failed");
                err.into()
            }
        }
    }

    async fn invoke(&self, name: &str, arguments: Option<Value>) -> Result<Value, ToolError> {
        let kind = self
            .registry
            .lookup(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let call = ToolCall::parse(kind, arguments.unwrap_or_else(|| Value::Object(Default::default())))?;
        call.execute(&self.context).await
    }
}
