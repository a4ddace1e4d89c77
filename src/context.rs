use std::sync::Arc;

use serde_json::Value;

use crate::config::ServerConfig;
use crate::gateway::{GatewayError, TargetGateway, TargetRequest};
use crate::scratch::ScratchPaths;
use crate::templates::TemplateCatalog;

/// Shared, read-only state handed to every tool handler.
///
/// Built once per process; cloning is cheap.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub config: Arc<ServerConfig>,
    pub gateway: TargetGateway,
    pub scratch: ScratchPaths,
    pub templates: Arc<TemplateCatalog>,
}

impl ExecutionContext {
    pub fn new(
        config: ServerConfig,
        gateway: TargetGateway,
        scratch: ScratchPaths,
        templates: TemplateCatalog,
    ) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            scratch,
            templates: Arc::new(templates),
        }
    }

    /// Shorthand for a single gateway call.
    pub async fn send(&self, request: TargetRequest) -> Result<Value, GatewayError> {
        self.gateway.send(request).await
    }
}
