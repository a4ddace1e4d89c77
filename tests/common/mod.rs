//! Shared fixtures: an in-memory transport that records every request and
//! replays canned responses in order.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use target_mcp_server::config::{Credentials, ServerConfig};
use target_mcp_server::context::ExecutionContext;
use target_mcp_server::dispatcher::Dispatcher;
use target_mcp_server::gateway::{GatewayError, HttpRequest, HttpResponse, TargetGateway, Transport};
use target_mcp_server::registry::ToolRegistry;
use target_mcp_server::scratch::ScratchPaths;
use target_mcp_server::templates::TemplateCatalog;

#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        });
    }

    pub fn respond_json(&self, status: u16, body: Value) {
        self.respond(status, &body.to_string());
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests()[index].clone()
    }

    pub fn body_json(&self, index: usize) -> Value {
        serde_json::from_str(self.request(index).body.as_deref().unwrap()).unwrap()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.responses.lock().unwrap().pop_front().unwrap_or(HttpResponse {
            status: 200,
            body: b"{}".to_vec(),
        }))
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        credentials: Credentials {
            tenant_id: "acme".into(),
            api_key: "key-1234".into(),
            access_token: "token-5678".into(),
        },
        api_base_url: "https://mc.example.test".into(),
        ..ServerConfig::default()
    }
}

pub fn dispatcher_with(config: ServerConfig, transport: Arc<FakeTransport>) -> Dispatcher {
    dispatcher_in(config, transport, Path::new("/nonexistent-templates"))
}

pub fn dispatcher_in(config: ServerConfig, transport: Arc<FakeTransport>, templates: &Path) -> Dispatcher {
    dispatcher_over(config, transport, templates)
}

pub fn dispatcher_over(config: ServerConfig, transport: Arc<dyn Transport>, templates: &Path) -> Dispatcher {
    let gateway = TargetGateway::new(&config, transport);
    let catalog = TemplateCatalog::load(templates);
    let scratch = ScratchPaths::in_dir(Path::new("/tmp/target-mcp-test"));
    Dispatcher::new(
        ToolRegistry::load().unwrap(),
        ExecutionContext::new(config, gateway, scratch, catalog),
    )
}

/// Parse the text payload of a successful tool result.
pub fn payload(result: &target_mcp_server::protocol::ToolResult) -> Value {
    assert!(!result.is_error, "unexpected error result: {:?}", result.content);
    serde_json::from_str(&result.content[0].text).unwrap()
}
