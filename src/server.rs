use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::protocol::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ReadResourceParams,
    ToolCallParams,
};

/// Maximum bytes per JSON-RPC message (1 MiB).
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "adobe-target-admin-api";

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Skip the rest of an oversized line without buffering it.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let (used, done) = {
            let buf = reader.fill_buf().await?;
            if buf.is_empty() {
                return Ok(());
            }
            match buf.iter().position(|b| *b == b'\n') {
                Some(i) => (i + 1, true),
                None => (buf.len(), false),
            }
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}

/// MCP server that communicates over stdio using newline-delimited JSON-RPC 2.0.
pub struct McpServer {
    dispatcher: Dispatcher,
    initialized: bool,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            initialized: false,
        }
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serve one connection. Requests are handled in arrival order and
    /// responses are written one JSON object per line.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut raw = Vec::new();

        loop {
            raw.clear();
            let n = (&mut reader)
                .take(MAX_MESSAGE_BYTES as u64 + 1)
                .read_until(b'\n', &mut raw)
                .await?;
            if n == 0 {
                debug!("input closed");
                break;
            }

            if n > MAX_MESSAGE_BYTES {
                if raw.last() != Some(&b'\n') {
                    discard_line(&mut reader).await?;
                }
                warn!(limit = MAX_MESSAGE_BYTES, "message too large");
                write_response(&mut writer, &JsonRpcResponse::error(None, JsonRpcError::parse_error())).await?;
                continue;
            }

            let trimmed = match std::str::from_utf8(&raw) {
                Ok(s) => s.trim(),
                Err(_) => {
                    write_response(&mut writer, &JsonRpcResponse::error(None, JsonRpcError::parse_error())).await?;
                    continue;
                }
            };

            if trimmed.is_empty() {
                continue;
            }

            let req: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "parse error");
                    write_response(&mut writer, &JsonRpcResponse::error(None, JsonRpcError::parse_error())).await?;
                    continue;
                }
            };

            if req.jsonrpc != "2.0" {
                write_response(
                    &mut writer,
                    &JsonRpcResponse::error(req.id.clone(), JsonRpcError::invalid_request()),
                )
                .await?;
                continue;
            }

            // Only `initialize` is allowed before the handshake completes.
            if !self.initialized && req.method != "initialize" {
                if req.id.is_none() {
                    continue;
                }
                write_response(
                    &mut writer,
                    &JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_request_with("Server not initialized"),
                    ),
                )
                .await?;
                continue;
            }

            if let Some(resp) = dispatch(&req, &self.dispatcher).await {
                write_response(&mut writer, &resp).await?;
            }

            if req.method == "initialize" {
                self.initialized = true;
            }
        }

        Ok(())
    }
}

/// Route a JSON-RPC request to the matching MCP method.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(req: &JsonRpcRequest, dispatcher: &Dispatcher) -> Option<JsonRpcResponse> {
    let id = req.id.clone();
    match req.method.as_str() {
        "initialize" => {
            if let Some(params) = req
                .params
                .clone()
                .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok())
            {
                let client = params.client_info.as_ref();
                info!(
                    protocol = params.protocol_version.as_deref().unwrap_or("unknown"),
                    client = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
                    client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                    "initialize"
                );
            }
            let result = json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {},
                    "resources": {},
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            });
            Some(JsonRpcResponse::success(id, result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(id, json!({}))),

        "tools/list" => Some(JsonRpcResponse::success(
            id,
            json!({ "tools": dispatcher.list_tools() }),
        )),

        "tools/call" => {
            let params: ToolCallParams = match parse_params(req, "tools/call") {
                Ok(p) => p,
                Err(err) => return Some(JsonRpcResponse::error(id, err)),
            };
            let tool_result = dispatcher.call_tool(&params.name, params.arguments).await;
            Some(match serde_json::to_value(&tool_result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
            })
        }

        "resources/list" => Some(JsonRpcResponse::success(
            id,
            json!({ "resources": dispatcher.templates().resources() }),
        )),

        "resources/read" => {
            let params: ReadResourceParams = match parse_params(req, "resources/read") {
                Ok(p) => p,
                Err(err) => return Some(JsonRpcResponse::error(id, err)),
            };
            Some(match dispatcher.templates().read(&params.uri) {
                Ok(contents) => JsonRpcResponse::success(id, json!({ "contents": [contents] })),
                Err(e) => {
                    warn!(uri = %params.uri, error = %e, "resource read failed");
                    JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Failed to read template: {e}")),
                    )
                }
            })
        }

        // Other notifications need no reply.
        method if req.id.is_none() && method.starts_with("notifications/") => None,

        _ => Some(JsonRpcResponse::error(
            id,
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    req: &JsonRpcRequest,
    method: &str,
) -> Result<T, JsonRpcError> {
    match &req.params {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid {method} params: {e}"))),
        None => Err(JsonRpcError::invalid_params(format!("Missing params for {method}"))),
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    resp: &JsonRpcResponse,
) -> std::io::Result<()> {
    let out = serde_json::to_string(resp)?;
    writer.write_all(out.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
