//! Single authenticated call against the Adobe Target Admin API.
//!
//! The gateway checks credentials, builds the tenant-scoped URL and the
//! version-specific media-type headers, hands the request to a [`Transport`],
//! and maps the reply to JSON or a [`GatewayError`]. No retries, no pooling
//! guarantees beyond what the transport offers.

pub mod transport;

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::{Credentials, ServerConfig};

pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(
        "Adobe Target API credentials not configured. Please set TARGET_TENANT_ID, \
         TARGET_API_KEY, and TARGET_ACCESS_TOKEN environment variables."
    )]
    NotConfigured,
    #[error("API Error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Request failed: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Admin API media-type version, selected per endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
    V3,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
        }
    }

    pub fn media_type(self) -> String {
        format!("application/vnd.adobe.target.{}+json", self.as_str())
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the tenant root, e.g. `/target/activities`.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub version: ApiVersion,
}

impl TargetRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            version: ApiVersion::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).body(body)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }
}

/// Issues requests for one tenant through a shared transport.
#[derive(Clone)]
pub struct TargetGateway {
    base_url: String,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for TargetGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetGateway")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl TargetGateway {
    pub fn new(config: &ServerConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
            transport,
        }
    }

    /// Gateway over the default `reqwest` transport.
    pub fn http(config: &ServerConfig) -> Result<Self, GatewayError> {
        Ok(Self::new(config, Arc::new(ReqwestTransport::new()?)))
    }

    /// Perform exactly one request and resolve its JSON body.
    pub async fn send(&self, request: TargetRequest) -> Result<Value, GatewayError> {
        let prepared = self.prepare(request)?;
        debug!(method = %prepared.method, url = %prepared.url, "admin api request");
        let response = self.transport.execute(prepared).await?;
        resolve(response)
    }

    /// Build the wire request. Fails before any I/O when credentials are missing.
    pub fn prepare(&self, request: TargetRequest) -> Result<HttpRequest, GatewayError> {
        if !self.credentials.is_complete() {
            return Err(GatewayError::NotConfigured);
        }

        let media_type = request.version.media_type();
        let mut headers = vec![
            ("Authorization", format!("Bearer {}", self.credentials.access_token)),
            ("X-Api-Key", self.credentials.api_key.clone()),
            ("Accept", media_type.clone()),
        ];

        let body = match request.body {
            Some(body) => Some(serde_json::to_string(&body)?),
            None => None,
        };
        let carries_body = [Method::POST, Method::PUT, Method::PATCH].contains(&request.method);
        if body.is_some() && carries_body {
            headers.push(("Content-Type", media_type));
        }

        Ok(HttpRequest {
            url: format!(
                "{}/{}{}",
                self.base_url, self.credentials.tenant_id, request.path
            ),
            method: request.method,
            headers,
            body,
        })
    }
}

/// Map an upstream response to its JSON body or an error.
///
/// An empty body reads as `{}`. Non-2xx bodies are reported verbatim when
/// they are not JSON.
pub fn resolve(response: HttpResponse) -> Result<Value, GatewayError> {
    let is_blank = response.body.iter().all(u8::is_ascii_whitespace);

    if (200..300).contains(&response.status) {
        if is_blank {
            return Ok(Value::Object(Default::default()));
        }
        return Ok(serde_json::from_slice(&response.body)?);
    }

    let body = if is_blank {
        "{}".to_string()
    } else {
        match serde_json::from_slice::<Value>(&response.body) {
            Ok(parsed) => parsed.to_string(),
            Err(_) => String::from_utf8_lossy(&response.body).into_owned(),
        }
    };
    Err(GatewayError::Api {
        status: response.status,
        body,
    })
}
