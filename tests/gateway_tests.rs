//! Gateway behavior: credential gate, URL and header construction, status
//! mapping, and one round trip over a real socket.

mod common;

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use common::{dispatcher_over, test_config, FakeTransport};
use target_mcp_server::config::{Credentials, ServerConfig};
use target_mcp_server::gateway::{resolve, ApiVersion, GatewayError, HttpResponse, ReqwestTransport, TargetGateway, TargetRequest};

#[tokio::test]
async fn missing_credentials_fail_before_any_io() {
    let transport = FakeTransport::new();
    let config = ServerConfig {
        credentials: Credentials {
            tenant_id: "acme".into(),
            api_key: String::new(),
            access_token: "token".into(),
        },
        ..ServerConfig::default()
    };
    let gateway = TargetGateway::new(&config, transport.clone());

    let err = gateway.send(TargetRequest::get("/target/activities")).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotConfigured));
    let message = err.to_string();
    for var in ["TARGET_TENANT_ID", "TARGET_API_KEY", "TARGET_ACCESS_TOKEN"] {
        assert!(message.contains(var), "message should name {var}: {message}");
    }
    assert!(transport.requests().is_empty(), "no request may be sent");
}

#[tokio::test]
async fn get_carries_auth_and_versioned_accept_without_content_type() {
    let transport = FakeTransport::new();
    let gateway = TargetGateway::new(&test_config(), transport.clone());

    gateway
        .send(TargetRequest::get("/target/activities").version(ApiVersion::V3))
        .await
        .unwrap();

    let req = transport.request(0);
    assert_eq!(req.method, reqwest::Method::GET);
    assert_eq!(req.url, "https://mc.example.test/acme/target/activities");
    assert_eq!(req.header("authorization"), Some("Bearer token-5678"));
    assert_eq!(req.header("X-Api-Key"), Some("key-1234"));
    assert_eq!(req.header("Accept"), Some("application/vnd.adobe.target.v3+json"));
    assert_eq!(req.header("Content-Type"), None);
    assert!(req.body.is_none());
}

#[tokio::test]
async fn post_sets_content_type_to_the_same_media_type() {
    let transport = FakeTransport::new();
    transport.respond(201, r#"{"id":42}"#);
    let gateway = TargetGateway::new(&test_config(), transport.clone());

    let value = gateway
        .send(TargetRequest::post("/target/offers/content", json!({"name": "x"})).version(ApiVersion::V2))
        .await
        .unwrap();

    assert_eq!(value, json!({"id": 42}));
    let req = transport.request(0);
    assert_eq!(req.header("Content-Type"), Some("application/vnd.adobe.target.v2+json"));
    assert_eq!(transport.body_json(0), json!({"name": "x"}));
}

#[test]
fn trailing_slash_in_base_url_is_ignored() {
    let config = ServerConfig {
        api_base_url: "https://mc.example.test/".into(),
        ..test_config()
    };
    let gateway = TargetGateway::new(&config, FakeTransport::new());
    let prepared = gateway.prepare(TargetRequest::get("/target/mboxes")).unwrap();
    assert_eq!(prepared.url, "https://mc.example.test/acme/target/mboxes");
}

#[test]
fn empty_success_body_reads_as_empty_object() {
    let value = resolve(HttpResponse { status: 204, body: Vec::new() }).unwrap();
    assert_eq!(value, json!({}));
}

#[test]
fn error_status_reports_status_and_body() {
    let err = resolve(HttpResponse {
        status: 404,
        body: br#"{"message":"Activity not found"}"#.to_vec(),
    })
    .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("API Error (404)"), "{message}");
    assert!(message.contains("Activity not found"), "{message}");
}

#[test]
fn non_json_error_body_is_kept_verbatim() {
    let err = resolve(HttpResponse {
        status: 502,
        body: b"Bad Gateway".to_vec(),
    })
    .unwrap_err();
    assert_eq!(err.to_string(), "API Error (502): Bad Gateway");
}

#[test]
fn unparseable_success_body_is_a_parse_error() {
    let err = resolve(HttpResponse {
        status: 200,
        body: b"<html>".to_vec(),
    })
    .unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
    assert!(err.to_string().starts_with("Failed to parse response"));
}

#[tokio::test]
async fn reqwest_transport_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let mut received = Vec::new();
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            received.extend_from_slice(&buf[..n]);
            if n == 0 || received.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let body = r#"{"id":42}"#;
        let reply = format!(
            "HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&received).into_owned()
    });

    let config = ServerConfig {
        api_base_url: format!("http://{addr}"),
        ..test_config()
    };
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let gateway = TargetGateway::new(&config, Arc::new(ReqwestTransport::with_client(client)));
    let value = gateway.send(TargetRequest::get("/target/properties")).await.unwrap();
    assert_eq!(value, json!({"id": 42}));

    let head = server.await.unwrap().to_ascii_lowercase();
    assert!(head.starts_with("get /acme/target/properties http/1.1"), "{head}");
    assert!(head.contains("x-api-key: key-1234"), "{head}");
    assert!(head.contains("accept: application/vnd.adobe.target.v1+json"), "{head}");
}

fn unreachable_config() -> ServerConfig {
    ServerConfig {
        api_base_url: "http://127.0.0.1:1".into(),
        ..test_config()
    }
}

fn direct_transport() -> Arc<ReqwestTransport> {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    Arc::new(ReqwestTransport::with_client(client))
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    let gateway = TargetGateway::new(&unreachable_config(), direct_transport());

    let err = gateway.send(TargetRequest::get("/target/properties")).await.unwrap_err();

    assert!(matches!(err, GatewayError::Network(_)), "{err:?}");
    assert!(err.to_string().starts_with("Request failed:"), "{err}");
}

#[tokio::test]
async fn connection_failure_surfaces_as_tool_error() {
    let dispatcher = dispatcher_over(unreachable_config(), direct_transport(), Path::new("/nonexistent-templates"));

    let result = dispatcher.call_tool("listProperties", None).await;

    assert!(result.is_error);
    assert!(result.first_text().starts_with("Error: Request failed"), "{}", result.first_text());
}
