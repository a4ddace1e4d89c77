//! MCP server for the Adobe Target Admin API.
//!
//! Exposes activities, offers, audiences, mboxes, reports, response tokens,
//! revisions and offer templates as MCP tools and resources over JSON-RPC 2.0
//! stdio transport. Every tool call becomes one or more authenticated
//! requests against `{TARGET_API_BASE_URL}/{tenant}/target/...`.

pub mod config;
pub mod context;
pub mod defaults;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod scratch;
pub mod server;
pub mod templates;
