use serde_json::{json, Value};

use super::{object_schema, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::TargetRequest;
use crate::registry::ToolSpec;

pub(crate) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            ToolKind::GetAtjsVersions,
            "Retrieve list of available AT.js versions",
            object_schema(json!({}), &[]),
        ),
        ToolSpec::new(
            ToolKind::GetAtjsSettings,
            "Retrieve AT.js settings including client code, decisioning method, timeout, \
             global mbox configuration, and other AT.js library settings",
            object_schema(json!({}), &[]),
        ),
    ]
}

pub async fn versions(ctx: &ExecutionContext) -> Result<Value, ToolError> {
    Ok(ctx.send(TargetRequest::get("/target/atjs/versions")).await?)
}

pub async fn settings(ctx: &ExecutionContext) -> Result<Value, ToolError> {
    Ok(ctx.send(TargetRequest::get("/target/atjs/settings")).await?)
}
