use serde_json::{json, Value};

use super::{object_schema, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::TargetRequest;
use crate::registry::ToolSpec;

pub(crate) fn tools() -> Vec<ToolSpec> {
    vec![ToolSpec::new(
        ToolKind::ListProperties,
        "List all properties",
        object_schema(json!({}), &[]),
    )]
}

pub async fn list(ctx: &ExecutionContext) -> Result<Value, ToolError> {
    Ok(ctx.send(TargetRequest::get("/target/properties")).await?)
}
