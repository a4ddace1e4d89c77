use serde::Deserialize;
use serde_json::{json, Value};

use super::{object_schema, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::TargetRequest;
use crate::registry::ToolSpec;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMboxArgs {
    pub mbox_name: String,
}

pub(crate) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(ToolKind::ListMboxes, "List all mboxes", object_schema(json!({}), &[])),
        ToolSpec::new(
            ToolKind::GetMbox,
            "Get details of a specific mbox by name, including location ID, name, and \
             associated audience IDs",
            object_schema(
                json!({
                    "mboxName": {
                        "type": "string",
                        "description": "The name of the mbox (e.g., \"target-global-mbox\", \"hero-mbox\")",
                    },
                }),
                &["mboxName"],
            ),
        ),
        ToolSpec::new(
            ToolKind::ListMboxProfileAttributes,
            "List all profile attributes associated with mboxes in Adobe Target",
            object_schema(json!({}), &[]),
        ),
    ]
}

pub async fn list(ctx: &ExecutionContext) -> Result<Value, ToolError> {
    Ok(ctx.send(TargetRequest::get("/target/mboxes")).await?)
}

pub async fn get(args: GetMboxArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    if args.mbox_name.is_empty() || args.mbox_name.contains('/') {
        return Err(ToolError::InvalidInput(format!(
            "invalid mbox name: {:?}",
            args.mbox_name
        )));
    }
    let path = format!("/target/mbox/{}", args.mbox_name);
    Ok(ctx.send(TargetRequest::get(path)).await?)
}

pub async fn profile_attributes(ctx: &ExecutionContext) -> Result<Value, ToolError> {
    Ok(ctx.send(TargetRequest::get("/target/profileattributes/mbox")).await?)
}
