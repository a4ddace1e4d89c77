use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{object_schema, whole, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::TargetRequest;
use crate::registry::ToolSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    BuiltIn,
    Activity,
    Geo,
    Crs,
    Mbox,
    Script,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateResponseTokenArgs {
    #[serde(default, deserialize_with = "whole::option_u64")]
    pub id: Option<u64>,
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

pub(crate) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            ToolKind::ListResponseTokens,
            "List all response tokens configured in Adobe Target. System tokens with \
             deletable: false can only be activated or deactivated in the Target UI.",
            object_schema(json!({}), &[]),
        ),
        ToolSpec::new(
            ToolKind::CreateResponseToken,
            "Create a new custom response token. Check listResponseTokens first: existing \
             system tokens cannot be recreated. SCRIPT tokens require the profile script to \
             exist already (profile scripts cannot be created through the Admin API). MBOX is \
             the usual type for new tokens.",
            object_schema(
                json!({
                    "id": { "type": "integer", "description": "Response token ID (optional)" },
                    "token": {
                        "type": "string",
                        "description": "Token identifier (e.g., \"experience.id\", \"profile.scriptName\", \"geo.city\")",
                    },
                    "type": {
                        "type": "string",
                        "enum": ["BUILT_IN", "ACTIVITY", "GEO", "CRS", "MBOX", "SCRIPT"],
                        "description": "Token type",
                    },
                }),
                &["token", "type"],
            ),
        ),
    ]
}

pub async fn list(ctx: &ExecutionContext) -> Result<Value, ToolError> {
    Ok(ctx.send(TargetRequest::get("/target/responsetokens")).await?)
}

pub async fn create(args: CreateResponseTokenArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let mut token = json!({ "token": args.token, "type": args.token_type });
    if let Some(id) = args.id {
        token["id"] = json!(id);
    }
    Ok(ctx.send(TargetRequest::post("/target/responsetokens", token)).await?)
}
