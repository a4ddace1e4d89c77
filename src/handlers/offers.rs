use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{object_schema, whole, with_query, IdArgs, PageArgs, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::{ApiVersion, TargetRequest};
use crate::registry::ToolSpec;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOfferArgs {
    pub name: String,
    pub content: String,
    pub workspace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateJsonOfferArgs {
    pub name: String,
    pub content: Map<String, Value>,
    pub workspace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateOfferArgs {
    #[serde(deserialize_with = "whole::u64")]
    pub id: u64,
    pub name: String,
    pub content: Option<String>,
}

pub(crate) fn tools() -> Vec<ToolSpec> {
    let id = json!({ "type": "integer", "description": "Offer ID" });
    let workspace = json!({
        "type": "string",
        "description": "Workspace ID (optional). Defaults to TARGET_WORKSPACE_ID or the account default workspace.",
    });
    let paging = json!({
        "limit": { "type": "integer", "description": "Maximum number of offers to return" },
        "offset": { "type": "integer", "description": "Number of offers to skip" },
    });

    vec![
        ToolSpec::new(ToolKind::ListOffers, "List all offers", object_schema(paging, &[])),
        ToolSpec::new(
            ToolKind::GetOffer,
            "Get details of a specific offer",
            object_schema(json!({ "id": id }), &["id"]),
        ),
        ToolSpec::new(
            ToolKind::CreateOffer,
            "Create an HTML offer. Wrap JavaScript in <script> tags.",
            object_schema(
                json!({
                    "name": { "type": "string", "description": "Offer name" },
                    "content": { "type": "string", "description": "Offer content (HTML/CSS/JavaScript)" },
                    "workspace": workspace,
                }),
                &["name", "content"],
            ),
        ),
        ToolSpec::new(
            ToolKind::CreateJsonOffer,
            "Create a JSON offer for single-page apps, headless or server-side experiences",
            object_schema(
                json!({
                    "name": { "type": "string", "description": "Offer name" },
                    "content": {
                        "type": "object",
                        "description": "JSON object containing the offer data",
                    },
                    "workspace": workspace,
                }),
                &["name", "content"],
            ),
        ),
        ToolSpec::new(
            ToolKind::UpdateOffer,
            "Update an existing offer's name and/or content. The name is required by the API \
             even when only the content changes; use getOffer to look it up.",
            object_schema(
                json!({
                    "id": { "type": "integer", "description": "Offer ID to update" },
                    "name": { "type": "string", "description": "Offer name (required even if unchanged)" },
                    "content": { "type": "string", "description": "Updated offer content (HTML/CSS/JavaScript)" },
                }),
                &["id", "name"],
            ),
        ),
    ]
}

pub async fn list(args: PageArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = with_query("/target/offers", &args.query());
    Ok(ctx.send(TargetRequest::get(path).version(ApiVersion::V2)).await?)
}

pub async fn get(args: IdArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = format!("/target/offers/content/{}", args.id);
    Ok(ctx.send(TargetRequest::get(path)).await?)
}

pub async fn create(args: CreateOfferArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let payload = offer_payload(args.name, json!(args.content), args.workspace, ctx);
    let request = TargetRequest::post("/target/offers/content", payload).version(ApiVersion::V2);
    Ok(ctx.send(request).await?)
}

pub async fn create_json(args: CreateJsonOfferArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let payload = offer_payload(args.name, Value::Object(args.content), args.workspace, ctx);
    let request = TargetRequest::post("/target/offers/json", payload).version(ApiVersion::V2);
    Ok(ctx.send(request).await?)
}

pub async fn update(args: UpdateOfferArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let mut payload = json!({ "name": args.name });
    if let Some(content) = args.content.filter(|c| !c.is_empty()) {
        payload["content"] = json!(content);
    }
    let path = format!("/target/offers/content/{}", args.id);
    Ok(ctx.send(TargetRequest::put(path, payload).version(ApiVersion::V2)).await?)
}

/// Offer body with the caller's workspace, else the configured one.
fn offer_payload(name: String, content: Value, workspace: Option<String>, ctx: &ExecutionContext) -> Value {
    let mut payload = json!({ "name": name, "content": content });
    let workspace = workspace
        .filter(|w| !w.is_empty())
        .or_else(|| ctx.config.workspace_id.clone());
    if let Some(workspace) = workspace {
        payload["workspace"] = json!(workspace);
    }
    payload
}
