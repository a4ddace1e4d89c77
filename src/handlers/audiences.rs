use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{object_schema, with_query, PageArgs, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::{ApiVersion, TargetRequest};
use crate::registry::ToolSpec;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAudienceArgs {
    pub name: String,
    pub description: Option<String>,
    pub target_rule: Option<Map<String, Value>>,
}

pub(crate) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            ToolKind::ListAudiences,
            "List all audiences available in Adobe Target. Each audience carries an id and a \
             name; pass selected ids to createActivityFromModifications via audienceIds.",
            object_schema(
                json!({
                    "limit": { "type": "integer", "description": "Maximum number of audiences to return" },
                    "offset": { "type": "integer", "description": "Number of audiences to skip" },
                }),
                &[],
            ),
        ),
        ToolSpec::new(
            ToolKind::CreateAudience,
            "Create a new audience",
            object_schema(
                json!({
                    "name": { "type": "string", "description": "Audience name" },
                    "description": { "type": "string", "description": "Audience description" },
                    "targetRule": { "type": "object", "description": "Audience targeting rules" },
                }),
                &["name"],
            ),
        ),
    ]
}

pub async fn list(args: PageArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = with_query("/target/audiences", &args.query());
    Ok(ctx.send(TargetRequest::get(path).version(ApiVersion::V3)).await?)
}

pub async fn create(args: CreateAudienceArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let mut audience = Map::new();
    audience.insert("name".into(), json!(args.name));
    if let Some(description) = args.description.filter(|d| !d.is_empty()) {
        audience.insert("description".into(), json!(description));
    }
    if let Some(rule) = args.target_rule {
        audience.insert("targetRule".into(), Value::Object(rule));
    }

    let request = TargetRequest::post("/target/audiences", Value::Object(audience))
        .version(ApiVersion::V3);
    Ok(ctx.send(request).await?)
}
