use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{object_schema, positive, whole, with_query, IdArgs, ToolKind};
use crate::context::ExecutionContext;
use crate::defaults::apply_activity_defaults;
use crate::error::ToolError;
use crate::gateway::{ApiVersion, TargetRequest};
use crate::registry::ToolSpec;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActivitiesArgs {
    #[serde(default, deserialize_with = "whole::option_u64")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "whole::option_u64")]
    pub offset: Option<u64>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateAbActivityArgs {
    pub name: String,
    pub activity: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateAbActivityArgs {
    #[serde(deserialize_with = "whole::u64")]
    pub id: u64,
    pub activity: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    Approved,
    Deactivated,
    Saved,
}

impl ActivityState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Deactivated => "deactivated",
            Self::Saved => "saved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateActivityStateArgs {
    #[serde(deserialize_with = "whole::u64")]
    pub id: u64,
    pub state: ActivityState,
}

pub(crate) fn tools() -> Vec<ToolSpec> {
    let id = json!({ "type": "integer", "description": "Activity ID" });
    vec![
        ToolSpec::new(
            ToolKind::ListActivities,
            "List all Target activities with optional filtering and sorting",
            object_schema(
                json!({
                    "limit": { "type": "integer", "description": "Maximum number of activities to return" },
                    "offset": { "type": "integer", "description": "Number of activities to skip" },
                    "sortBy": { "type": "string", "description": "Field to sort by (e.g., \"id\", \"name\", \"state\")" },
                }),
                &[],
            ),
        ),
        ToolSpec::new(
            ToolKind::GetAbActivity,
            "Get details of a specific A/B Test activity",
            object_schema(json!({ "id": id }), &["id"]),
        ),
        ToolSpec::new(
            ToolKind::CreateAbActivity,
            "Create an A/B Test activity. Missing priority, workspace, locations, metrics, \
             analytics and entry constraint fields are filled from the configured defaults; \
             any value you provide wins.",
            object_schema(
                json!({
                    "name": { "type": "string", "description": "Activity name" },
                    "activity": {
                        "type": "object",
                        "description": "Full A/B Test activity definition object with locations, experiences, metrics, and optional fields",
                    },
                }),
                &["name", "activity"],
            ),
        ),
        ToolSpec::new(
            ToolKind::UpdateAbActivity,
            "Replace an existing A/B Test activity definition (PUT). Configured defaults are \
             applied to missing fields before sending. To change only the state, use \
             updateActivityState.",
            object_schema(
                json!({
                    "id": id,
                    "activity": {
                        "type": "object",
                        "description": "Complete updated activity definition object (replaces the existing definition)",
                    },
                }),
                &["id", "activity"],
            ),
        ),
        ToolSpec::new(
            ToolKind::UpdateActivityState,
            "Update the state of an activity (approved, deactivated, saved)",
            object_schema(
                json!({
                    "id": id,
                    "state": {
                        "type": "string",
                        "enum": ["approved", "deactivated", "saved"],
                        "description": "New state - \"approved\" (Live), \"deactivated\" (Inactive), or \"saved\"",
                    },
                }),
                &["id", "state"],
            ),
        ),
    ]
}

pub async fn list(args: ListActivitiesArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = with_query(
        "/target/activities",
        &[
            ("limit", positive(args.limit)),
            ("offset", positive(args.offset)),
            ("sortBy", super::non_empty(args.sort_by.as_deref())),
        ],
    );
    Ok(ctx.send(TargetRequest::get(path).version(ApiVersion::V3)).await?)
}

pub async fn get_ab(args: IdArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = format!("/target/activities/ab/{}", args.id);
    Ok(ctx.send(TargetRequest::get(path).version(ApiVersion::V3)).await?)
}

pub async fn create_ab(args: CreateAbActivityArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let mut activity = args.activity;
    if activity.get("name").map_or(true, Value::is_null) {
        activity.insert("name".into(), json!(args.name));
    }
    let activity = apply_activity_defaults(activity, &ctx.config);

    let request = TargetRequest::post("/target/activities/ab", Value::Object(activity))
        .version(ApiVersion::V3);
    Ok(ctx.send(request).await?)
}

pub async fn update_ab(args: UpdateAbActivityArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let activity = apply_activity_defaults(args.activity, &ctx.config);
    let path = format!("/target/activities/ab/{}", args.id);
    let request = TargetRequest::put(path, Value::Object(activity)).version(ApiVersion::V3);
    Ok(ctx.send(request).await?)
}

pub async fn update_state(args: UpdateActivityStateArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = format!("/target/activities/{}/state", args.id);
    let request = TargetRequest::put(path, json!({ "state": args.state.as_str() }));
    Ok(ctx.send(request).await?)
}
