use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{non_empty, object_schema, whole, with_query, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::TargetRequest;
use crate::registry::ToolSpec;

/// Entity kinds with an audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevisionResourceType {
    Activity,
    Audience,
    Offer,
    ProfileScript,
    Property,
    Environment,
    ResponseToken,
    Host,
    AuthorizedHosts,
}

impl RevisionResourceType {
    pub const ALL: [RevisionResourceType; 9] = [
        Self::Activity,
        Self::Audience,
        Self::Offer,
        Self::ProfileScript,
        Self::Property,
        Self::Environment,
        Self::ResponseToken,
        Self::Host,
        Self::AuthorizedHosts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Audience => "audience",
            Self::Offer => "offer",
            Self::ProfileScript => "profileScript",
            Self::Property => "property",
            Self::Environment => "environment",
            Self::ResponseToken => "responseToken",
            Self::Host => "host",
            Self::AuthorizedHosts => "authorizedHosts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRevisionsArgs {
    pub revision_resource_type: RevisionResourceType,
    pub modified_by: String,
    pub modified_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEntityRevisionsArgs {
    pub revision_resource_type: RevisionResourceType,
    #[serde(deserialize_with = "whole::u64")]
    pub id: u64,
}

pub(crate) fn tools() -> Vec<ToolSpec> {
    let resource_type = json!({
        "type": "string",
        "enum": RevisionResourceType::ALL.map(RevisionResourceType::as_str),
        "description": "Entity type to fetch revisions for",
    });

    vec![
        ToolSpec::new(
            ToolKind::GetRevisions,
            "Get all revisions (audit log) for a resource type, filtered by author's name and \
             optionally by modified-after timestamp (defaults to the last day)",
            object_schema(
                json!({
                    "revisionResourceType": resource_type,
                    "modifiedBy": { "type": "string", "description": "Author's name to filter revisions" },
                    "modifiedAt": {
                        "type": "string",
                        "description": "Optional modified-after timestamp in ISO-8601 format (e.g., \"2024-01-01T00:00:00Z\")",
                    },
                }),
                &["revisionResourceType", "modifiedBy"],
            ),
        ),
        ToolSpec::new(
            ToolKind::GetEntityRevisions,
            "Get all revisions of a specific entity by ID, newest first. Only the latest 100 \
             revisions are retained per entity. For authorizedHosts, use the client ID.",
            object_schema(
                json!({
                    "revisionResourceType": resource_type,
                    "id": { "type": "integer", "description": "Entity ID (for authorizedHosts, use client ID)" },
                }),
                &["revisionResourceType", "id"],
            ),
        ),
    ]
}

pub async fn list(args: GetRevisionsArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = with_query(
        &format!("/target/revisions/{}", args.revision_resource_type.as_str()),
        &[
            ("modifiedBy", non_empty(Some(args.modified_by.as_str()))),
            ("modifiedAt", non_empty(args.modified_at.as_deref())),
        ],
    );
    Ok(ctx.send(TargetRequest::get(path)).await?)
}

pub async fn for_entity(args: GetEntityRevisionsArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = format!(
        "/target/revisions/{}/{}",
        args.revision_resource_type.as_str(),
        args.id
    );
    Ok(ctx.send(TargetRequest::get(path)).await?)
}
