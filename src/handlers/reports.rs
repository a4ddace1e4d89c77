use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{non_empty, object_schema, whole, with_query, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::TargetRequest;
use crate::registry::ToolSpec;

/// Activity families with performance reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// A/B test
    Ab,
    /// Experience targeting
    Xt,
    /// Automated personalization
    Abt,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ab => "ab",
            Self::Xt => "xt",
            Self::Abt => "abt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ab" => Some(Self::Ab),
            "xt" => Some(Self::Xt),
            "abt" => Some(Self::Abt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportArgs {
    #[serde(deserialize_with = "whole::u64")]
    pub id: u64,
    pub report_interval: Option<String>,
}

pub(crate) fn tools() -> Vec<ToolSpec> {
    let schema = object_schema(
        json!({
            "id": { "type": "integer", "description": "Activity ID" },
            "reportInterval": {
                "type": "string",
                "description": "Optional date range in ISO 8601 format (e.g., \"2024-01-01T00:00-07:00/2024-02-01T00:00-07:00\")",
            },
        }),
        &["id"],
    );

    vec![
        ToolSpec::new(
            ToolKind::GetAbPerformanceReport,
            "Get performance report for an A/B Test activity with metrics, conversions, and visitor data",
            schema.clone(),
        ),
        ToolSpec::new(
            ToolKind::GetAptPerformanceReport,
            "Get performance report for an Automated Personalization Test (APT) activity with \
             metrics, conversions, and visitor data",
            schema.clone(),
        ),
        ToolSpec::new(
            ToolKind::GetXtOrdersReport,
            "Get orders report data for an Experience Targeting (XT) activity, including \
             conversion metrics and order information",
            schema,
        ),
        super::insights::tool(),
    ]
}

/// Path of an activity's performance report, with the optional interval.
pub fn performance_path(kind: ActivityType, id: u64, report_interval: Option<&str>) -> String {
    with_query(
        &format!("/target/activities/{}/{id}/report/performance", kind.as_str()),
        &[("reportInterval", non_empty(report_interval))],
    )
}

pub async fn performance(kind: ActivityType, args: ReportArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = performance_path(kind, args.id, args.report_interval.as_deref());
    Ok(ctx.send(TargetRequest::get(path)).await?)
}

pub async fn xt_orders(args: ReportArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let path = with_query(
        &format!("/target/activities/xt/{}/report/orders", args.id),
        &[("reportInterval", non_empty(args.report_interval.as_deref()))],
    );
    Ok(ctx.send(TargetRequest::get(path)).await?)
}
