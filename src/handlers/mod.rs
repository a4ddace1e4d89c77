//! Tool handlers, one module per Admin API resource group.
//!
//! Arguments are parsed into a typed [`ToolCall`] at the dispatch boundary,
//! so malformed input never reaches a handler.

pub mod activities;
pub mod atjs;
pub mod audiences;
pub mod custom;
pub mod insights;
pub mod mboxes;
pub mod offers;
pub mod properties;
pub mod reports;
pub mod response_tokens;
pub mod revisions;
pub mod templates;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::context::ExecutionContext;
use crate::error::ToolError;

/// Every tool the server knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ListActivities,
    GetAbActivity,
    CreateAbActivity,
    UpdateAbActivity,
    UpdateActivityState,
    GetAtjsVersions,
    GetAtjsSettings,
    ListAudiences,
    CreateAudience,
    ListMboxes,
    GetMbox,
    ListMboxProfileAttributes,
    ListOffers,
    GetOffer,
    CreateOffer,
    CreateJsonOffer,
    UpdateOffer,
    ListProperties,
    GetAbPerformanceReport,
    GetAptPerformanceReport,
    GetXtOrdersReport,
    GetActivityInsights,
    ListResponseTokens,
    CreateResponseToken,
    GetRevisions,
    GetEntityRevisions,
    CreateActivityFromModifications,
    ListTemplates,
}

impl ToolKind {
    /// Wire name of the tool.
    pub fn name(self) -> &'static str {
        match self {
            Self::ListActivities => "listActivities",
            Self::GetAbActivity => "getABActivity",
            Self::CreateAbActivity => "createABActivity",
            Self::UpdateAbActivity => "updateABActivity",
            Self::UpdateActivityState => "updateActivityState",
            Self::GetAtjsVersions => "getAtjsVersions",
            Self::GetAtjsSettings => "getAtjsSettings",
            Self::ListAudiences => "listAudiences",
            Self::CreateAudience => "createAudience",
            Self::ListMboxes => "listMboxes",
            Self::GetMbox => "getMbox",
            Self::ListMboxProfileAttributes => "listMboxProfileAttributes",
            Self::ListOffers => "listOffers",
            Self::GetOffer => "getOffer",
            Self::CreateOffer => "createOffer",
            Self::CreateJsonOffer => "createJsonOffer",
            Self::UpdateOffer => "updateOffer",
            Self::ListProperties => "listProperties",
            Self::GetAbPerformanceReport => "getABPerformanceReport",
            Self::GetAptPerformanceReport => "getAPTPerformanceReport",
            Self::GetXtOrdersReport => "getXTOrdersReport",
            Self::GetActivityInsights => "getActivityInsights",
            Self::ListResponseTokens => "listResponseTokens",
            Self::CreateResponseToken => "createResponseToken",
            Self::GetRevisions => "getRevisions",
            Self::GetEntityRevisions => "getEntityRevisions",
            Self::CreateActivityFromModifications => "createActivityFromModifications",
            Self::ListTemplates => "listTemplates",
        }
    }
}

/// A tool invocation with validated arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    ListActivities(activities::ListActivitiesArgs),
    GetAbActivity(IdArgs),
    CreateAbActivity(activities::CreateAbActivityArgs),
    UpdateAbActivity(activities::UpdateAbActivityArgs),
    UpdateActivityState(activities::UpdateActivityStateArgs),
    GetAtjsVersions,
    GetAtjsSettings,
    ListAudiences(PageArgs),
    CreateAudience(audiences::CreateAudienceArgs),
    ListMboxes,
    GetMbox(mboxes::GetMboxArgs),
    ListMboxProfileAttributes,
    ListOffers(PageArgs),
    GetOffer(IdArgs),
    CreateOffer(offers::CreateOfferArgs),
    CreateJsonOffer(offers::CreateJsonOfferArgs),
    UpdateOffer(offers::UpdateOfferArgs),
    ListProperties,
    GetAbPerformanceReport(reports::ReportArgs),
    GetAptPerformanceReport(reports::ReportArgs),
    GetXtOrdersReport(reports::ReportArgs),
    GetActivityInsights(insights::ActivityInsightsArgs),
    ListResponseTokens,
    CreateResponseToken(response_tokens::CreateResponseTokenArgs),
    GetRevisions(revisions::GetRevisionsArgs),
    GetEntityRevisions(revisions::GetEntityRevisionsArgs),
    CreateActivityFromModifications(custom::ModificationsArgs),
    ListTemplates,
}

impl ToolCall {
    /// Parse raw arguments into the variant for `kind`. `null` reads as `{}`.
    pub fn parse(kind: ToolKind, arguments: Value) -> Result<Self, ToolError> {
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        macro_rules! args {
            () => {
                parse_args(kind, arguments)
            };
        }

        Ok(match kind {
            ToolKind::ListActivities => Self::ListActivities(args!()?),
            ToolKind::GetAbActivity => Self::GetAbActivity(args!()?),
            ToolKind::CreateAbActivity => Self::CreateAbActivity(args!()?),
            ToolKind::UpdateAbActivity => Self::UpdateAbActivity(args!()?),
            ToolKind::UpdateActivityState => Self::UpdateActivityState(args!()?),
            ToolKind::GetAtjsVersions => Self::GetAtjsVersions,
            ToolKind::GetAtjsSettings => Self::GetAtjsSettings,
            ToolKind::ListAudiences => Self::ListAudiences(args!()?),
            ToolKind::CreateAudience => Self::CreateAudience(args!()?),
            ToolKind::ListMboxes => Self::ListMboxes,
            ToolKind::GetMbox => Self::GetMbox(args!()?),
            ToolKind::ListMboxProfileAttributes => Self::ListMboxProfileAttributes,
            ToolKind::ListOffers => Self::ListOffers(args!()?),
            ToolKind::GetOffer => Self::GetOffer(args!()?),
            ToolKind::CreateOffer => Self::CreateOffer(args!()?),
            ToolKind::CreateJsonOffer => Self::CreateJsonOffer(args!()?),
            ToolKind::UpdateOffer => Self::UpdateOffer(args!()?),
            ToolKind::ListProperties => Self::ListProperties,
            ToolKind::GetAbPerformanceReport => Self::GetAbPerformanceReport(args!()?),
            ToolKind::GetAptPerformanceReport => Self::GetAptPerformanceReport(args!()?),
            ToolKind::GetXtOrdersReport => Self::GetXtOrdersReport(args!()?),
            ToolKind::GetActivityInsights => Self::GetActivityInsights(args!()?),
            ToolKind::ListResponseTokens => Self::ListResponseTokens,
            ToolKind::CreateResponseToken => Self::CreateResponseToken(args!()?),
            ToolKind::GetRevisions => Self::GetRevisions(args!()?),
            ToolKind::GetEntityRevisions => Self::GetEntityRevisions(args!()?),
            ToolKind::CreateActivityFromModifications => {
                Self::CreateActivityFromModifications(args!()?)
            }
            ToolKind::ListTemplates => Self::ListTemplates,
        })
    }

    /// Run the handler for this call.
    pub async fn execute(self, ctx: &ExecutionContext) -> Result<Value, ToolError> {
        match self {
            Self::ListActivities(args) => activities::list(args, ctx).await,
            Self::GetAbActivity(args) => activities::get_ab(args, ctx).await,
            Self::CreateAbActivity(args) => activities::create_ab(args, ctx).await,
            Self::UpdateAbActivity(args) => activities::update_ab(args, ctx).await,
            Self::UpdateActivityState(args) => activities::update_state(args, ctx).await,
            Self::GetAtjsVersions => atjs::versions(ctx).await,
            Self::GetAtjsSettings => atjs::settings(ctx).await,
            Self::ListAudiences(args) => audiences::list(args, ctx).await,
            Self::CreateAudience(args) => audiences::create(args, ctx).await,
            Self::ListMboxes => mboxes::list(ctx).await,
            Self::GetMbox(args) => mboxes::get(args, ctx).await,
            Self::ListMboxProfileAttributes => mboxes::profile_attributes(ctx).await,
            Self::ListOffers(args) => offers::list(args, ctx).await,
            Self::GetOffer(args) => offers::get(args, ctx).await,
            Self::CreateOffer(args) => offers::create(args, ctx).await,
            Self::CreateJsonOffer(args) => offers::create_json(args, ctx).await,
            Self::UpdateOffer(args) => offers::update(args, ctx).await,
            Self::ListProperties => properties::list(ctx).await,
            Self::GetAbPerformanceReport(args) => {
                reports::performance(reports::ActivityType::Ab, args, ctx).await
            }
            Self::GetAptPerformanceReport(args) => {
                reports::performance(reports::ActivityType::Abt, args, ctx).await
            }
            Self::GetXtOrdersReport(args) => reports::xt_orders(args, ctx).await,
            Self::GetActivityInsights(args) => insights::handle(args, ctx).await,
            Self::ListResponseTokens => response_tokens::list(ctx).await,
            Self::CreateResponseToken(args) => response_tokens::create(args, ctx).await,
            Self::GetRevisions(args) => revisions::list(args, ctx).await,
            Self::GetEntityRevisions(args) => revisions::for_entity(args, ctx).await,
            Self::CreateActivityFromModifications(args) => custom::create_activity(args, ctx).await,
            Self::ListTemplates => templates::list(ctx).await,
        }
    }
}

/// Arguments naming a single entity by numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdArgs {
    #[serde(deserialize_with = "whole::u64")]
    pub id: u64,
}

/// Optional pagination for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageArgs {
    #[serde(default, deserialize_with = "whole::option_u64")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "whole::option_u64")]
    pub offset: Option<u64>,
}

impl PageArgs {
    fn query(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("limit", positive(self.limit)),
            ("offset", positive(self.offset)),
        ]
    }
}

fn parse_args<T: DeserializeOwned>(kind: ToolKind, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: kind.name(),
        message: e.to_string(),
    })
}

/// Append form-encoded query parameters, skipping `None` values.
pub(crate) fn with_query(path: &str, params: &[(&str, Option<String>)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        if let Some(value) = value {
            serializer.append_pair(key, value);
            any = true;
        }
    }
    if any {
        format!("{path}?{}", serializer.finish())
    } else {
        path.to_string()
    }
}

/// Zero means "not given" for list paging.
pub(crate) fn positive(value: Option<u64>) -> Option<String> {
    value.filter(|v| *v > 0).map(|v| v.to_string())
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Standard object schema used by tool descriptors.
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    let mut schema = serde_json::json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = serde_json::json!(required);
    }
    schema
}

/// Serde adapters for whole-number arguments. Clients that only speak JSON
/// numbers may send `42.0`; anything with a fractional part is rejected.
pub(crate) mod whole {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Number;

    fn unsigned<E: Error>(n: &Number) -> Result<u64, E> {
        n.as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .ok_or_else(|| E::custom(format!("expected a non-negative integer, got {n}")))
    }

    fn signed<E: Error>(n: &Number) -> Result<i64, E> {
        n.as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| E::custom(format!("expected an integer, got {n}")))
    }

    pub fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        unsigned(&Number::deserialize(d)?)
    }

    pub fn option_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Option::<Number>::deserialize(d)?.map(|n| unsigned(&n)).transpose()
    }

    pub fn option_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Option::<Number>::deserialize(d)?.map(|n| signed(&n)).transpose()
    }

    pub fn option_vec_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u64>>, D::Error> {
        Option::<Vec<Number>>::deserialize(d)?
            .map(|list| list.iter().map(unsigned).collect())
            .transpose()
    }
}
