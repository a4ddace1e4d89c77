//! Activity insights: find an activity by name, pull its performance report
//! and compare experiences.
//!
//! Every failure on this path is reported inside the payload as
//! `{"success": false, "error": ...}` rather than as a tool error.

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::reports::{performance_path, ActivityType};
use super::{object_schema, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::{ApiVersion, GatewayError, TargetRequest};
use crate::registry::ToolSpec;

/// Visitors below this make any result statistically weak.
const LOW_TRAFFIC: u64 = 100;
/// Automated personalization needs this many visitors to learn.
const AP_TRAFFIC: u64 = 1000;
/// Allowed deviation from the mean split before traffic counts as uneven.
const IMBALANCE_RATIO: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInsightsArgs {
    pub activity_name: String,
    pub report_interval: Option<String>,
    pub qa_url: Option<String>,
}

pub(crate) fn tool() -> ToolSpec {
    ToolSpec::new(
        ToolKind::GetActivityInsights,
        "Search for an activity by name and get a detailed performance comparison of all \
         experiences with insights and recommendations. No activity ID needed.",
        object_schema(
            json!({
                "activityName": {
                    "type": "string",
                    "description": "Name of the activity (can be partial match)",
                },
                "reportInterval": {
                    "type": "string",
                    "description": "Optional date range in ISO 8601 format (e.g., \"2024-01-01T00:00-07:00/2024-02-01T00:00-07:00\")",
                },
                "qaUrl": {
                    "type": "string",
                    "description": "Optional URL for generating QA preview links. Without it no QA links are generated.",
                },
            }),
            &["activityName"],
        ),
    )
}

pub async fn handle(args: ActivityInsightsArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    match insights(&args, ctx).await {
        Ok(payload) => Ok(payload),
        Err(err) => {
            warn!(activity = %args.activity_name, error = %err, "activity insights failed");
            Ok(failure(err.to_string()))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActivityList {
    #[serde(deserialize_with = "null_as_default")]
    activities: Vec<ActivitySummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ActivitySummary {
    id: Value,
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    kind: String,
    state: Option<String>,
    priority: Option<Value>,
    modified_at: Option<Value>,
}

impl ActivitySummary {
    fn brief(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "type": self.kind, "state": self.state })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PerformanceReport {
    activity: ReportActivity,
    report: ReportBody,
    report_parameters: ReportParameters,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReportActivity {
    #[serde(deserialize_with = "null_as_default")]
    experiences: Vec<ReportExperience>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ReportExperience {
    name: Option<String>,
    experience_local_id: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReportBody {
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ReportParameters {
    report_interval: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Statistics {
    totals: Counters,
    #[serde(deserialize_with = "null_as_default")]
    experiences: Vec<ExperienceStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExperienceStatistics {
    totals: Counters,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Counters {
    visitor: Counter,
    visit: Counter,
    impression: Counter,
    landing: Counter,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Counter {
    totals: Tally,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(default)]
struct Tally {
    entries: u64,
    conversions: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QaModeResponse {
    qa_mode_experiences: Option<Vec<QaLink>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QaLink {
    experience_local_id: Value,
    url: Option<String>,
}

/// Upstream listings sometimes carry explicit `null`s; read them as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One experience's numbers, kept unformatted for ranking.
#[derive(Debug, Clone)]
struct Comparison {
    name: String,
    experience_id: Value,
    is_control: bool,
    visitors: u64,
    conversions: u64,
    visits: u64,
    impressions: u64,
    landings: u64,
    rate: f64,
    lift: Option<f64>,
    qa_url: Option<String>,
}

impl Comparison {
    fn to_json(&self) -> Value {
        let mut out = json!({
            "experienceName": self.name,
            "experienceId": self.experience_id,
            "isControl": self.is_control,
            "metrics": {
                "visitors": self.visitors,
                "conversions": self.conversions,
                "conversionRate": percent(self.rate),
                "visits": self.visits,
                "impressions": self.impressions,
                "landings": self.landings,
            },
        });
        if let Some(lift) = self.lift {
            out["performance"] = json!({ "lift": percent(lift), "isWinning": lift > 0.0 });
        }
        if let Some(url) = &self.qa_url {
            out["qaUrl"] = json!(url);
        }
        out
    }
}

struct TypeInfo {
    name: String,
    description: &'static str,
    comparison_note: &'static str,
}

impl TypeInfo {
    fn of(kind: &str) -> Self {
        let (name, description, comparison_note) = match kind {
            "ab" => (
                "A/B Test",
                "Randomly splits traffic between experiences to test which performs best",
                "Experiences are randomly distributed - comparing statistical performance",
            ),
            "xt" => (
                "Experience Targeting",
                "Shows different experiences to different audience segments",
                "Experiences are targeted to specific audiences - not random distribution",
            ),
            "abt" => (
                "Automated Personalization",
                "Uses machine learning to automatically show the best experience to each visitor",
                "Algorithm-driven personalization - performance varies by visitor attributes",
            ),
            other => {
                return Self {
                    name: other.to_uppercase(),
                    description: "Unknown activity type",
                    comparison_note: "Performance comparison",
                }
            }
        };
        Self { name: name.to_string(), description, comparison_note }
    }
}

async fn insights(args: &ActivityInsightsArgs, ctx: &ExecutionContext) -> Result<Value, GatewayError> {
    let listing = ctx
        .gateway
        .send(TargetRequest::get("/target/activities").version(ApiVersion::V3))
        .await?;
    let listing: ActivityList = serde_json::from_value(listing)?;
    if listing.activities.is_empty() {
        return Ok(failure("No activities found in your Target account."));
    }

    let needle = args.activity_name.to_lowercase();
    let matches: Vec<&ActivitySummary> = listing
        .activities
        .iter()
        .filter(|a| a.name.to_lowercase().contains(&needle))
        .collect();

    let activity = match matches.as_slice() {
        [] => {
            return Ok(json!({
                "success": false,
                "error": format!("No activity found matching \"{}\".", args.activity_name),
                "suggestion": "Try a different search term or check the activity name.",
            }))
        }
        [only] => *only,
        several => {
            return Ok(json!({
                "success": false,
                "error": format!(
                    "Found {} activities matching \"{}\". Please be more specific.",
                    several.len(),
                    args.activity_name
                ),
                "matchingActivities": several.iter().map(|a| a.brief()).collect::<Vec<_>>(),
            }))
        }
    };

    let Some(kind) = ActivityType::parse(&activity.kind) else {
        return Ok(json!({
            "success": false,
            "error": format!("Activity type \"{}\" does not support performance reporting.", activity.kind),
            "supportedTypes": ["ab", "xt", "abt"],
        }));
    };
    let id = activity_id(activity)?;

    let path = performance_path(kind, id, args.report_interval.as_deref());
    let report: PerformanceReport = serde_json::from_value(ctx.gateway.send(TargetRequest::get(path)).await?)?;

    let qa_links = match args.qa_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => qa_links(ctx, kind, id, url).await,
        None => None,
    };

    let comparisons = compare(&report, kind, qa_links.as_deref());
    let type_info = TypeInfo::of(&activity.kind);
    let (insights, recommendations) = assess(&comparisons, activity, kind, &type_info);

    let totals = &report.report.statistics.totals;
    Ok(json!({
        "success": true,
        "activity": {
            "id": activity.id,
            "name": activity.name,
            "type": activity.kind,
            "typeDisplay": type_info.name,
            "typeDescription": type_info.description,
            "state": activity.state,
            "priority": activity.priority,
            "modifiedAt": activity.modified_at,
        },
        "reportPeriod": report.report_parameters.report_interval,
        "summary": {
            "totalVisitors": totals.visitor.totals.entries,
            "totalConversions": totals.visitor.totals.conversions,
            "totalVisits": totals.visit.totals.entries,
            "totalImpressions": totals.impression.totals.entries,
        },
        "experienceComparisons": comparisons.iter().map(Comparison::to_json).collect::<Vec<_>>(),
        "insights": insights,
        "recommendations": recommendations,
    }))
}

fn activity_id(activity: &ActivitySummary) -> Result<u64, GatewayError> {
    activity
        .id
        .as_u64()
        .or_else(|| activity.id.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| GatewayError::Parse(serde::de::Error::custom(format!("activity id {} is not numeric", activity.id))))
}

/// QA preview links are optional; a failed lookup only logs.
async fn qa_links(ctx: &ExecutionContext, kind: ActivityType, id: u64, url: &str) -> Option<Vec<QaLink>> {
    let path = format!("/target/activities/{}/{id}/qamode", kind.as_str());
    let body = json!({
        "url": url,
        "currentActivityOnly": false,
        "audienceIdsEvaluatedAsTrue": [],
        "audienceIdsEvaluatedAsFalse": [],
    });
    match ctx.gateway.send(TargetRequest::post(path, body)).await {
        Ok(value) => {
            let links = serde_json::from_value::<QaModeResponse>(value)
                .ok()
                .and_then(|r| r.qa_mode_experiences);
            debug!(count = links.as_ref().map_or(0, Vec::len), "qa links retrieved");
            links
        }
        Err(err) => {
            warn!(error = %err, "failed to retrieve QA links");
            None
        }
    }
}

fn compare(report: &PerformanceReport, kind: ActivityType, qa_links: Option<&[QaLink]>) -> Vec<Comparison> {
    let has_control = kind == ActivityType::Ab;
    let stats = &report.report.statistics.experiences;
    let tally = |idx: usize| stats.get(idx).map(|s| &s.totals);
    let control_rate = tally(0).map_or(0.0, |t| conversion_rate(t.visitor.totals));

    report
        .activity
        .experiences
        .iter()
        .enumerate()
        .map(|(idx, exp)| {
            let empty = Counters::default();
            let totals = tally(idx).unwrap_or(&empty);
            let rate = conversion_rate(totals.visitor.totals);
            let qa_url = qa_links.and_then(|links| {
                links
                    .iter()
                    .find(|qa| qa.experience_local_id == exp.experience_local_id)
                    .and_then(|qa| qa.url.clone())
            });
            Comparison {
                name: exp
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| experience_label(idx)),
                experience_id: exp.experience_local_id.clone(),
                is_control: has_control && idx == 0,
                visitors: totals.visitor.totals.entries,
                conversions: totals.visitor.totals.conversions,
                visits: totals.visit.totals.entries,
                impressions: totals.impression.totals.entries,
                landings: totals.landing.totals.entries,
                rate,
                lift: (has_control && idx > 0).then(|| lift(control_rate, rate)),
                qa_url,
            }
        })
        .collect()
}

fn assess(
    comparisons: &[Comparison],
    activity: &ActivitySummary,
    kind: ActivityType,
    type_info: &TypeInfo,
) -> (Vec<String>, Vec<String>) {
    let mut insights = vec![
        format!("📊 Activity Type: {}", type_info.name),
        format!("ℹ️ {}", type_info.description),
    ];
    let mut recommendations = Vec::new();

    let mut ranked: Vec<&Comparison> = comparisons.iter().collect();
    ranked.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    let total_visitors: u64 = comparisons.iter().map(|c| c.visitors).sum();

    match kind {
        ActivityType::Ab => match (comparisons.first(), ranked.first()) {
            (Some(_), _) if comparisons.len() == 1 => {
                insights.push(
                    "⚠️ Only one experience found. A/B tests typically have 2+ experiences to compare."
                        .into(),
                );
                recommendations.push("Add additional experiences (variants) to test against the control.".into());
            }
            (Some(control), Some(winner)) => {
                if winner.experience_id != control.experience_id {
                    insights.push(format!(
                        "🏆 Winner: {} with {} conversion rate ({} lift)",
                        winner.name,
                        percent(winner.rate),
                        percent(winner.lift.unwrap_or_default()),
                    ));
                    if total_visitors >= AP_TRAFFIC {
                        recommendations.push(format!(
                            "Strong results with {total_visitors} visitors. Consider implementing {} site-wide.",
                            winner.name
                        ));
                    } else if total_visitors >= LOW_TRAFFIC {
                        recommendations.push(format!(
                            "Promising trend with {total_visitors} visitors. Continue testing to confirm statistical significance."
                        ));
                    }
                } else {
                    insights.push(format!(
                        "The control ({}) is currently the best performer.",
                        control.name
                    ));
                    insights.push("Variants are not outperforming the control.".into());
                    recommendations.push("Consider testing more aggressive variations or different hypotheses.".into());
                }

                let mean = total_visitors as f64 / comparisons.len() as f64;
                let uneven = comparisons
                    .iter()
                    .any(|c| (c.visitors as f64 - mean).abs() > mean * IMBALANCE_RATIO);
                if uneven && total_visitors > LOW_TRAFFIC {
                    insights.push("⚠️ Traffic split is uneven across experiences.".into());
                    recommendations.push(
                        "Verify traffic allocation settings (should typically be 50/50 or evenly split).".into(),
                    );
                }
            }
            _ => {}
        },
        ActivityType::Xt => {
            insights.push(format!("📌 Note: {}", type_info.comparison_note));
            if comparisons.len() == 1 {
                insights.push(
                    "⚠️ Only one experience found. XT activities typically target multiple audience segments."
                        .into(),
                );
                recommendations.push(
                    "Add experiences targeted to different audience segments to maximize personalization.".into(),
                );
            } else {
                insights.push(format!("{} targeted experiences are active.", comparisons.len()));
                for c in comparisons.iter().filter(|c| c.visitors > 0) {
                    insights.push(format!(
                        "  • {}: {} conversion rate ({} visitors)",
                        c.name,
                        percent(c.rate),
                        c.visitors
                    ));
                }
                recommendations.push(
                    "For XT activities, focus on whether each targeted audience is converting, not just lift comparisons."
                        .into(),
                );
                if comparisons.iter().any(|c| c.visitors == 0) {
                    recommendations.push(
                        "Some experiences have no visitors. Verify audience targeting rules are configured correctly."
                            .into(),
                    );
                }
            }
        }
        ActivityType::Abt => {
            insights.push(format!("🤖 {}", type_info.comparison_note));
            insights.push(format!("The algorithm is testing {} experiences.", comparisons.len()));
            if total_visitors < AP_TRAFFIC {
                insights.push(
                    "⚠️ AP activities require substantial traffic (1000+ visitors) for the algorithm to learn effectively."
                        .into(),
                );
                recommendations.push(
                    "Allow more time for the machine learning algorithm to optimize performance.".into(),
                );
            } else {
                insights.push(format!(
                    "✓ Sufficient traffic ({total_visitors} visitors) for algorithm optimization."
                ));
                insights.push("Top performing experiences:".into());
                for (rank, c) in ranked.iter().take(3).enumerate() {
                    insights.push(format!(
                        "  {}. {}: {} ({} visitors)",
                        rank + 1,
                        c.name,
                        percent(c.rate),
                        c.visitors
                    ));
                }
            }
        }
    }

    if total_visitors < LOW_TRAFFIC {
        insights.push(format!(
            "⚠️ Low traffic detected: Only {total_visitors} total visitors. Results may not be statistically significant."
        ));
        recommendations.push("Continue running the activity to gather more data before making decisions.".into());
    }

    if !comparisons.iter().any(|c| c.conversions > 0) {
        insights.push("⚠️ No conversions recorded yet for any experience.".into());
        recommendations.push("Verify that conversion tracking is properly configured.".into());
        recommendations.push(
            "Check that visitors are reaching the conversion goal (e.g., checkout, form submission).".into(),
        );
    }

    match activity.state.as_deref() {
        Some("saved") => {
            insights.push("⚠️ Activity Status: SAVED (not running)".into());
            recommendations.push("Activate the activity to start collecting meaningful data.".into());
        }
        Some("deactivated") => {
            insights.push("⚠️ Activity Status: DEACTIVATED".into());
            recommendations.push("Activity is deactivated. No new data is being collected.".into());
        }
        Some("approved") => insights.push("✓ Activity Status: APPROVED (running)".into()),
        _ => {}
    }

    (insights, recommendations)
}

fn failure(error: impl Into<String>) -> Value {
    json!({ "success": false, "error": error.into() })
}

/// Conversion rate in percent; zero when nobody entered.
fn conversion_rate(tally: Tally) -> f64 {
    if tally.entries == 0 {
        return 0.0;
    }
    tally.conversions as f64 / tally.entries as f64 * 100.0
}

fn lift(control: f64, variant: f64) -> f64 {
    if control == 0.0 {
        return 0.0;
    }
    (variant - control) / control * 100.0
}

fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// "Experience A", "Experience B", ...
fn experience_label(idx: usize) -> String {
    let letter = u8::try_from(idx)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map_or('?', char::from);
    format!("Experience {letter}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_and_lift() {
        assert_eq!(conversion_rate(Tally { entries: 0, conversions: 3 }), 0.0);
        assert_eq!(percent(conversion_rate(Tally { entries: 200, conversions: 10 })), "5.00%");
        assert_eq!(percent(lift(5.0, 6.0)), "20.00%");
        assert_eq!(lift(0.0, 6.0), 0.0);
    }

    #[test]
    fn unnamed_experiences_get_letters() {
        assert_eq!(experience_label(0), "Experience A");
        assert_eq!(experience_label(2), "Experience C");
    }

    #[test]
    fn only_ab_variants_carry_lift() {
        let report: PerformanceReport = serde_json::from_value(json!({
            "activity": { "experiences": [
                { "name": "Control", "experienceLocalId": 0 },
                { "experienceLocalId": 1 },
            ]},
            "report": { "statistics": {
                "totals": {},
                "experiences": [
                    { "totals": { "visitor": { "totals": { "entries": 100, "conversions": 5 } } } },
                    { "totals": { "visitor": { "totals": { "entries": 100, "conversions": 10 } } } },
                ],
            }},
        }))
        .unwrap();

        let ab = compare(&report, ActivityType::Ab, None);
        assert!(ab[0].is_control);
        assert_eq!(ab[1].name, "Experience B");
        assert_eq!(ab[1].to_json()["performance"]["lift"], "100.00%");

        let xt = compare(&report, ActivityType::Xt, None);
        assert!(!xt[0].is_control);
        assert!(xt[1].to_json().get("performance").is_none());
    }
}
