//! Composite workflow: turn approved page modifications into a draft
//! experience-targeting activity.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{object_schema, whole, ToolKind};
use crate::config::DEFAULT_MBOX;
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::gateway::{ApiVersion, TargetRequest};
use crate::registry::ToolSpec;

/// Tag selectors that match far more than the author usually intends.
const BROAD_SELECTORS: [&str; 8] = ["div", "span", "button", "a", "p", "h1", "h2", "h3"];

const DESCRIPTION: &str = "Create a Target XT activity from approved modifications. The \
JavaScript is wrapped in a <script> offer and the activity is created in DRAFT (saved) state \
on the default mbox.

Before calling this tool:
1. Ask whether the experience needs specific links or image assets; otherwise use clearly \
documented placeholders.
2. Preview the code on the live page on mobile and desktop viewports and get approval.
3. Ask whether to target a specific audience; use listAudiences and pass the chosen ids as \
audienceIds. Without audienceIds the activity targets All Visitors.

Code rules for the modifications parameter:
- ES5 only: var, function() {}, string concatenation. No template literals or arrow functions.
- Wrap code in an IIFE, check that elements exist, keep it idempotent.
- Use specific selectors (ids, attributes, classes). Never bare tags like 'div' or 'button'.
- No timers, polling, document.write or external libraries.
- Prefix new classes with \"at-\" and inject CSS through a <style> block with media queries.
- Push dataLayer conversion events: {event: 'target_conversion', at_activity, at_experience}.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationsArgs {
    pub name: String,
    pub url: String,
    pub modifications: String,
    #[serde(default, deserialize_with = "whole::option_i64")]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "whole::option_vec_u64")]
    pub audience_ids: Option<Vec<u64>>,
}

pub(crate) fn tools() -> Vec<ToolSpec> {
    vec![ToolSpec::new(
        ToolKind::CreateActivityFromModifications,
        DESCRIPTION,
        object_schema(
            json!({
                "name": { "type": "string", "description": "Activity name" },
                "url": { "type": "string", "description": "URL where the activity should run" },
                "modifications": { "type": "string", "description": "JavaScript code for the modifications" },
                "priority": {
                    "type": "integer",
                    "description": "Activity priority (0-999), defaults to the configured priority",
                },
                "audienceIds": {
                    "type": "array",
                    "items": { "type": "integer" },
                    "description": "Audience IDs to target. Omit to target All Visitors. Get ids from listAudiences.",
                },
            }),
            &["name", "url", "modifications"],
        ),
    )]
}

/// Warnings for selector patterns that tend to misfire.
pub fn lint_modifications(code: &str) -> Vec<String> {
    let mut warnings: Vec<String> = BROAD_SELECTORS
        .iter()
        .filter(|tag| {
            code.contains(&format!("querySelector('{tag}')"))
                || code.contains(&format!("querySelector(\"{tag}\")"))
        })
        .map(|tag| format!("WARNING: Very broad selector detected: '{tag}' - this may affect multiple elements"))
        .collect();

    if code.contains("querySelectorAll") && !code.contains("forEach") && !code.contains("[0]") {
        warnings.push(
            "WARNING: querySelectorAll used without iteration - this may not modify elements as expected".into(),
        );
    }
    warnings
}

pub async fn create_activity(args: ModificationsArgs, ctx: &ExecutionContext) -> Result<Value, ToolError> {
    url::Url::parse(&args.url)
        .map_err(|e| ToolError::InvalidInput(format!("Invalid URL {:?}: {e}", args.url)))?;

    let warnings = lint_modifications(&args.modifications);
    if !warnings.is_empty() {
        warn!(activity = %args.name, ?warnings, "modification validation warnings");
    }

    let offer_name = format!("{} - Modifications", args.name);
    let offer = ctx
        .send(
            TargetRequest::post(
                "/target/offers/content",
                json!({
                    "name": offer_name,
                    "content": format!("<script>{}</script>", args.modifications),
                }),
            )
            .version(ApiVersion::V2),
        )
        .await?;
    let offer_id = offer.get("id").cloned().unwrap_or(Value::Null);
    info!(offer_id = %offer_id, "modification offer created");

    // The offer is left in place if this call fails.
    let audience_ids = args.audience_ids.unwrap_or_default();
    let activity = xt_activity(&args.name, args.priority, &audience_ids, &offer_id, ctx);
    let mut result = ctx
        .send(TargetRequest::post("/target/activities/xt", activity).version(ApiVersion::V3))
        .await?;

    let activity_id = result.get("id").cloned().unwrap_or(Value::Null);
    let audience_info = if audience_ids.is_empty() {
        "Audience targeting: All Visitors (no specific audience assigned)".to_string()
    } else {
        let ids: Vec<String> = audience_ids.iter().map(u64::to_string).collect();
        format!(
            "Audience targeting: {} audience(s) assigned (IDs: {})",
            audience_ids.len(),
            ids.join(", ")
        )
    };

    let mut instructions = Vec::new();
    if !warnings.is_empty() {
        instructions.push("VALIDATION WARNINGS DETECTED - Review before activating:".into());
        instructions.extend(warnings.iter().map(|w| format!("  - {w}")));
        instructions.push(String::new());
    }
    instructions.extend([
        format!("Activity \"{}\" created successfully in DRAFT mode", args.name),
        format!("Offer ID: {offer_id}"),
        format!("Activity ID: {activity_id}"),
        audience_info,
        "Next steps:".into(),
        "1. Review the activity in Adobe Target UI".into(),
        "2. Verify audience targeting is correct".into(),
        format!("3. When ready, use updateActivityState with ID {activity_id} and state \"approved\" to activate"),
    ]);

    if let Value::Object(map) = &mut result {
        map.insert("offerCreated".into(), json!({ "id": offer_id, "name": offer_name }));
        map.insert("instructions".into(), json!(instructions));
        if !warnings.is_empty() {
            map.insert("validationWarnings".into(), json!(warnings));
        }
    }
    Ok(result)
}

fn xt_activity(
    name: &str,
    priority: Option<i64>,
    audience_ids: &[u64],
    offer_id: &Value,
    ctx: &ExecutionContext,
) -> Value {
    let defaults = &ctx.config.defaults;
    let mbox = defaults.mboxes.first().map_or(DEFAULT_MBOX, String::as_str);
    let mut activity = json!({
        "name": name,
        "state": "saved",
        "priority": priority.unwrap_or(defaults.priority),
        "locations": {
            "mboxes": [{
                "name": mbox,
                "experiences": [{
                    "name": "Experience A",
                    "audienceIds": audience_ids,
                    "visitorPercentage": 100,
                    "options": [{ "offerId": offer_id }],
                }],
            }],
        },
    });
    if let Some(workspace) = &ctx.config.workspace_id {
        activity["workspace"] = json!(workspace);
    }
    activity
}
