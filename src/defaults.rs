//! Fills gaps in caller-supplied activities from configured defaults.
//!
//! The caller is authoritative: a field that is present (including `0`,
//! `false` or `""`) is never replaced. Only absent fields, or fields holding
//! JSON `null`, count as missing. Lists of mboxes are also refilled when
//! empty. Applying the defaults twice gives the same result as applying them
//! once.

use serde_json::{json, Map, Value};

use crate::config::{ActivityDefaults, MetricType, ServerConfig};

const PRIMARY_GOAL: &str = "Primary Goal";

/// Apply every activity default, returning the merged activity.
pub fn apply_activity_defaults(mut activity: Map<String, Value>, config: &ServerConfig) -> Map<String, Value> {
    let defaults = &config.defaults;

    if is_missing(activity.get("priority")) {
        activity.insert("priority".into(), json!(defaults.priority));
    }

    if let Some(workspace) = &config.workspace_id {
        if is_missing(activity.get("workspace")) {
            activity.insert("workspace".into(), json!(workspace));
        }
    }

    apply_location_defaults(&mut activity, defaults);

    if let Some(Value::Object(analytics)) = activity.get_mut("analytics") {
        apply_analytics_defaults(analytics, defaults);
    }

    match activity.get_mut("metrics") {
        Some(Value::Array(metrics)) => {
            for metric in metrics.iter_mut() {
                if let Value::Object(metric) = metric {
                    apply_metric_defaults(metric, defaults);
                }
            }
        }
        Some(value) if !value.is_null() => {}
        _ => {
            activity.insert(
                "metrics".into(),
                json!([defaults.metric(0, PRIMARY_GOAL)]),
            );
        }
    }

    if let Some(Value::Object(constraint)) = activity.get_mut("entryConstraint") {
        if is_missing(constraint.get("visitorPercentage")) {
            constraint.insert("visitorPercentage".into(), json!(defaults.visitor_percentage));
        }
        if is_empty_list(constraint.get("mboxes")) {
            constraint.insert("mboxes".into(), Value::Array(defaults.constraint_mboxes()));
        }
    }

    activity
}

fn apply_location_defaults(activity: &mut Map<String, Value>, defaults: &ActivityDefaults) {
    let locations = activity
        .entry("locations")
        .and_modify(|v| {
            if v.is_null() {
                *v = Value::Object(Map::new());
            }
        })
        .or_insert_with(|| Value::Object(Map::new()));

    if let Value::Object(locations) = locations {
        if is_empty_list(locations.get("mboxes")) {
            locations.insert("mboxes".into(), Value::Array(defaults.locations(0)));
        }
    }
}

fn apply_analytics_defaults(analytics: &mut Map<String, Value>, defaults: &ActivityDefaults) {
    let a4t = &defaults.a4t;
    if !a4t.is_enabled() {
        return;
    }
    if is_missing(analytics.get("dataCollectionHost")) {
        analytics.insert("dataCollectionHost".into(), json!(a4t.data_collection_host));
    }
    if is_missing(analytics.get("reportSuites")) && !a4t.report_suites.is_empty() {
        analytics.insert("reportSuites".into(), defaults.report_suites());
    }
}

fn apply_metric_defaults(metric: &mut Map<String, Value>, defaults: &ActivityDefaults) {
    if is_missing(metric.get("conversion")) {
        metric.insert(
            "conversion".into(),
            json!(defaults.metric_type == MetricType::Conversion),
        );
    }

    if defaults.metric_type == MetricType::Engagement && is_missing(metric.get("engagement")) {
        metric.insert("engagement".into(), json!(defaults.engagement_metric));
    }

    match metric.get_mut("action") {
        Some(Value::Object(action)) => {
            if is_missing(action.get("type")) {
                action.insert("type".into(), json!(defaults.metric_action));
            }
        }
        Some(value) if !value.is_null() => {}
        _ => {
            metric.insert("action".into(), json!({ "type": defaults.metric_action }));
        }
    }

    let is_conversion = metric.get("conversion").and_then(Value::as_bool).unwrap_or(false);
    if !is_conversion {
        return;
    }
    if let Some(Value::Array(mboxes)) = metric.get_mut("mboxes") {
        for mbox in mboxes.iter_mut() {
            if let Value::Object(mbox) = mbox {
                fill(mbox, "name", json!(defaults.success_mbox));
                fill(mbox, "successEvent", json!(defaults.success_event));
                fill(mbox, "audienceIds", json!([]));
            }
        }
    }
}

impl ActivityDefaults {
    /// One mbox location per default mbox, numbered from `starting_local_id`.
    pub fn locations(&self, starting_local_id: usize) -> Vec<Value> {
        self.mboxes
            .iter()
            .enumerate()
            .map(|(index, name)| {
                json!({
                    "locationLocalId": starting_local_id + index,
                    "name": name,
                    "audienceIds": [],
                })
            })
            .collect()
    }

    /// A success metric built purely from defaults.
    pub fn metric(&self, metric_local_id: u64, name: &str) -> Value {
        let mut metric = json!({
            "metricLocalId": metric_local_id,
            "name": name,
            "conversion": self.metric_type == MetricType::Conversion,
            "action": { "type": self.metric_action },
        });
        match self.metric_type {
            MetricType::Engagement => {
                metric["engagement"] = json!(self.engagement_metric);
            }
            MetricType::Conversion => {
                metric["mboxes"] = json!([{
                    "name": self.success_mbox,
                    "successEvent": self.success_event,
                    "audienceIds": [],
                }]);
            }
        }
        metric
    }

    fn report_suites(&self) -> Value {
        json!([{
            "companyName": self.a4t.company_name,
            "reportSuites": self.a4t.report_suites,
        }])
    }

    fn constraint_mboxes(&self) -> Vec<Value> {
        self.mboxes
            .iter()
            .map(|name| json!({ "name": name, "audienceIds": [] }))
            .collect()
    }
}

fn fill(map: &mut Map<String, Value>, key: &str, value: Value) {
    if is_missing(map.get(key)) {
        map.insert(key.to_string(), value);
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn is_empty_list(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
