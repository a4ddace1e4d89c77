use std::collections::HashMap;

use target_mcp_server::config::{ConfigError, MetricType, ServerConfig, DEFAULT_API_BASE_URL};

fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    ServerConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn empty_environment_yields_documented_defaults() {
    let config = config_from(&[]).unwrap();

    assert!(!config.credentials.is_complete());
    assert_eq!(config.workspace_id, None);
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.templates_dir.to_str(), Some("templates"));
    assert_eq!(config.defaults.mboxes, vec!["target-global-mbox"]);
    assert_eq!(config.defaults.priority, 5);
    assert_eq!(config.defaults.visitor_percentage, 100);
    assert_eq!(config.defaults.metric_type, MetricType::Engagement);
    assert!(!config.defaults.a4t.is_enabled());
}

#[test]
fn overrides_are_read_and_trimmed() {
    let config = config_from(&[
        ("TARGET_TENANT_ID", "acme"),
        ("TARGET_API_KEY", " key "),
        ("TARGET_ACCESS_TOKEN", "token"),
        ("TARGET_WORKSPACE_ID", "ws-7"),
        ("TARGET_DEFAULT_MBOXES", "hero, footer"),
        ("TARGET_DEFAULT_PRIORITY", "10"),
        ("TARGET_DEFAULT_METRIC_TYPE", "conversion"),
        ("TARGET_A4T_DATA_COLLECTION_HOST", "acme.sc.omtrdc.net"),
        ("TARGET_A4T_REPORT_SUITES", "prod,dev"),
    ])
    .unwrap();

    assert!(config.credentials.is_complete());
    assert_eq!(config.credentials.api_key, "key");
    assert_eq!(config.workspace_id.as_deref(), Some("ws-7"));
    assert_eq!(config.defaults.mboxes, vec!["hero", "footer"]);
    assert_eq!(config.defaults.priority, 10);
    assert_eq!(config.defaults.metric_type, MetricType::Conversion);
    assert!(config.defaults.a4t.is_enabled());
    assert_eq!(config.defaults.a4t.report_suites, vec!["prod", "dev"]);
}

#[test]
fn bad_integer_is_a_config_error() {
    let err = config_from(&[("TARGET_DEFAULT_PRIORITY", "high")]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidInteger { var: "TARGET_DEFAULT_PRIORITY", .. }));
}

#[test]
fn unknown_metric_type_is_a_config_error() {
    let err = config_from(&[("TARGET_DEFAULT_METRIC_TYPE", "revenue")]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMetricType(_)));
}

#[test]
fn debug_output_masks_secrets() {
    let config = config_from(&[
        ("TARGET_API_KEY", "abcdef123456"),
        ("TARGET_ACCESS_TOKEN", "very-secret-token"),
    ])
    .unwrap();
    let debug = format!("{:?}", config.credentials);
    assert!(!debug.contains("very-secret"));
    assert!(!debug.contains("abcdef"));
}
