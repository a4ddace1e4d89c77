use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;

/// Host serving the Adobe Target Admin API.
pub const DEFAULT_API_BASE_URL: &str = "https://mc.adobe.io";

const DEFAULT_TEMPLATES_DIR: &str = "templates";
/// Mbox used when no default mboxes are configured.
pub const DEFAULT_MBOX: &str = "target-global-mbox";
const DEFAULT_PRIORITY: i64 = 5;
const DEFAULT_VISITOR_PERCENTAGE: i64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be an integer, got {value:?}")]
    InvalidInteger { var: &'static str, value: String },
    #[error("TARGET_DEFAULT_METRIC_TYPE must be \"engagement\" or \"conversion\", got {0:?}")]
    InvalidMetricType(String),
}

/// Credentials for the Admin API. All three are required for any request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub tenant_id: String,
    pub api_key: String,
    pub access_token: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.tenant_id.is_empty() && !self.api_key.is_empty() && !self.access_token.is_empty()
    }
}

// Keep secrets out of Debug output.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("api_key", &mask_secret(&self.api_key))
            .field("access_token", &mask_secret(&self.access_token))
            .finish()
    }
}

/// How success metrics are counted when the caller does not say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Engagement,
    Conversion,
}

impl FromStr for MetricType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "engagement" => Ok(Self::Engagement),
            "conversion" => Ok(Self::Conversion),
            other => Err(ConfigError::InvalidMetricType(other.to_string())),
        }
    }
}

/// Analytics for Target defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct A4tDefaults {
    pub data_collection_host: String,
    pub company_name: String,
    pub report_suites: Vec<String>,
}

impl A4tDefaults {
    pub fn is_enabled(&self) -> bool {
        !self.data_collection_host.is_empty()
    }
}

/// Values filled into activities when the caller leaves them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDefaults {
    pub mboxes: Vec<String>,
    pub priority: i64,
    pub visitor_percentage: i64,
    pub metric_type: MetricType,
    pub engagement_metric: String,
    pub metric_action: String,
    pub success_mbox: String,
    pub success_event: String,
    pub a4t: A4tDefaults,
}

impl Default for ActivityDefaults {
    fn default() -> Self {
        Self {
            mboxes: vec![DEFAULT_MBOX.to_string()],
            priority: DEFAULT_PRIORITY,
            visitor_percentage: DEFAULT_VISITOR_PERCENTAGE,
            metric_type: MetricType::Engagement,
            engagement_metric: "page_count".into(),
            metric_action: "count_once".into(),
            success_mbox: "orderConfirmPage".into(),
            success_event: "mbox_shown".into(),
            a4t: A4tDefaults::default(),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub credentials: Credentials,
    pub workspace_id: Option<String>,
    pub api_base_url: String,
    pub templates_dir: PathBuf,
    pub defaults: ActivityDefaults,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            workspace_id: None,
            api_base_url: DEFAULT_API_BASE_URL.into(),
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            defaults: ActivityDefaults::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// - `TARGET_TENANT_ID`, `TARGET_API_KEY`, `TARGET_ACCESS_TOKEN`: API credentials.
    ///   Missing credentials are reported per request, not here.
    /// - `TARGET_WORKSPACE_ID` (optional): workspace applied to new activities and offers
    /// - `TARGET_API_BASE_URL` (optional, default `https://mc.adobe.io`)
    /// - `TARGET_TEMPLATES_DIR` (optional, default `templates`)
    /// - `TARGET_DEFAULT_*` and `TARGET_A4T_*`: activity defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let text_or = |key: &str, fallback: &str| match lookup(key) {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => fallback.to_string(),
        };
        let integer = |key: &'static str, fallback: i64| -> Result<i64, ConfigError> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => {
                    v.trim().parse().map_err(|_| ConfigError::InvalidInteger { var: key, value: v })
                }
                _ => Ok(fallback),
            }
        };

        let mboxes = lookup("TARGET_DEFAULT_MBOXES")
            .map(|v| split_list(&v))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_MBOX.to_string()]);

        let defaults = ActivityDefaults {
            mboxes,
            priority: integer("TARGET_DEFAULT_PRIORITY", DEFAULT_PRIORITY)?,
            visitor_percentage: integer(
                "TARGET_DEFAULT_VISITOR_PERCENTAGE",
                DEFAULT_VISITOR_PERCENTAGE,
            )?,
            metric_type: text_or("TARGET_DEFAULT_METRIC_TYPE", "engagement").parse()?,
            engagement_metric: text_or("TARGET_DEFAULT_ENGAGEMENT_METRIC", "page_count"),
            metric_action: text_or("TARGET_DEFAULT_METRIC_ACTION", "count_once"),
            success_mbox: text_or("TARGET_DEFAULT_SUCCESS_MBOX", "orderConfirmPage"),
            success_event: text_or("TARGET_DEFAULT_SUCCESS_EVENT", "mbox_shown"),
            a4t: A4tDefaults {
                data_collection_host: text("TARGET_A4T_DATA_COLLECTION_HOST"),
                company_name: text("TARGET_A4T_COMPANY_NAME"),
                report_suites: lookup("TARGET_A4T_REPORT_SUITES")
                    .map(|v| split_list(&v))
                    .unwrap_or_default(),
            },
        };

        let workspace_id = Some(text("TARGET_WORKSPACE_ID")).filter(|w| !w.is_empty());

        Ok(Self {
            credentials: Credentials {
                tenant_id: text("TARGET_TENANT_ID"),
                api_key: text("TARGET_API_KEY"),
                access_token: text("TARGET_ACCESS_TOKEN"),
            },
            workspace_id,
            api_base_url: text_or("TARGET_API_BASE_URL", DEFAULT_API_BASE_URL),
            templates_dir: PathBuf::from(text_or("TARGET_TEMPLATES_DIR", DEFAULT_TEMPLATES_DIR)),
            defaults,
        })
    }

    /// Log a summary of the loaded configuration with secrets masked.
    pub fn log_summary(&self) {
        let creds = &self.credentials;
        info!(
            tenant_id = %or_not_set(&creds.tenant_id),
            api_key = %mask_secret(&creds.api_key),
            access_token = %mask_secret(&creds.access_token),
            workspace = %self.workspace_id.as_deref().unwrap_or("ALL WORKSPACES"),
            "configuration loaded"
        );
        info!(
            mboxes = %self.defaults.mboxes.join(", "),
            priority = self.defaults.priority,
            "activity defaults"
        );
        if self.defaults.a4t.is_enabled() {
            info!(report_suites = %self.defaults.a4t.report_suites.join(", "), "A4T enabled");
        }
    }
}

/// `***` followed by the last four characters, or `NOT SET`.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "NOT SET".into();
    }
    let chars: Vec<char> = secret.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("***{tail}")
}

fn or_not_set(value: &str) -> &str {
    if value.is_empty() {
        "NOT SET"
    } else {
        value
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask_secret("abcdef123456"), "***3456");
        assert_eq!(mask_secret("xy"), "***xy");
        assert_eq!(mask_secret(""), "NOT SET");
    }

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
    }
}
