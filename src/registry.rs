//! Static tool registry.
//!
//! Every tool category contributes a fixed list of [`ToolSpec`]s. The
//! registry is built once at startup and is read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::handlers::{self, ToolKind};
use crate::schema;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate tool name {name:?} (registered again by category {category})")]
    DuplicateTool { name: String, category: ToolCategory },
    #[error("tool {name:?} has an invalid descriptor: {reason}")]
    InvalidDescriptor { name: String, reason: String },
}

/// Tool categories, mirroring the Admin API's resource groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCategory {
    Activities,
    Atjs,
    Audiences,
    Mboxes,
    Offers,
    Properties,
    Reports,
    ResponseTokens,
    Revisions,
    Custom,
    Templates,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 11] = [
        ToolCategory::Activities,
        ToolCategory::Atjs,
        ToolCategory::Audiences,
        ToolCategory::Mboxes,
        ToolCategory::Offers,
        ToolCategory::Properties,
        ToolCategory::Reports,
        ToolCategory::ResponseTokens,
        ToolCategory::Revisions,
        ToolCategory::Custom,
        ToolCategory::Templates,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activities => "activities",
            Self::Atjs => "atjs",
            Self::Audiences => "audiences",
            Self::Mboxes => "mboxes",
            Self::Offers => "offers",
            Self::Properties => "properties",
            Self::Reports => "reports",
            Self::ResponseTokens => "response-tokens",
            Self::Revisions => "revisions",
            Self::Custom => "custom",
            Self::Templates => "templates",
        }
    }

    /// Tools contributed by this category.
    pub fn tools(self) -> Vec<ToolSpec> {
        match self {
            Self::Activities => handlers::activities::tools(),
            Self::Atjs => handlers::atjs::tools(),
            Self::Audiences => handlers::audiences::tools(),
            Self::Mboxes => handlers::mboxes::tools(),
            Self::Offers => handlers::offers::tools(),
            Self::Properties => handlers::properties::tools(),
            Self::Reports => handlers::reports::tools(),
            Self::ResponseTokens => handlers::response_tokens::tools(),
            Self::Revisions => handlers::revisions::tools(),
            Self::Custom => handlers::custom::tools(),
            Self::Templates => handlers::templates::tools(),
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool metadata advertised through `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// A descriptor paired with the handler variant that serves it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub kind: ToolKind,
    pub descriptor: ToolDescriptor,
}

impl ToolSpec {
    pub fn new(kind: ToolKind, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            kind,
            descriptor: ToolDescriptor {
                name: kind.name().to_string(),
                description: description.into(),
                input_schema,
            },
        }
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidDescriptor {
            name: self.descriptor.name.clone(),
            reason,
        };

        if self.descriptor.description.trim().is_empty() {
            return Err(invalid("empty description".into()));
        }
        if self.descriptor.input_schema.get("type").and_then(Value::as_str) != Some("object") {
            return Err(invalid("input schema must have type \"object\"".into()));
        }
        schema::compile(&self.descriptor.input_schema).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

/// Ordered tool descriptors plus a name-keyed handler lookup.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    handlers: HashMap<String, ToolKind>,
}

impl ToolRegistry {
    /// Build the registry from every known category.
    pub fn load() -> Result<Self, RegistryError> {
        Self::from_categories(ToolCategory::ALL.into_iter().map(|c| (c, c.tools())))
    }

    /// Register tools category by category.
    ///
    /// A category with an invalid descriptor is logged and skipped as a
    /// whole. A name registered twice aborts loading.
    pub fn from_categories<I>(categories: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (ToolCategory, Vec<ToolSpec>)>,
    {
        let mut registry = Self::default();

        for (category, specs) in categories {
            if let Err(e) = specs.iter().try_for_each(ToolSpec::validate) {
                warn!(%category, error = %e, "skipping tool category");
                continue;
            }

            for spec in specs {
                if registry.handlers.contains_key(&spec.descriptor.name) {
                    return Err(RegistryError::DuplicateTool {
                        name: spec.descriptor.name,
                        category,
                    });
                }
                registry.handlers.insert(spec.descriptor.name.clone(), spec.kind);
                registry.descriptors.push(spec.descriptor);
            }
        }

        info!(tools = registry.descriptors.len(), "tool registry loaded");
        Ok(registry)
    }

    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn lookup(&self, name: &str) -> Option<ToolKind> {
        self.handlers.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
