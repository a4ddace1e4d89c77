//! Offer templates exposed as `template://{html|json}/{name}` resources.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::protocol::{Resource, ResourceContents};

const MIME_TYPE: &str = "application/json";

const FALLBACK_HTML: &[&str] = &[
    "accordion",
    "carousel",
    "countdown-timer",
    "cta-button",
    "form-field",
    "hero-banner",
    "modal",
    "notification-banner",
    "sticky-header",
    "tabs",
];

const FALLBACK_JSON: &[&str] = &[
    "ab-test-variant",
    "feature-flags",
    "form-config",
    "hero-config",
    "navigation-menu",
    "personalization-content",
    "pricing-data",
    "product-recommendations",
    "testimonials",
];

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Invalid template URI: {0}")]
    InvalidUri(String),
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Html,
    Json,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::Html, TemplateKind::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Json => "JSON",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template names discovered once at startup.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    root: PathBuf,
    html: Vec<String>,
    json: Vec<String>,
}

impl TemplateCatalog {
    /// Scan `root/html` and `root/json` for `*.json` templates.
    ///
    /// A missing directory contributes no templates. Any other I/O error
    /// switches the whole catalog to the built-in template names.
    pub fn load(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let scanned = scan(&root, TemplateKind::Html)
            .and_then(|html| scan(&root, TemplateKind::Json).map(|json| (html, json)));

        let (html, json) = match scanned {
            Ok(found) => found,
            Err(e) => {
                warn!(dir = %root.display(), error = %e, "cannot list templates, using built-in names");
                (to_owned(FALLBACK_HTML), to_owned(FALLBACK_JSON))
            }
        };

        info!(html = html.len(), json = json.len(), "template catalog loaded");
        Self { root, html, json }
    }

    pub fn names(&self, kind: TemplateKind) -> &[String] {
        match kind {
            TemplateKind::Html => &self.html,
            TemplateKind::Json => &self.json,
        }
    }

    pub fn len(&self) -> usize {
        self.html.len() + self.json.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resources(&self) -> Vec<Resource> {
        TemplateKind::ALL
            .iter()
            .flat_map(|&kind| {
                self.names(kind).iter().map(move |name| Resource {
                    uri: format!("template://{kind}/{name}"),
                    name: format!("{} Template: {name}", kind.label()),
                    description: format!("Adobe Target {} offer template", kind.label()),
                    mime_type: MIME_TYPE.into(),
                })
            })
            .collect()
    }

    /// Read the template addressed by `uri`.
    pub fn read(&self, uri: &str) -> Result<ResourceContents, TemplateError> {
        let (kind, name) = parse_uri(uri).ok_or_else(|| TemplateError::InvalidUri(uri.into()))?;
        let path = self.root.join(kind.as_str()).join(format!("{name}.json"));

        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TemplateError::NotFound(uri.into()),
            _ => TemplateError::Io(e),
        })?;

        Ok(ResourceContents {
            uri: uri.into(),
            mime_type: MIME_TYPE.into(),
            text,
        })
    }
}

/// Split `template://{kind}/{name}`, rejecting names that could leave the kind directory.
pub fn parse_uri(uri: &str) -> Option<(TemplateKind, &str)> {
    let rest = uri.strip_prefix("template://")?;
    let (kind, name) = rest.split_once('/')?;
    let kind = TemplateKind::parse(kind)?;
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return None;
    }
    Some((kind, name))
}

fn scan(root: &Path, kind: TemplateKind) -> io::Result<Vec<String>> {
    let dir = root.join(kind.as_str());
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if let Some(stem) = file_name.strip_suffix(".json") {
            names.push(stem.to_string());
        }
    }

    // Sort for deterministic resource listings
    names.sort();
    Ok(names)
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
