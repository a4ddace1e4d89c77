use serde_json::{json, Value};

use super::{object_schema, ToolKind};
use crate::context::ExecutionContext;
use crate::error::ToolError;
use crate::registry::ToolSpec;
use crate::templates::TemplateKind;

pub(crate) fn tools() -> Vec<ToolSpec> {
    vec![ToolSpec::new(
        ToolKind::ListTemplates,
        "List the available offer templates (HTML and JSON). Templates are exposed as MCP \
         resources with URIs like template://html/carousel or template://json/feature-flags; \
         read one with resources/read. HTML templates suit DOM modifications, JSON templates \
         suit SPAs and headless experiences.",
        object_schema(json!({}), &[]),
    )]
}

pub async fn list(ctx: &ExecutionContext) -> Result<Value, ToolError> {
    let catalog = &ctx.templates;
    let mut available = serde_json::Map::new();
    for kind in TemplateKind::ALL {
        available.insert(kind.as_str().into(), json!(catalog.names(kind)));
    }
    let example = TemplateKind::ALL
        .iter()
        .find_map(|&kind| catalog.names(kind).first().map(|name| format!("template://{kind}/{name}")));

    Ok(json!({
        "message": "Templates are available as MCP resources.",
        "templates": available,
        "totalTemplates": catalog.len(),
        "htmlTemplates": catalog.names(TemplateKind::Html).len(),
        "jsonTemplates": catalog.names(TemplateKind::Json).len(),
        "instructions": [
            "Use resources/list to see every template URI.",
            "Use resources/read with a template URI to fetch its content.",
            "URIs follow template://<html|json>/<name>.",
        ],
        "example": example,
    }))
}
