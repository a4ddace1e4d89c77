use serde_json::json;

use target_mcp_server::handlers::ToolKind;
use target_mcp_server::registry::{RegistryError, ToolCategory, ToolRegistry, ToolSpec};

fn spec(kind: ToolKind) -> ToolSpec {
    ToolSpec::new(kind, "test tool", json!({ "type": "object", "properties": {} }))
}

#[test]
fn full_registry_loads_in_category_order() {
    let registry = ToolRegistry::load().unwrap();
    assert_eq!(registry.len(), 28);
    assert_eq!(registry.descriptors()[0].name, "listActivities");
    assert_eq!(registry.descriptors().last().unwrap().name, "listTemplates");
    assert_eq!(registry.lookup("getXTOrdersReport"), Some(ToolKind::GetXtOrdersReport));
    assert_eq!(registry.lookup("nope"), None);
}

#[test]
fn duplicate_names_abort_loading() {
    let err = ToolRegistry::from_categories([
        (ToolCategory::Offers, vec![spec(ToolKind::ListOffers)]),
        (ToolCategory::Custom, vec![spec(ToolKind::ListOffers)]),
    ])
    .unwrap_err();

    match err {
        RegistryError::DuplicateTool { name, category } => {
            assert_eq!(name, "listOffers");
            assert_eq!(category, ToolCategory::Custom);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_descriptor_skips_its_whole_category() {
    let broken = ToolSpec::new(ToolKind::GetOffer, "broken", json!({ "type": "array" }));
    let registry = ToolRegistry::from_categories([
        (ToolCategory::Offers, vec![spec(ToolKind::ListOffers), broken]),
        (ToolCategory::Properties, vec![spec(ToolKind::ListProperties)]),
    ])
    .unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.lookup("listOffers"), None);
    assert_eq!(registry.lookup("listProperties"), Some(ToolKind::ListProperties));
}

#[test]
fn uncompilable_schema_is_rejected() {
    let broken = ToolSpec::new(
        ToolKind::ListMboxes,
        "broken",
        json!({ "type": "object", "properties": { "x": { "type": 12 } } }),
    );
    let registry = ToolRegistry::from_categories([(ToolCategory::Mboxes, vec![broken])]).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn descriptor_serializes_with_camel_case_schema_key() {
    let registry = ToolRegistry::load().unwrap();
    let value = serde_json::to_value(&registry.descriptors()[0]).unwrap();
    assert!(value.get("inputSchema").is_some());
    assert!(value.get("input_schema").is_none());
}
