use target_mcp_server::schema::{validate, validate_json, SchemaValidationError};

#[test]
fn json_schema_harness_validates_instance() {
    let schema = r#"{
      "$schema": "https://json-schema.org/draft/2020-12/schema",
      "type": "object",
      "required": ["name", "content"],
      "properties": {
        "name": { "type": "string", "minLength": 1 },
        "content": { "type": "string" },
        "workspace": { "type": "string" }
      }
    }"#;

    let instance = r#"{
      "name": "Hero offer",
      "content": "<div class=\"at-hero\"></div>"
    }"#;

    validate_json(schema, instance).expect("schema validation failed");
}

#[test]
fn json_schema_harness_reports_violations() {
    let schema = serde_json::json!({
        "type": "object",
        "required": ["id"],
        "properties": { "id": { "type": "number" } }
    });

    let err = validate(&schema, &serde_json::json!({ "id": "seven" })).unwrap_err();
    assert!(matches!(err, SchemaValidationError::ValidationFailed(_)));
}

#[test]
fn json_schema_harness_rejects_unparseable_schema() {
    assert!(validate_json("{", "{}").is_err());
}
