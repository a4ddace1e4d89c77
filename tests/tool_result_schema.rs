use jsonschema::validator_for;
use serde_json::Value;

use target_mcp_server::error::ToolError;
use target_mcp_server::gateway::GatewayError;
use target_mcp_server::protocol::ToolResult;

// Tool result envelope (MCP 2024-11-05), frozen.
const TOOL_RESULT_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "MCP Tool Result",
  "type": "object",
  "required": ["content"],
  "additionalProperties": false,
  "properties": {
    "content": {
      "type": "array",
      "minItems": 1,
      "items": {
        "type": "object",
        "required": ["type", "text"],
        "additionalProperties": false,
        "properties": {
          "type": { "const": "text" },
          "text": { "type": "string" }
        }
      }
    },
    "isError": { "const": true }
  }
}"#;

#[test]
fn golden_tool_error_result() {
    let result: ToolResult = ToolError::Gateway(GatewayError::Api {
        status: 404,
        body: r#"{"message":"Offer not found"}"#.into(),
    })
    .into();

    let json_str = serde_json::to_string_pretty(&result).unwrap();
    let json_value: Value = serde_json::from_str(&json_str).unwrap();

    let schema_json: Value = serde_json::from_str(TOOL_RESULT_SCHEMA).unwrap();
    let validator = validator_for(&schema_json).unwrap();
    assert!(validator.is_valid(&json_value), "tool result must satisfy schema");

    let expected = r#"{
  "content": [
    {
      "type": "text",
      "text": "Error: API Error (404): {\"message\":\"Offer not found\"}"
    }
  ],
  "isError": true
}"#;

    assert_eq!(json_str.trim(), expected.trim(), "tool error snapshot mismatch");
}

#[test]
fn golden_tool_success_result_omits_is_error() {
    let result = ToolResult::text("{\n  \"id\": 42\n}");
    let json_value = serde_json::to_value(&result).unwrap();

    let schema_json: Value = serde_json::from_str(TOOL_RESULT_SCHEMA).unwrap();
    let validator = validator_for(&schema_json).unwrap();
    assert!(validator.is_valid(&json_value));
    assert!(json_value.get("isError").is_none());
}
