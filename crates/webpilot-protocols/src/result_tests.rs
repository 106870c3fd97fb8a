use super::*;

#[test]
fn test_success_carries_data_and_no_error() {
    let result = ToolResult::success(serde_json::json!({"url": "https://example.com"}));
    assert!(result.success);
    assert_eq!(result.data.as_ref().unwrap()["url"], "https://example.com");
    assert!(result.error.is_none());
}

#[test]
fn test_success_empty_has_no_payload() {
    let result = ToolResult::success_empty();
    assert!(result.is_success());
    assert!(result.data.is_none());
    assert!(result.error.is_none());
}

#[test]
fn test_failure_carries_message() {
    let result = ToolResult::failure("element 7 is no longer attached");
    assert!(!result.success);
    assert!(result.data.is_none());
    assert_eq!(result.error_message(), "element 7 is no longer attached");
}

#[test]
fn test_failure_with_partial_data() {
    let result = ToolResult::failure_with_data(
        "2 of 3 fields filled",
        serde_json::json!({"failed": ["#email"]}),
    );
    assert!(!result.success);
    assert!(result.data.is_some());
    assert!(result.error.is_some());
}

#[test]
fn test_serialization_omits_absent_fields() {
    let json = serde_json::to_string(&ToolResult::success_empty()).unwrap();
    assert_eq!(json, r#"{"success":true}"#);

    let json = serde_json::to_string(&ToolResult::failure("boom")).unwrap();
    assert!(json.contains(r#""error":"boom""#));
    assert!(!json.contains("data"));
}

#[test]
fn test_round_trip() {
    let original = ToolResult::success(serde_json::json!({"count": 3}));
    let json = serde_json::to_string(&original).unwrap();
    let back: ToolResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}
