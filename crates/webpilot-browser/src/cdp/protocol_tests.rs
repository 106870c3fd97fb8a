use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Page.navigate".to_string(),
        params: Some(serde_json::json!({"url": "https://example.com"})),
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Page.navigate"));
    assert!(json.contains("example.com"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_cdp_request_carries_session_id() {
    let req = CdpRequest {
        id: 7,
        method: "Runtime.evaluate".to_string(),
        params: None,
        session_id: Some("SESSION1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"sessionId\":\"SESSION1\""));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"frameId": "abc"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
    assert!(resp.error.is_none());
}

#[test]
fn test_cdp_event_deserialize() {
    let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.0}, "sessionId": "S"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, None);
    assert_eq!(resp.method.as_deref(), Some("Page.loadEventFired"));
    assert_eq!(resp.session_id.as_deref(), Some("S"));
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Test",
        "url": "https://example.com",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert_eq!(info.page_type, "page");
    assert!(info.web_socket_debugger_url.is_some());
}

#[test]
fn test_browser_version_pascal_case() {
    let json = r#"{
        "Browser": "Chrome/127.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/xyz"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.protocol_version, "1.3");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn test_mouse_button_serialize() {
    let btn = MouseButton::Left;
    let json = serde_json::to_string(&btn).unwrap();
    assert_eq!(json, "\"left\"");
}

#[test]
fn test_mouse_event_type_serialize() {
    let json = serde_json::to_string(&MouseEventType::MousePressed).unwrap();
    assert_eq!(json, "\"mousePressed\"");
}

#[test]
fn test_capture_snapshot_defaults_absent_sections() {
    let json = r#"{
        "documents": [{"nodes": {"parentIndex": [-1], "nodeType": [9]}, "layout": {}}],
        "strings": []
    }"#;
    let capture: CaptureSnapshotResult = serde_json::from_str(json).unwrap();
    let doc = &capture.documents[0];
    assert_eq!(doc.nodes.parent_index, vec![-1]);
    assert!(doc.nodes.input_value.index.is_empty());
    assert!(doc.layout.node_index.is_empty());
    assert_eq!(doc.scroll_offset_x, 0.0);
}
