//! CDP wire types and message definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CDP request message.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP response message.
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP error in response.
#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// Page info from the /json endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub title: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
    pub dev_tools_frontend_url: Option<String>,
}

/// Browser version info.
///
/// Note: Chrome returns PascalCase field names for this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,
    #[serde(rename = "User-Agent")]
    pub user_agent: String,
    #[serde(rename = "V8-Version")]
    pub v8_version: Option<String>,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

// ============================================================================
// Runtime Types
// ============================================================================

/// Remote object from the Runtime domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub subtype: Option<String>,
    pub class_name: Option<String>,
    pub value: Option<Value>,
    pub description: Option<String>,
    pub object_id: Option<String>,
}

// ============================================================================
// Input Types
// ============================================================================

/// Mouse button.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    None,
    Left,
    Middle,
    Right,
}

/// Mouse event type.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseEventType {
    MousePressed,
    MouseReleased,
    MouseMoved,
    MouseWheel,
}

/// Key event type.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
    RawKeyDown,
    Char,
}

// ============================================================================
// DOMSnapshot Types
// ============================================================================
//
// `DOMSnapshot.captureSnapshot` returns flattened parallel arrays with a
// shared string table. Indices of -1 (or absent rare-data entries) mean
// "no value". The decoder in `cdp::snapshot` turns these into node trees.

/// Full capture result: one entry per document (main frame plus any
/// same-process iframes), all sharing `strings`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureSnapshotResult {
    pub documents: Vec<DocumentSnapshot>,
    pub strings: Vec<String>,
}

/// One document's nodes and layout.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSnapshot {
    #[serde(rename = "documentURL")]
    pub document_url: Option<i64>,
    pub title: Option<i64>,
    pub frame_id: Option<i64>,
    pub nodes: NodeTreeSnapshot,
    pub layout: LayoutTreeSnapshot,
    pub scroll_offset_x: f64,
    pub scroll_offset_y: f64,
    pub content_width: f64,
    pub content_height: f64,
}

/// Parallel arrays describing the DOM tree, one slot per node.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeTreeSnapshot {
    pub parent_index: Vec<i64>,
    pub node_type: Vec<i64>,
    pub node_name: Vec<i64>,
    pub node_value: Vec<i64>,
    pub backend_node_id: Vec<i64>,
    /// Flattened name/value string-index pairs per node.
    pub attributes: Vec<Vec<i64>>,
    pub input_value: RareStringData,
    pub text_value: RareStringData,
    pub input_checked: RareBooleanData,
    pub option_selected: RareBooleanData,
    pub content_document_index: RareIntegerData,
}

/// Parallel arrays for laid-out nodes only; `node_index` maps rows back to
/// slots in [`NodeTreeSnapshot`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutTreeSnapshot {
    pub node_index: Vec<i64>,
    /// Computed style values per row, ordered like the `computedStyles`
    /// filter in the request.
    pub styles: Vec<Vec<i64>>,
    /// Document-relative [x, y, width, height].
    pub bounds: Vec<Vec<f64>>,
    /// Per-row [scrollLeft, scrollTop, scrollWidth, scrollHeight] when the
    /// capture requested DOM rects.
    pub scroll_rects: Vec<Vec<f64>>,
    /// Per-row [clientLeft, clientTop, clientWidth, clientHeight].
    pub client_rects: Vec<Vec<f64>>,
}

/// Sparse string values: `index[i]` holds a node slot, `value[i]` a string
/// table index.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RareStringData {
    pub index: Vec<i64>,
    pub value: Vec<i64>,
}

/// Sparse boolean values: listed node slots are true.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RareBooleanData {
    pub index: Vec<i64>,
}

/// Sparse integer values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RareIntegerData {
    pub index: Vec<i64>,
    pub value: Vec<i64>,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
