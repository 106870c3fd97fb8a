//! The boundary between action executors and a live page.
//!
//! Everything that crosses this seam is serializable: node handles are
//! backend ids, scripts are self-contained source strings with explicit JSON
//! arguments, results are plain data. Executors never reach into a page by
//! closure. `cdp::CdpPage` implements this against Chrome;
//! `testing::FakePage` implements it over an in-memory snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use webpilot_protocols::{CaptureFormat, Rect, ScrollInfo};

use crate::dom::node::DomSnapshotData;
use crate::error::BrowserError;

/// Reference to one live node, valid while the node stays attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle {
    /// DevTools backend node id (or the fake equivalent).
    pub backend_id: i64,
}

impl NodeHandle {
    pub fn new(backend_id: i64) -> Self {
        Self { backend_id }
    }
}

/// What an executor needs to know about a node before acting on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSummary {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub input_type: Option<String>,
    pub content_editable: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,
    /// Short display text (value/label/alt fallbacks applied).
    pub text: String,
    pub rect: Rect,
}

impl ElementSummary {
    /// Can `type-text` act on this element?
    pub fn is_editable(&self) -> bool {
        match self.tag.as_str() {
            "input" => !matches!(
                self.input_type.as_deref(),
                Some("button" | "submit" | "reset" | "checkbox" | "radio" | "file" | "image")
            ),
            "textarea" => true,
            _ => self.content_editable,
        }
    }
}

/// What happened when text was typed into a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeOutcome {
    pub tag: String,
    /// Field value after the edit, when the element exposes one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,
    /// Whether an Enter press also submitted an enclosing form.
    pub submitted: bool,
}

/// One `<option>` inside a select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub index: u32,
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// One live page (tab or frame context) the executors can act on.
///
/// Implementations must time-bound every call; a torn-down page resolves to
/// an error, never a hang.
#[async_trait]
pub trait PageContext: Send + Sync {
    /// Structured view of the current DOM, viewport-relative geometry
    /// included. Fresh on every call.
    async fn dom_snapshot(&self) -> Result<DomSnapshotData, BrowserError>;

    async fn url(&self) -> Result<String, BrowserError>;

    async fn title(&self) -> Result<String, BrowserError>;

    /// `document.readyState`: `loading`, `interactive` or `complete`.
    async fn ready_state(&self) -> Result<String, BrowserError>;

    /// Evaluate an expression in page context, awaiting a returned promise.
    /// In-page exceptions surface as [`BrowserError::PageScript`].
    async fn eval(&self, expression: &str) -> Result<Value, BrowserError>;

    /// Run a self-contained function source against a node, passing JSON
    /// arguments. The function sees the node as `this` and must not assume
    /// any out-of-page helper exists.
    async fn call_on_node(
        &self,
        node: &NodeHandle,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, BrowserError>;

    async fn query_selector(&self, selector: &str) -> Result<Option<NodeHandle>, BrowserError>;

    async fn query_selector_all(
        &self,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<NodeHandle>, BrowserError>;

    async fn node_at_point(&self, x: f64, y: f64) -> Result<Option<NodeHandle>, BrowserError>;

    /// Re-find a node recorded in an element registry. `None` when the node
    /// has left the document.
    async fn node_by_backend_id(
        &self,
        backend_id: i64,
    ) -> Result<Option<NodeHandle>, BrowserError>;

    async fn describe(&self, node: &NodeHandle) -> Result<ElementSummary, BrowserError>;

    async fn scroll_into_view(&self, node: &NodeHandle) -> Result<(), BrowserError>;

    /// Trusted click at viewport coordinates (real input event).
    async fn click_at(&self, x: f64, y: f64) -> Result<(), BrowserError>;

    /// In-page mousedown/mouseup/click sequence on the node itself; the
    /// fallback when coordinates are unusable.
    async fn click_node(&self, node: &NodeHandle) -> Result<(), BrowserError>;

    /// Set a field's text the way the platform does it natively, firing
    /// `input`/`change`, honoring `clear`, optionally pressing Enter (which
    /// also submits an enclosing form for inputs).
    async fn type_text(
        &self,
        node: &NodeHandle,
        text: &str,
        clear: bool,
        press_enter: bool,
    ) -> Result<TypeOutcome, BrowserError>;

    /// Dispatch a key or key combination (`Enter`, `Control+A`, ...).
    async fn send_keys(&self, keys: &str) -> Result<(), BrowserError>;

    async fn dropdown_options(
        &self,
        node: &NodeHandle,
    ) -> Result<Vec<DropdownOption>, BrowserError>;

    /// Select an option by value (preferred) or visible label.
    async fn select_option(
        &self,
        node: &NodeHandle,
        value: Option<&str>,
        label: Option<&str>,
    ) -> Result<DropdownOption, BrowserError>;

    /// Draw a temporary overlay over the node.
    async fn highlight(
        &self,
        node: &NodeHandle,
        color: &str,
        duration_ms: u64,
    ) -> Result<(), BrowserError>;

    /// Scroll the page by a pixel delta; reports the resulting state.
    async fn scroll_by(&self, dx: f64, dy: f64) -> Result<ScrollInfo, BrowserError>;

    /// Scroll an element's own overflow box by a pixel delta.
    async fn scroll_node_by(
        &self,
        node: &NodeHandle,
        dx: f64,
        dy: f64,
    ) -> Result<ScrollInfo, BrowserError>;

    async fn scroll_info(&self) -> Result<ScrollInfo, BrowserError>;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    async fn go_back(&self) -> Result<(), BrowserError>;

    /// Wait until the document reports `complete`, bounded by `timeout_ms`.
    async fn wait_for_load(&self, timeout_ms: u64) -> Result<(), BrowserError>;

    /// Base64 screenshot of the visible viewport.
    async fn screenshot(
        &self,
        format: CaptureFormat,
        quality: Option<u8>,
    ) -> Result<String, BrowserError>;
}

/// Hands out pages; the dispatcher asks it for the active one per action.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// The page actions run against unless one explicitly opens a new tab.
    async fn active_page(&self) -> Result<Arc<dyn PageContext>, BrowserError>;

    /// Open a new tab at `url` and make it active.
    async fn open_page(&self, url: &str) -> Result<Arc<dyn PageContext>, BrowserError>;
}
