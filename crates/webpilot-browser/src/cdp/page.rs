//! [`PageContext`] implementation over a CDP page session.

use async_trait::async_trait;
use serde_json::{json, Value};
use webpilot_protocols::{CaptureFormat, Rect, ScrollInfo};

use crate::dom::node::DomSnapshotData;
use crate::error::BrowserError;
use crate::page::{DropdownOption, ElementSummary, NodeHandle, PageContext, TypeOutcome};

use super::scripts;
use super::session::PageSession;
use super::snapshot;

/// A live Chrome tab, spoken to over CDP.
pub struct CdpPage {
    session: PageSession,
    navigation_timeout_ms: u64,
}

impl CdpPage {
    pub(crate) fn new(session: PageSession, navigation_timeout_ms: u64) -> Self {
        Self {
            session,
            navigation_timeout_ms,
        }
    }

    pub fn target_id(&self) -> &str {
        self.session.target_id()
    }

    pub fn session_id(&self) -> &str {
        self.session.session_id()
    }

    async fn eval_string(&self, expression: &str) -> Result<String, BrowserError> {
        let value = self.session.evaluate(expression).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl PageContext for CdpPage {
    async fn dom_snapshot(&self) -> Result<DomSnapshotData, BrowserError> {
        let metrics_raw = self.session.layout_metrics().await?;
        let metrics = snapshot::decode_layout_metrics(&metrics_raw);

        let raw = self
            .session
            .call(
                "DOMSnapshot.captureSnapshot",
                Some(json!({
                    "computedStyles": snapshot::SNAPSHOT_STYLES,
                    "includeDOMRects": true,
                })),
            )
            .await?;

        snapshot::decode_snapshot(raw, &metrics)
    }

    async fn url(&self) -> Result<String, BrowserError> {
        self.eval_string("window.location.href").await
    }

    async fn title(&self) -> Result<String, BrowserError> {
        self.eval_string("document.title").await
    }

    async fn ready_state(&self) -> Result<String, BrowserError> {
        self.eval_string("document.readyState").await
    }

    async fn eval(&self, expression: &str) -> Result<Value, BrowserError> {
        self.session.evaluate(expression).await
    }

    async fn call_on_node(
        &self,
        node: &NodeHandle,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, BrowserError> {
        self.session
            .call_on_backend_node(node.backend_id, function, args)
            .await
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<NodeHandle>, BrowserError> {
        Ok(self
            .session
            .query_selector(selector)
            .await?
            .map(NodeHandle::new))
    }

    async fn query_selector_all(
        &self,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<NodeHandle>, BrowserError> {
        Ok(self
            .session
            .query_selector_all(selector, limit)
            .await?
            .into_iter()
            .map(NodeHandle::new)
            .collect())
    }

    async fn node_at_point(&self, x: f64, y: f64) -> Result<Option<NodeHandle>, BrowserError> {
        Ok(self
            .session
            .node_for_location(x, y)
            .await?
            .map(NodeHandle::new))
    }

    async fn node_by_backend_id(
        &self,
        backend_id: i64,
    ) -> Result<Option<NodeHandle>, BrowserError> {
        Ok(self
            .session
            .describe_backend_node(backend_id)
            .await?
            .map(|_| NodeHandle::new(backend_id)))
    }

    async fn describe(&self, node: &NodeHandle) -> Result<ElementSummary, BrowserError> {
        let v = self
            .call_on_node(node, scripts::DESCRIBE_NODE, Vec::new())
            .await?;

        let rect = &v["rect"];
        Ok(ElementSummary {
            tag: v["tag"].as_str().unwrap_or_default().to_string(),
            input_type: v["inputType"].as_str().map(String::from),
            content_editable: v["contentEditable"].as_bool().unwrap_or(false),
            value: v["value"].as_str().map(String::from),
            text: v["text"].as_str().unwrap_or_default().to_string(),
            rect: Rect::new(
                rect["x"].as_f64().unwrap_or(0.0),
                rect["y"].as_f64().unwrap_or(0.0),
                rect["width"].as_f64().unwrap_or(0.0),
                rect["height"].as_f64().unwrap_or(0.0),
            ),
        })
    }

    async fn scroll_into_view(&self, node: &NodeHandle) -> Result<(), BrowserError> {
        match self.session.scroll_into_view(node.backend_id).await {
            Ok(()) => Ok(()),
            // Some node kinds reject the native path; the script one works.
            Err(BrowserError::Protocol { .. }) => {
                self.call_on_node(node, scripts::SCROLL_INTO_VIEW, Vec::new())
                    .await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), BrowserError> {
        self.session.click(x, y).await
    }

    async fn click_node(&self, node: &NodeHandle) -> Result<(), BrowserError> {
        self.call_on_node(node, scripts::CLICK_NODE, Vec::new())
            .await?;
        Ok(())
    }

    async fn type_text(
        &self,
        node: &NodeHandle,
        text: &str,
        clear: bool,
        press_enter: bool,
    ) -> Result<TypeOutcome, BrowserError> {
        let v = self
            .call_on_node(
                node,
                scripts::SET_FIELD_VALUE,
                vec![json!(text), json!(clear)],
            )
            .await?;

        let tag = v["tag"].as_str().unwrap_or_default().to_string();
        let has_form = v["hasForm"].as_bool().unwrap_or(false);

        if press_enter {
            self.session.press_key("Enter").await?;
        }

        Ok(TypeOutcome {
            submitted: press_enter && tag == "input" && has_form,
            value: v["value"].as_str().map(String::from),
            tag,
        })
    }

    async fn send_keys(&self, keys: &str) -> Result<(), BrowserError> {
        self.session.press_key_combo(keys).await
    }

    async fn dropdown_options(
        &self,
        node: &NodeHandle,
    ) -> Result<Vec<DropdownOption>, BrowserError> {
        let v = self
            .call_on_node(node, scripts::DROPDOWN_OPTIONS, Vec::new())
            .await?;
        Ok(serde_json::from_value(v)?)
    }

    async fn select_option(
        &self,
        node: &NodeHandle,
        value: Option<&str>,
        label: Option<&str>,
    ) -> Result<DropdownOption, BrowserError> {
        let v = self
            .call_on_node(
                node,
                scripts::SELECT_OPTION,
                vec![json!(value), json!(label)],
            )
            .await?;

        if v.is_null() {
            let wanted = value.or(label).unwrap_or_default();
            return Err(BrowserError::TargetNotFound(format!(
                "option '{wanted}'"
            )));
        }
        Ok(serde_json::from_value(v)?)
    }

    async fn highlight(
        &self,
        node: &NodeHandle,
        color: &str,
        duration_ms: u64,
    ) -> Result<(), BrowserError> {
        self.call_on_node(
            node,
            scripts::HIGHLIGHT_NODE,
            vec![json!(color), json!(duration_ms)],
        )
        .await?;
        Ok(())
    }

    async fn scroll_by(&self, dx: f64, dy: f64) -> Result<ScrollInfo, BrowserError> {
        let v = self
            .session
            .evaluate(&scripts::page_scroll_by(dx, dy))
            .await?;
        Ok(snapshot::scroll_info_from_value(&v))
    }

    async fn scroll_node_by(
        &self,
        node: &NodeHandle,
        dx: f64,
        dy: f64,
    ) -> Result<ScrollInfo, BrowserError> {
        let v = self
            .call_on_node(node, scripts::SCROLL_NODE_BY, vec![json!(dx), json!(dy)])
            .await?;
        Ok(snapshot::scroll_info_from_value(&v))
    }

    async fn scroll_info(&self) -> Result<ScrollInfo, BrowserError> {
        let v = self.session.evaluate(scripts::PAGE_SCROLL_INFO).await?;
        Ok(snapshot::scroll_info_from_value(&v))
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.session.navigate(url).await
    }

    async fn go_back(&self) -> Result<(), BrowserError> {
        if !self.session.go_back().await? {
            return Err(BrowserError::NavigationFailed(
                "no earlier history entry".to_string(),
            ));
        }
        self.session
            .wait_for_ready(self.navigation_timeout_ms)
            .await
    }

    async fn wait_for_load(&self, timeout_ms: u64) -> Result<(), BrowserError> {
        self.session.wait_for_ready(timeout_ms).await
    }

    async fn screenshot(
        &self,
        format: CaptureFormat,
        quality: Option<u8>,
    ) -> Result<String, BrowserError> {
        self.session.screenshot(format.as_str(), quality).await
    }
}
