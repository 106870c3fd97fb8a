//! DOM lookups for a CDP page session, keyed by backend node id.

use serde_json::{json, Value};

use crate::error::BrowserError;

use super::core::PageSession;

const NODE_GONE: i64 = -32000;

impl PageSession {
    /// Document root node id for selector queries.
    async fn document_node_id(&self) -> Result<i64, BrowserError> {
        let result = self.call("DOM.getDocument", Some(json!({"depth": 0}))).await?;
        result["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| BrowserError::InvalidResponse("document has no nodeId".to_string()))
    }

    /// First node matching a CSS selector, as a backend node id.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>, BrowserError> {
        let doc = self.document_node_id().await?;

        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({
                    "nodeId": doc,
                    "selector": selector,
                })),
            )
            .await?;

        let node_id = result["nodeId"].as_i64().unwrap_or(0);
        if node_id == 0 {
            return Ok(None);
        }
        self.backend_id_for(node_id).await.map(Some)
    }

    /// All nodes matching a CSS selector, as backend node ids.
    pub async fn query_selector_all(
        &self,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<i64>, BrowserError> {
        let doc = self.document_node_id().await?;

        let result = self
            .call(
                "DOM.querySelectorAll",
                Some(json!({
                    "nodeId": doc,
                    "selector": selector,
                })),
            )
            .await?;

        let node_ids: Vec<i64> = result["nodeIds"]
            .as_array()
            .map(|arr| arr.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();

        let mut backend_ids = Vec::with_capacity(node_ids.len().min(limit));
        for node_id in node_ids.into_iter().take(limit) {
            backend_ids.push(self.backend_id_for(node_id).await?);
        }
        Ok(backend_ids)
    }

    async fn backend_id_for(&self, node_id: i64) -> Result<i64, BrowserError> {
        let result = self
            .call("DOM.describeNode", Some(json!({"nodeId": node_id})))
            .await?;
        result["node"]["backendNodeId"]
            .as_i64()
            .ok_or_else(|| BrowserError::InvalidResponse("node has no backendNodeId".to_string()))
    }

    /// Describe a backend node; `None` when it has left the document.
    pub async fn describe_backend_node(
        &self,
        backend_node_id: i64,
    ) -> Result<Option<Value>, BrowserError> {
        let result = self
            .call(
                "DOM.describeNode",
                Some(json!({"backendNodeId": backend_node_id})),
            )
            .await;

        match result {
            Ok(r) => Ok(Some(r["node"].clone())),
            Err(BrowserError::Protocol {
                code: NODE_GONE, ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Topmost node at viewport coordinates.
    pub async fn node_for_location(&self, x: f64, y: f64) -> Result<Option<i64>, BrowserError> {
        let result = self
            .call(
                "DOM.getNodeForLocation",
                Some(json!({
                    "x": x as i64,
                    "y": y as i64,
                    "includeUserAgentShadowDOM": false,
                })),
            )
            .await;

        match result {
            Ok(r) => Ok(r["backendNodeId"].as_i64()),
            Err(BrowserError::Protocol {
                code: NODE_GONE, ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Scroll a node into view using the browser-native path.
    pub async fn scroll_into_view(&self, backend_node_id: i64) -> Result<(), BrowserError> {
        self.call(
            "DOM.scrollIntoViewIfNeeded",
            Some(json!({"backendNodeId": backend_node_id})),
        )
        .await?;
        Ok(())
    }

    /// Give a node input focus.
    pub async fn focus(&self, backend_node_id: i64) -> Result<(), BrowserError> {
        self.call("DOM.focus", Some(json!({"backendNodeId": backend_node_id})))
            .await?;
        Ok(())
    }
}
