//! Navigation, load waiting and screenshots for a CDP page session.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::BrowserError;

use super::core::PageSession;

impl PageSession {
    /// Navigate to a URL; resolves when the browser accepts the navigation,
    /// not when the page finishes loading.
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(BrowserError::NavigationFailed(error.to_string()));
            }
        }

        debug!("navigating to {}", url);
        Ok(())
    }

    /// Poll `document.readyState` until the page is usable.
    ///
    /// Accepts `interactive` as loaded; pages with slow subresources would
    /// otherwise stall every step behind them.
    pub async fn wait_for_ready(&self, timeout_ms: u64) -> Result<(), BrowserError> {
        let deadline = std::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);

        loop {
            let state = self.evaluate("document.readyState").await?;
            if matches!(state.as_str(), Some("complete" | "interactive")) {
                return Ok(());
            }

            if std::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout(timeout_ms));
            }

            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }

    /// Step back one history entry. Returns false at the start of history.
    pub async fn go_back(&self) -> Result<bool, BrowserError> {
        let history = self.call("Page.getNavigationHistory", None).await?;
        let current_index = history["currentIndex"].as_i64().unwrap_or(0);
        if current_index <= 0 {
            return Ok(false);
        }

        let entry_id = history["entries"][current_index as usize - 1]["id"]
            .as_i64()
            .unwrap_or(0);
        self.call(
            "Page.navigateToHistoryEntry",
            Some(json!({"entryId": entry_id})),
        )
        .await?;
        Ok(true)
    }

    /// Viewport and scroll geometry from `Page.getLayoutMetrics`.
    pub async fn layout_metrics(&self) -> Result<Value, BrowserError> {
        self.call("Page.getLayoutMetrics", None).await
    }

    /// Base64 screenshot of the visible viewport.
    pub async fn screenshot(
        &self,
        format: &str,
        quality: Option<u8>,
    ) -> Result<String, BrowserError> {
        let mut params = json!({
            "format": format,
            "captureBeyondViewport": false,
        });
        if let Some(q) = quality {
            params["quality"] = json!(q);
        }

        let result = self.call("Page.captureScreenshot", Some(params)).await?;

        result["data"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| BrowserError::InvalidResponse("missing screenshot data".to_string()))
    }
}
