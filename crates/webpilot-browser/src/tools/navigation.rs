//! Navigation executors: navigate, go-back, wait-for-navigation.

use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;
use url::Url;
use webpilot_protocols::{NavigateParams, ToolResult, WaitForNavigationParams};

use crate::error::BrowserError;

use super::{AutomationSession, POLL_INTERVAL_MS};

pub(super) async fn navigate(
    session: &AutomationSession,
    params: &NavigateParams,
) -> Result<ToolResult, BrowserError> {
    Url::parse(&params.url)?;

    let page = if params.new_tab {
        session.host().open_page(&params.url).await?
    } else {
        let page = session.page().await?;
        page.navigate(&params.url).await?;
        match page.wait_for_load(session.navigation_timeout_ms()).await {
            Ok(()) => {}
            // A slow page is not a failed navigation; the next perception
            // pass sees whatever has loaded by then.
            Err(BrowserError::Timeout(ms)) => {
                debug!(url = %params.url, "load wait gave up after {ms}ms")
            }
            Err(e) => return Err(e),
        }
        page
    };

    session.invalidate_registry();

    Ok(ToolResult::success(json!({
        "url": page.url().await?,
        "title": page.title().await?,
        "ready_state": page.ready_state().await?,
        "new_tab": params.new_tab,
    })))
}

pub(super) async fn go_back(session: &AutomationSession) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    page.go_back().await?;
    session.invalidate_registry();

    Ok(ToolResult::success(json!({
        "url": page.url().await?,
        "title": page.title().await?,
    })))
}

pub(super) async fn wait_for_navigation(
    session: &AutomationSession,
    params: &WaitForNavigationParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let started = Instant::now();
    let deadline = Duration::from_millis(params.timeout_ms);

    loop {
        let state = page.ready_state().await?;
        if state == "complete" {
            return Ok(ToolResult::success(json!({
                "ready_state": state,
                "timed_out": false,
                "elapsed_ms": started.elapsed().as_millis() as u64,
            })));
        }
        if started.elapsed() >= deadline {
            // Out of time is an answer, not an error.
            return Ok(ToolResult::success(json!({
                "ready_state": state,
                "timed_out": true,
                "timeout_ms": params.timeout_ms,
            })));
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}
