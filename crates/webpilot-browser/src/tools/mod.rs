//! Action executors and the dispatcher that routes tool calls to them.
//!
//! Execution is two-phase: resolve the target page (and, for element
//! actions, the target node) first, then cross into the page. Executors
//! return `Result`; the dispatcher converts every error into a failed
//! [`ToolResult`](webpilot_protocols::ToolResult) so callers never see a
//! transport error escape a tool call.

mod content;
mod dispatcher;
mod interaction;
mod navigation;

pub use dispatcher::AutomationSession;

use webpilot_protocols::ElementTarget;

use crate::error::BrowserError;
use crate::page::{NodeHandle, PageContext};

/// Poll interval for the wait-style actions.
pub(crate) const POLL_INTERVAL_MS: u64 = 250;

/// Resolve an element target against the live page.
///
/// Index targets re-find the node by the backend id recorded at snapshot
/// time and fall back to the recorded selector, so a DOM mutation that kept
/// the element attached does not invalidate the index. A node that is gone
/// both ways reports [`BrowserError::StaleElement`].
pub(crate) async fn resolve_target(
    session: &AutomationSession,
    page: &dyn PageContext,
    target: &ElementTarget,
) -> Result<NodeHandle, BrowserError> {
    match target {
        ElementTarget::Index(index) => {
            let node_ref = session.registry_entry(*index)?;
            if let Some(backend_id) = node_ref.backend_id {
                if let Some(handle) = page.node_by_backend_id(backend_id).await? {
                    return Ok(handle);
                }
            }
            if !node_ref.css_selector.is_empty() {
                if let Some(handle) = page.query_selector(&node_ref.css_selector).await? {
                    return Ok(handle);
                }
            }
            Err(BrowserError::StaleElement { index: *index })
        }
        ElementTarget::Selector(selector) => page
            .query_selector(selector)
            .await?
            .ok_or_else(|| BrowserError::TargetNotFound(format!("selector '{selector}'"))),
        ElementTarget::Point { .. } => Err(BrowserError::InvalidTarget(
            "coordinates only target clicks".to_string(),
        )),
    }
}
