//! Element interaction executors: click, type, scroll, keys, waits,
//! dropdowns, highlight, batch form fill.

use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;
use webpilot_protocols::{
    ClickParams, DropdownTargetParams, ElementTarget, FillFormParams, FormField, HighlightParams,
    ScrollDirection, ScrollParams, SelectDropdownOptionParams, SendKeysParams, TargetError,
    ToolResult, TypeTextParams, WaitForElementParams,
};

use crate::error::BrowserError;
use crate::page::PageContext;

use super::{resolve_target, AutomationSession, POLL_INTERVAL_MS};

fn bad_target(e: TargetError) -> BrowserError {
    BrowserError::InvalidTarget(e.to_string())
}

pub(super) async fn click_element(
    session: &AutomationSession,
    params: &ClickParams,
) -> Result<ToolResult, BrowserError> {
    let target = params.target().map_err(bad_target)?;
    let page = session.page().await?;

    if let ElementTarget::Point { x, y } = target {
        page.click_at(x, y).await?;
        return Ok(ToolResult::success(json!({
            "target": target.to_string(),
            "method": "point",
        })));
    }

    let node = resolve_target(session, page.as_ref(), &target).await?;
    page.scroll_into_view(&node).await?;
    let summary = page.describe(&node).await?;

    // Trusted coordinates when the element has extent; the in-page click
    // sequence covers zero-rect targets.
    let method = if summary.rect.is_empty() {
        page.click_node(&node).await?;
        "node"
    } else {
        let (x, y) = summary.rect.center();
        page.click_at(x, y).await?;
        "point"
    };

    debug!(target = %target, tag = %summary.tag, method, "clicked element");
    Ok(ToolResult::success(json!({
        "target": target.to_string(),
        "tag": summary.tag,
        "text": summary.text,
        "method": method,
    })))
}

pub(super) async fn type_text(
    session: &AutomationSession,
    params: &TypeTextParams,
) -> Result<ToolResult, BrowserError> {
    let target = params.target().map_err(bad_target)?;
    let page = session.page().await?;
    let node = resolve_target(session, page.as_ref(), &target).await?;

    let summary = page.describe(&node).await?;
    if !summary.is_editable() {
        return Err(BrowserError::InvalidTarget(format!(
            "element <{}> at {} is not editable",
            summary.tag, target
        )));
    }

    page.scroll_into_view(&node).await?;
    let outcome = page
        .type_text(&node, &params.text, params.clear, params.press_enter)
        .await?;

    Ok(ToolResult::success(json!({
        "target": target.to_string(),
        "tag": outcome.tag,
        "value": outcome.value,
        "submitted": outcome.submitted,
    })))
}

fn delta(direction: ScrollDirection, amount: f64) -> (f64, f64) {
    match direction {
        ScrollDirection::Up => (0.0, -amount),
        ScrollDirection::Down => (0.0, amount),
        ScrollDirection::Left => (-amount, 0.0),
        ScrollDirection::Right => (amount, 0.0),
    }
}

pub(super) async fn scroll(
    session: &AutomationSession,
    params: &ScrollParams,
) -> Result<ToolResult, BrowserError> {
    let container = params.container().map_err(bad_target)?;
    let page = session.page().await?;

    let (amount, info) = match container {
        None => {
            let current = page.scroll_info().await?;
            let amount = params.amount.unwrap_or(current.viewport_height);
            let (dx, dy) = delta(params.direction, amount);
            (amount, page.scroll_by(dx, dy).await?)
        }
        Some(target) => {
            let node = resolve_target(session, page.as_ref(), &target).await?;
            let summary = page.describe(&node).await?;
            // One visible height of the container, like one viewport for
            // the page.
            let amount = params.amount.unwrap_or(summary.rect.height);
            let (dx, dy) = delta(params.direction, amount);
            (amount, page.scroll_node_by(&node, dx, dy).await?)
        }
    };

    Ok(ToolResult::success(json!({
        "direction": params.direction,
        "amount": amount,
        "scroll": info,
    })))
}

pub(super) async fn send_keys(
    session: &AutomationSession,
    params: &SendKeysParams,
) -> Result<ToolResult, BrowserError> {
    if params.keys.trim().is_empty() {
        return Err(BrowserError::InvalidRequest("empty key sequence".to_string()));
    }
    let page = session.page().await?;
    page.send_keys(&params.keys).await?;
    Ok(ToolResult::success(json!({ "keys": params.keys })))
}

pub(super) async fn wait_for_element(
    session: &AutomationSession,
    params: &WaitForElementParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let started = Instant::now();
    let deadline = Duration::from_millis(params.timeout_ms);

    loop {
        if let Some(node) = page.query_selector(&params.selector).await? {
            let summary = page.describe(&node).await?;
            return Ok(ToolResult::success(json!({
                "found": true,
                "selector": params.selector,
                "tag": summary.tag,
                "elapsed_ms": started.elapsed().as_millis() as u64,
            })));
        }
        if started.elapsed() >= deadline {
            // Absence by the deadline is an answer, not an error.
            return Ok(ToolResult::success(json!({
                "found": false,
                "selector": params.selector,
                "timed_out": true,
                "timeout_ms": params.timeout_ms,
            })));
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

pub(super) async fn get_dropdown_options(
    session: &AutomationSession,
    params: &DropdownTargetParams,
) -> Result<ToolResult, BrowserError> {
    let target = params.target().map_err(bad_target)?;
    let page = session.page().await?;
    let node = resolve_target(session, page.as_ref(), &target).await?;

    let options = page.dropdown_options(&node).await?;
    Ok(ToolResult::success(json!({
        "target": target.to_string(),
        "count": options.len(),
        "options": options,
    })))
}

pub(super) async fn select_dropdown_option(
    session: &AutomationSession,
    params: &SelectDropdownOptionParams,
) -> Result<ToolResult, BrowserError> {
    let target = params.target().map_err(bad_target)?;
    if params.value.is_none() && params.label.is_none() {
        return Err(BrowserError::InvalidRequest(
            "provide an option value or label to select".to_string(),
        ));
    }

    let page = session.page().await?;
    let node = resolve_target(session, page.as_ref(), &target).await?;
    let selected = page
        .select_option(&node, params.value.as_deref(), params.label.as_deref())
        .await?;

    Ok(ToolResult::success(json!({
        "target": target.to_string(),
        "selected": selected,
    })))
}

pub(super) async fn highlight_element(
    session: &AutomationSession,
    params: &HighlightParams,
) -> Result<ToolResult, BrowserError> {
    let target = params.target().map_err(bad_target)?;
    let page = session.page().await?;
    let node = resolve_target(session, page.as_ref(), &target).await?;

    page.scroll_into_view(&node).await?;
    page.highlight(&node, &params.color, params.duration_ms)
        .await?;

    Ok(ToolResult::success(json!({
        "target": target.to_string(),
        "color": params.color,
        "duration_ms": params.duration_ms,
    })))
}

pub(super) async fn fill_form(
    session: &AutomationSession,
    params: &FillFormParams,
) -> Result<ToolResult, BrowserError> {
    if params.fields.is_empty() {
        return Err(BrowserError::InvalidRequest("no fields to fill".to_string()));
    }
    let page = session.page().await?;

    let mut outcomes = Vec::with_capacity(params.fields.len());
    let mut filled = 0usize;
    for field in &params.fields {
        match fill_one(page.as_ref(), field).await {
            Ok(value) => {
                filled += 1;
                outcomes.push(json!({
                    "selector": field.selector,
                    "success": true,
                    "value": value,
                }));
            }
            Err(e) => outcomes.push(json!({
                "selector": field.selector,
                "success": false,
                "error": e.to_string(),
            })),
        }
    }

    let total = params.fields.len();
    let data = json!({ "filled": filled, "total": total, "fields": outcomes });
    if filled == total {
        Ok(ToolResult::success(data))
    } else {
        Ok(ToolResult::failure_with_data(
            format!("{} of {total} fields failed", total - filled),
            data,
        ))
    }
}

async fn fill_one(
    page: &dyn PageContext,
    field: &FormField,
) -> Result<Option<String>, BrowserError> {
    let node = page
        .query_selector(&field.selector)
        .await?
        .ok_or_else(|| BrowserError::TargetNotFound(format!("selector '{}'", field.selector)))?;
    let outcome = page.type_text(&node, &field.value, true, false).await?;
    Ok(outcome.value)
}
