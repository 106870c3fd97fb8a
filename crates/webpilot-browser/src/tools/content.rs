//! Content and query executors: page text, element tree, search, links,
//! metadata, script evaluation, screenshots.

use std::collections::BTreeSet;

use serde_json::json;
use webpilot_protocols::{
    CaptureParams, EvaluateJsParams, ExtractLinksParams, FindElementsParams, GetElementsParams,
    GetPageTextParams, SearchPageParams, ToolResult,
};

use crate::dom::interactive::{detect_pagination, is_search_affordance};
use crate::dom::node::DomNodeData;
use crate::error::BrowserError;
use crate::markdown::{chunk, extract_markdown};
use crate::query;

use super::AutomationSession;

/// Trailing lines of the previous chunk repeated as context.
const TEXT_OVERLAP_LINES: usize = 2;

pub(super) async fn get_page_text(
    session: &AutomationSession,
    params: &GetPageTextParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let data = page.dom_snapshot().await?;
    let markdown = extract_markdown(&data.root, &data.url, params.include_links);
    let total_chars = markdown.chars().count();

    let chunks = chunk(
        &markdown,
        params.max_length,
        TEXT_OVERLAP_LINES,
        params.start_from_char,
    );
    let Some(first) = chunks.first() else {
        return Ok(ToolResult::success(json!({
            "url": data.url,
            "title": data.title,
            "text": "",
            "total_chars": total_chars,
            "start_char": params.start_from_char,
            "end_char": params.start_from_char,
            "has_more": false,
        })));
    };

    Ok(ToolResult::success(json!({
        "url": data.url,
        "title": data.title,
        "text": first.text,
        "total_chars": total_chars,
        "start_char": first.start_char,
        "end_char": first.end_char,
        "has_more": first.has_more,
        "chunks_total": first.total,
    })))
}

pub(super) async fn get_elements(
    session: &AutomationSession,
    params: &GetElementsParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let data = page.dom_snapshot().await?;
    let (snapshot, registry) =
        session.install_tree(&data, params.viewport_expansion, params.max_depth);

    let mut search_ids = BTreeSet::new();
    collect_search_ids(&data.root, &mut search_ids);
    let search_elements: Vec<u32> = registry
        .iter()
        .filter(|(_, r)| r.backend_id.is_some_and(|id| search_ids.contains(&id)))
        .map(|(index, _)| *index)
        .collect();

    let pagination: Vec<_> = detect_pagination(&snapshot.elements)
        .into_iter()
        .map(|c| {
            json!({
                "index": c.index,
                "kind": c.kind.to_string(),
                "disabled": c.disabled,
            })
        })
        .collect();

    Ok(ToolResult::success(json!({
        "url": snapshot.url,
        "title": snapshot.title,
        "element_count": snapshot.element_count(),
        "tree": snapshot.tree_text,
        "scroll": snapshot.scroll,
        "generation": snapshot.generation,
        "search_elements": search_elements,
        "pagination": pagination,
    })))
}

fn collect_search_ids(node: &DomNodeData, out: &mut BTreeSet<i64>) {
    if node.is_element() && is_search_affordance(node) {
        if let Some(id) = node.backend_id {
            out.insert(id);
        }
    }
    for child in &node.children {
        collect_search_ids(child, out);
    }
}

pub(super) async fn search_page(
    session: &AutomationSession,
    params: &SearchPageParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let data = page.dom_snapshot().await?;
    let text = extract_markdown(&data.root, &data.url, false);

    let matches = query::search_text(
        &text,
        &params.pattern,
        params.regex,
        params.case_sensitive,
        params.max_matches,
        params.context_chars,
    )?;

    Ok(ToolResult::success(json!({
        "pattern": params.pattern,
        "count": matches.len(),
        "matches": matches,
    })))
}

pub(super) async fn find_elements(
    session: &AutomationSession,
    params: &FindElementsParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let data = page.dom_snapshot().await?;
    let elements =
        query::find_elements(&data, &params.selector, params.limit, params.visible_only)?;

    Ok(ToolResult::success(json!({
        "selector": params.selector,
        "count": elements.len(),
        "elements": elements,
    })))
}

pub(super) async fn evaluate_js(
    session: &AutomationSession,
    params: &EvaluateJsParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let value = page.eval(&params.code).await?;
    Ok(ToolResult::success(json!({ "result": value })))
}

pub(super) async fn capture_visible_tab(
    session: &AutomationSession,
    params: &CaptureParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let data = page.screenshot(params.format, params.quality).await?;
    Ok(ToolResult::success(json!({
        "format": params.format.as_str(),
        "base64": data,
    })))
}

pub(super) async fn extract_links(
    session: &AutomationSession,
    params: &ExtractLinksParams,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let data = page.dom_snapshot().await?;
    let links = query::extract_links(&data, params.internal_only, params.limit);

    Ok(ToolResult::success(json!({
        "count": links.len(),
        "links": links,
    })))
}

pub(super) async fn get_page_metadata(
    session: &AutomationSession,
) -> Result<ToolResult, BrowserError> {
    let page = session.page().await?;
    let data = page.dom_snapshot().await?;
    let metadata = query::page_metadata(&data);
    Ok(ToolResult::success(serde_json::to_value(metadata)?))
}
