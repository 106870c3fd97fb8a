//! In-memory page and host doubles for tests.
//!
//! `FakePage` implements [`PageContext`] over a mutable [`DomSnapshotData`]:
//! selectors run through the snapshot matcher, typing edits node values,
//! scrolling clamps against the recorded content extents, and every input
//! call is journaled so tests can assert on what reached the page. No
//! browser, no I/O, no sleeps outside `wait_for_load`.
//!
//! This module is compiled unconditionally so downstream crates can drive
//! their own harnesses with it; nothing here belongs in production paths.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use webpilot_protocols::{CaptureFormat, ScrollInfo};

use crate::dom::node::{DomNodeData, DomSnapshotData};
use crate::dom::selector;
use crate::dom::text::element_text;
use crate::error::BrowserError;
use crate::page::{
    BrowserHost, DropdownOption, ElementSummary, NodeHandle, PageContext, TypeOutcome,
};

/// Everything the fake journals about calls made against it.
#[derive(Debug, Default)]
struct Journal {
    clicks: Vec<(f64, f64)>,
    node_clicks: Vec<i64>,
    key_presses: Vec<String>,
    navigations: Vec<String>,
    highlights: Vec<(i64, String)>,
    eval_calls: Vec<String>,
    screenshots: Vec<String>,
}

struct FakeState {
    snapshot: DomSnapshotData,
    ready_state: String,
    /// Earlier URLs, most recent last; `go_back` pops from here.
    history: Vec<String>,
    /// Snapshots installed when navigation reaches their URL.
    routes: BTreeMap<String, DomSnapshotData>,
    /// Queued results handed out by `eval`/`call_on_node`, front first.
    eval_results: VecDeque<Value>,
    journal: Journal,
}

/// A scriptable, inspectable [`PageContext`].
pub struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    /// Wrap a snapshot. Elements without a backend id get one assigned so
    /// handles and registries work the same as against a real page.
    pub fn new(mut snapshot: DomSnapshotData) -> Arc<Self> {
        let mut next = max_backend_id(&snapshot.root) + 1;
        assign_backend_ids(&mut snapshot.root, &mut next);
        Arc::new(Self {
            state: Mutex::new(FakeState {
                snapshot,
                ready_state: "complete".to_string(),
                history: Vec::new(),
                routes: BTreeMap::new(),
                eval_results: VecDeque::new(),
                journal: Journal::default(),
            }),
        })
    }

    /// A minimal blank page, for tests that only exercise navigation.
    pub fn blank(url: &str) -> Arc<Self> {
        Self::new(blank_snapshot(url))
    }

    // ----- scripting -----

    /// Replace the current document wholesale.
    pub fn set_snapshot(&self, mut snapshot: DomSnapshotData) {
        let mut next = max_backend_id(&snapshot.root) + 1;
        assign_backend_ids(&mut snapshot.root, &mut next);
        self.state.lock().snapshot = snapshot;
    }

    /// Serve `snapshot` when navigation reaches `url`.
    pub fn add_route(&self, url: &str, mut snapshot: DomSnapshotData) {
        let mut next = max_backend_id(&snapshot.root) + 1;
        assign_backend_ids(&mut snapshot.root, &mut next);
        self.state.lock().routes.insert(url.to_string(), snapshot);
    }

    pub fn set_ready_state(&self, state: &str) {
        self.state.lock().ready_state = state.to_string();
    }

    /// Queue the value the next `eval`/`call_on_node` returns.
    pub fn push_eval_result(&self, value: Value) {
        self.state.lock().eval_results.push_back(value);
    }

    /// Detach a node from the document, as if the page removed it.
    pub fn remove_node(&self, backend_id: i64) -> bool {
        detach(&mut self.state.lock().snapshot.root, backend_id)
    }

    /// Backend id of the first match, for building handles in tests.
    pub fn backend_id_of(&self, css: &str) -> Option<i64> {
        let state = self.state.lock();
        selector::query_first(&state.snapshot.root, css)
            .ok()
            .flatten()
            .and_then(|n| n.backend_id)
    }

    // ----- journal -----

    pub fn clicks(&self) -> Vec<(f64, f64)> {
        self.state.lock().journal.clicks.clone()
    }

    pub fn node_clicks(&self) -> Vec<i64> {
        self.state.lock().journal.node_clicks.clone()
    }

    pub fn key_presses(&self) -> Vec<String> {
        self.state.lock().journal.key_presses.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().journal.navigations.clone()
    }

    pub fn highlights(&self) -> Vec<(i64, String)> {
        self.state.lock().journal.highlights.clone()
    }

    pub fn eval_calls(&self) -> Vec<String> {
        self.state.lock().journal.eval_calls.clone()
    }

    /// Formats of captured screenshots, in capture order.
    pub fn screenshots(&self) -> Vec<String> {
        self.state.lock().journal.screenshots.clone()
    }

    /// Current value of the first match, for asserting typing effects.
    pub fn value_of(&self, css: &str) -> Option<String> {
        let state = self.state.lock();
        selector::query_first(&state.snapshot.root, css)
            .ok()
            .flatten()
            .and_then(|n| n.value.clone())
    }

    // ----- internals -----

    fn summarize(node: &DomNodeData) -> ElementSummary {
        ElementSummary {
            tag: node.tag.clone(),
            input_type: if node.tag == "input" {
                Some(
                    node.attr("type")
                        .map(str::to_lowercase)
                        .unwrap_or_else(|| "text".to_string()),
                )
            } else {
                None
            },
            content_editable: matches!(node.attr("contenteditable"), Some("" | "true")),
            value: node.value.clone(),
            text: element_text(node, 80),
            rect: node.rect.unwrap_or_default(),
        }
    }
}

fn install_url(state: &mut FakeState, url: &str) {
    let snapshot = state
        .routes
        .get(url)
        .cloned()
        .unwrap_or_else(|| blank_snapshot(url));
    state.snapshot = snapshot;
    state.ready_state = "complete".to_string();
}

fn blank_snapshot(url: &str) -> DomSnapshotData {
    let root = DomNodeData::document().with_child(
        DomNodeData::element("html")
            .with_rect(0.0, 0.0, 1280.0, 1000.0)
            .with_child(DomNodeData::element("body").with_rect(0.0, 0.0, 1280.0, 1000.0)),
    );
    DomSnapshotData::new(url, "", root)
}

fn max_backend_id(node: &DomNodeData) -> i64 {
    let mut max = node.backend_id.unwrap_or(0);
    if let Some(doc) = &node.content_document {
        max = max.max(max_backend_id(doc));
    }
    for child in &node.children {
        max = max.max(max_backend_id(child));
    }
    max
}

fn assign_backend_ids(node: &mut DomNodeData, next: &mut i64) {
    if node.is_element() && node.backend_id.is_none() {
        node.backend_id = Some(*next);
        *next += 1;
    }
    if let Some(doc) = &mut node.content_document {
        assign_backend_ids(doc, next);
    }
    for child in &mut node.children {
        assign_backend_ids(child, next);
    }
}

fn detach(node: &mut DomNodeData, id: i64) -> bool {
    if let Some(pos) = node
        .children
        .iter()
        .position(|c| c.backend_id == Some(id))
    {
        node.children.remove(pos);
        return true;
    }
    if let Some(doc) = &mut node.content_document {
        if detach(doc, id) {
            return true;
        }
    }
    node.children.iter_mut().any(|c| detach(c, id))
}

/// Whether the node with `id` sits inside a `<form>`. `None` when the node
/// is not in this subtree at all.
fn form_membership(node: &DomNodeData, id: i64, inside: bool) -> Option<bool> {
    if node.backend_id == Some(id) {
        return Some(inside);
    }
    let inside = inside || node.tag == "form";
    if let Some(doc) = &node.content_document {
        if let Some(hit) = form_membership(doc, id, inside) {
            return Some(hit);
        }
    }
    node.children
        .iter()
        .find_map(|c| form_membership(c, id, inside))
}

fn deepest_at_point(node: &DomNodeData, x: f64, y: f64, best: &mut Option<i64>) {
    if node.is_element() && !node.tag.starts_with('#') {
        match node.rect {
            Some(r) if r.contains_point(x, y) => *best = node.backend_id.or(*best),
            _ => {}
        }
    }
    if let Some(doc) = &node.content_document {
        deepest_at_point(doc, x, y, best);
    }
    for child in &node.children {
        deepest_at_point(child, x, y, best);
    }
}

fn option_entries(select: &DomNodeData) -> Vec<DropdownOption> {
    select
        .children
        .iter()
        .filter(|c| c.tag == "option")
        .enumerate()
        .map(|(i, opt)| {
            let label = element_text(opt, 80);
            DropdownOption {
                index: i as u32,
                value: opt
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| label.clone()),
                label,
                selected: opt.selected,
            }
        })
        .collect()
}

fn missing(handle: &NodeHandle) -> BrowserError {
    BrowserError::TargetNotFound(format!("backend node {}", handle.backend_id))
}

#[async_trait]
impl PageContext for FakePage {
    async fn dom_snapshot(&self) -> Result<DomSnapshotData, BrowserError> {
        Ok(self.state.lock().snapshot.clone())
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self.state.lock().snapshot.url.clone())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(self.state.lock().snapshot.title.clone())
    }

    async fn ready_state(&self) -> Result<String, BrowserError> {
        Ok(self.state.lock().ready_state.clone())
    }

    async fn eval(&self, expression: &str) -> Result<Value, BrowserError> {
        let mut state = self.state.lock();
        state.journal.eval_calls.push(expression.to_string());
        Ok(state.eval_results.pop_front().unwrap_or(Value::Null))
    }

    async fn call_on_node(
        &self,
        node: &NodeHandle,
        function: &str,
        _args: Vec<Value>,
    ) -> Result<Value, BrowserError> {
        let mut state = self.state.lock();
        if state.snapshot.root.find_by_backend_id(node.backend_id).is_none() {
            return Err(missing(node));
        }
        state.journal.eval_calls.push(function.to_string());
        Ok(state.eval_results.pop_front().unwrap_or(Value::Null))
    }

    async fn query_selector(
        &self,
        css: &str,
    ) -> Result<Option<NodeHandle>, BrowserError> {
        let state = self.state.lock();
        let found = selector::query_first(&state.snapshot.root, css)
            .map_err(|e| BrowserError::InvalidRequest(e.to_string()))?;
        Ok(found.and_then(|n| n.backend_id).map(NodeHandle::new))
    }

    async fn query_selector_all(
        &self,
        css: &str,
        limit: usize,
    ) -> Result<Vec<NodeHandle>, BrowserError> {
        let state = self.state.lock();
        let found = selector::query_all(&state.snapshot.root, css, limit)
            .map_err(|e| BrowserError::InvalidRequest(e.to_string()))?;
        Ok(found
            .iter()
            .filter_map(|n| n.backend_id)
            .map(NodeHandle::new)
            .collect())
    }

    async fn node_at_point(&self, x: f64, y: f64) -> Result<Option<NodeHandle>, BrowserError> {
        let state = self.state.lock();
        let mut best = None;
        deepest_at_point(&state.snapshot.root, x, y, &mut best);
        Ok(best.map(NodeHandle::new))
    }

    async fn node_by_backend_id(
        &self,
        backend_id: i64,
    ) -> Result<Option<NodeHandle>, BrowserError> {
        let state = self.state.lock();
        Ok(state
            .snapshot
            .root
            .find_by_backend_id(backend_id)
            .map(|_| NodeHandle::new(backend_id)))
    }

    async fn describe(&self, node: &NodeHandle) -> Result<ElementSummary, BrowserError> {
        let state = self.state.lock();
        state
            .snapshot
            .root
            .find_by_backend_id(node.backend_id)
            .map(Self::summarize)
            .ok_or_else(|| missing(node))
    }

    async fn scroll_into_view(&self, node: &NodeHandle) -> Result<(), BrowserError> {
        let state = self.state.lock();
        state
            .snapshot
            .root
            .find_by_backend_id(node.backend_id)
            .map(|_| ())
            .ok_or_else(|| missing(node))
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), BrowserError> {
        self.state.lock().journal.clicks.push((x, y));
        Ok(())
    }

    async fn click_node(&self, node: &NodeHandle) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        if state.snapshot.root.find_by_backend_id(node.backend_id).is_none() {
            return Err(missing(node));
        }
        state.journal.node_clicks.push(node.backend_id);
        Ok(())
    }

    async fn type_text(
        &self,
        node: &NodeHandle,
        text: &str,
        clear: bool,
        press_enter: bool,
    ) -> Result<TypeOutcome, BrowserError> {
        let mut state = self.state.lock();
        let in_form = form_membership(&state.snapshot.root, node.backend_id, false);
        let target = state
            .snapshot
            .root
            .find_by_backend_id_mut(node.backend_id)
            .ok_or_else(|| missing(node))?;
        let value = if clear {
            text.to_string()
        } else {
            format!("{}{text}", target.value.as_deref().unwrap_or(""))
        };
        target.value = Some(value.clone());
        let tag = target.tag.clone();
        if press_enter {
            state.journal.key_presses.push("Enter".to_string());
        }
        Ok(TypeOutcome {
            submitted: press_enter && tag == "input" && in_form == Some(true),
            tag,
            value: Some(value),
        })
    }

    async fn send_keys(&self, keys: &str) -> Result<(), BrowserError> {
        self.state.lock().journal.key_presses.push(keys.to_string());
        Ok(())
    }

    async fn dropdown_options(
        &self,
        node: &NodeHandle,
    ) -> Result<Vec<DropdownOption>, BrowserError> {
        let state = self.state.lock();
        let select = state
            .snapshot
            .root
            .find_by_backend_id(node.backend_id)
            .ok_or_else(|| missing(node))?;
        Ok(option_entries(select))
    }

    async fn select_option(
        &self,
        node: &NodeHandle,
        value: Option<&str>,
        label: Option<&str>,
    ) -> Result<DropdownOption, BrowserError> {
        let mut state = self.state.lock();
        let select = state
            .snapshot
            .root
            .find_by_backend_id_mut(node.backend_id)
            .ok_or_else(|| missing(node))?;
        let entries = option_entries(select);
        let chosen = entries
            .iter()
            .find(|o| value.is_some_and(|v| o.value == v))
            .or_else(|| entries.iter().find(|o| label.is_some_and(|l| o.label == l)))
            .cloned();
        let Some(mut chosen) = chosen else {
            let wanted = value.or(label).unwrap_or_default();
            return Err(BrowserError::TargetNotFound(format!("option '{wanted}'")));
        };
        for (i, opt) in select
            .children
            .iter_mut()
            .filter(|c| c.tag == "option")
            .enumerate()
        {
            opt.selected = i as u32 == chosen.index;
        }
        select.value = Some(chosen.value.clone());
        chosen.selected = true;
        Ok(chosen)
    }

    async fn highlight(
        &self,
        node: &NodeHandle,
        color: &str,
        _duration_ms: u64,
    ) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        if state.snapshot.root.find_by_backend_id(node.backend_id).is_none() {
            return Err(missing(node));
        }
        state
            .journal
            .highlights
            .push((node.backend_id, color.to_string()));
        Ok(())
    }

    async fn scroll_by(&self, dx: f64, dy: f64) -> Result<ScrollInfo, BrowserError> {
        let mut state = self.state.lock();
        let s = state.snapshot.scroll;
        let max_x = (s.content_width - s.viewport_width).max(0.0);
        let max_y = (s.content_height - s.viewport_height).max(0.0);
        let next = ScrollInfo::new(
            (s.scroll_x + dx).clamp(0.0, max_x),
            (s.scroll_y + dy).clamp(0.0, max_y),
            s.content_width,
            s.content_height,
            s.viewport_width,
            s.viewport_height,
        );
        state.snapshot.scroll = next;
        Ok(next)
    }

    async fn scroll_node_by(
        &self,
        node: &NodeHandle,
        dx: f64,
        dy: f64,
    ) -> Result<ScrollInfo, BrowserError> {
        let mut state = self.state.lock();
        let target = state
            .snapshot
            .root
            .find_by_backend_id_mut(node.backend_id)
            .ok_or_else(|| missing(node))?;
        let mut s = target.scroll.unwrap_or_default();
        let max_x = (s.scroll_width - s.client_width).max(0.0);
        let max_y = (s.scroll_height - s.client_height).max(0.0);
        s.scroll_left = (s.scroll_left + dx).clamp(0.0, max_x);
        s.scroll_top = (s.scroll_top + dy).clamp(0.0, max_y);
        target.scroll = Some(s);
        Ok(ScrollInfo::new(
            s.scroll_left,
            s.scroll_top,
            s.scroll_width,
            s.scroll_height,
            s.client_width,
            s.client_height,
        ))
    }

    async fn scroll_info(&self) -> Result<ScrollInfo, BrowserError> {
        Ok(self.state.lock().snapshot.scroll)
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        let from = state.snapshot.url.clone();
        state.history.push(from);
        state.journal.navigations.push(url.to_string());
        install_url(&mut state, url);
        Ok(())
    }

    async fn go_back(&self) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        let Some(url) = state.history.pop() else {
            return Err(BrowserError::NavigationFailed(
                "no earlier history entry".to_string(),
            ));
        };
        install_url(&mut state, &url);
        Ok(())
    }

    async fn wait_for_load(&self, timeout_ms: u64) -> Result<(), BrowserError> {
        if self.state.lock().ready_state == "complete" {
            Ok(())
        } else {
            Err(BrowserError::Timeout(timeout_ms))
        }
    }

    async fn screenshot(
        &self,
        format: CaptureFormat,
        _quality: Option<u8>,
    ) -> Result<String, BrowserError> {
        self.state
            .lock()
            .journal
            .screenshots
            .push(format.as_str().to_string());
        // "fake" in base64.
        Ok("ZmFrZQ==".to_string())
    }
}

/// [`BrowserHost`] over a single [`FakePage`].
pub struct FakeHost {
    page: Arc<FakePage>,
    opened: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new(page: Arc<FakePage>) -> Arc<Self> {
        Arc::new(Self {
            page,
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn page(&self) -> Arc<FakePage> {
        self.page.clone()
    }

    /// URLs opened as new tabs. The fake routes them through the one page.
    pub fn opened_tabs(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl BrowserHost for FakeHost {
    async fn active_page(&self) -> Result<Arc<dyn PageContext>, BrowserError> {
        Ok(self.page.clone())
    }

    async fn open_page(&self, url: &str) -> Result<Arc<dyn PageContext>, BrowserError> {
        self.opened.lock().push(url.to_string());
        self.page.navigate(url).await?;
        Ok(self.page.clone())
    }
}

#[cfg(test)]
#[path = "testing_tests.rs"]
mod tests;
