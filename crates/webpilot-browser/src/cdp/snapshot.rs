//! Decoding `DOMSnapshot.captureSnapshot` payloads into the structured view.
//!
//! The capture is flattened parallel arrays over a shared string table;
//! layout, styles and form state live in side tables keyed by node slot.
//! This module reassembles them into [`DomNodeData`] trees with
//! viewport-relative geometry, composing same-process iframe documents into
//! `content_document` at the owning element.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use webpilot_protocols::{Rect, ScrollInfo};

use crate::dom::node::{ComputedStyle, DomNodeData, DomSnapshotData, ElementScroll};
use crate::error::BrowserError;

use super::protocol::{CaptureSnapshotResult, DocumentSnapshot};

/// Computed styles requested from the capture, in decode order.
pub(crate) const SNAPSHOT_STYLES: &[&str] = &[
    "display",
    "visibility",
    "opacity",
    "overflow-x",
    "overflow-y",
    "cursor",
    "position",
];

/// Frame nesting bound; past this the capture is not trusted.
const MAX_FRAME_DEPTH: usize = 10;

const NODE_ELEMENT: i64 = 1;
const NODE_TEXT: i64 = 3;
const NODE_DOCUMENT: i64 = 9;
const NODE_FRAGMENT: i64 = 11;

/// Page-level geometry from `Page.getLayoutMetrics`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LayoutMetrics {
    pub viewport: Rect,
    pub scroll: ScrollInfo,
}

/// Decode `Page.getLayoutMetrics` output. Falls back to a nominal viewport
/// when fields are missing rather than failing the whole snapshot.
pub(crate) fn decode_layout_metrics(raw: &Value) -> LayoutMetrics {
    let layout = &raw["cssLayoutViewport"];
    let viewport_width = layout["clientWidth"].as_f64().unwrap_or(1280.0);
    let viewport_height = layout["clientHeight"].as_f64().unwrap_or(1000.0);
    let scroll_x = layout["pageX"].as_f64().unwrap_or(0.0);
    let scroll_y = layout["pageY"].as_f64().unwrap_or(0.0);

    let content = &raw["cssContentSize"];
    let content_width = content["width"].as_f64().unwrap_or(viewport_width);
    let content_height = content["height"].as_f64().unwrap_or(viewport_height);

    LayoutMetrics {
        viewport: Rect::new(0.0, 0.0, viewport_width, viewport_height),
        scroll: ScrollInfo::new(
            scroll_x,
            scroll_y,
            content_width,
            content_height,
            viewport_width,
            viewport_height,
        ),
    }
}

/// Decode a scroll-state object returned by a page script.
pub(crate) fn scroll_info_from_value(value: &Value) -> ScrollInfo {
    ScrollInfo::new(
        value["scrollX"].as_f64().unwrap_or(0.0),
        value["scrollY"].as_f64().unwrap_or(0.0),
        value["contentWidth"].as_f64().unwrap_or(0.0),
        value["contentHeight"].as_f64().unwrap_or(0.0),
        value["viewportWidth"].as_f64().unwrap_or(0.0),
        value["viewportHeight"].as_f64().unwrap_or(0.0),
    )
}

/// Decode a full capture into the structured page view.
pub(crate) fn decode_snapshot(
    raw: Value,
    metrics: &LayoutMetrics,
) -> Result<DomSnapshotData, BrowserError> {
    let capture: CaptureSnapshotResult = serde_json::from_value(raw)?;
    if capture.documents.is_empty() {
        return Err(BrowserError::InvalidResponse(
            "snapshot has no documents".to_string(),
        ));
    }

    let decoder = Decoder { capture: &capture };
    let root_doc = &capture.documents[0];
    let url = decoder.string_opt(root_doc.document_url);
    let title = decoder.string_opt(root_doc.title);
    let root = decoder.decode_document(0, (0.0, 0.0), 0)?;

    Ok(DomSnapshotData {
        url,
        title,
        viewport: metrics.viewport,
        scroll: metrics.scroll,
        root,
    })
}

struct Decoder<'a> {
    capture: &'a CaptureSnapshotResult,
}

/// Per-document lookup tables, built once before the tree walk.
struct DocContext<'a> {
    doc: &'a DocumentSnapshot,
    /// Node slot to layout row.
    layout_by_node: HashMap<usize, usize>,
    /// Node slot to child slots, document order.
    children: Vec<Vec<usize>>,
    /// Node slot to string index of its live value.
    values: HashMap<usize, i64>,
    checked: HashSet<usize>,
    selected: HashSet<usize>,
    /// Iframe node slot to `documents` index of its content.
    content_docs: HashMap<usize, usize>,
    /// Viewport-relative offset of this document's origin.
    origin: (f64, f64),
}

impl<'a> DocContext<'a> {
    fn build(doc: &'a DocumentSnapshot, origin: (f64, f64)) -> Self {
        let node_count = doc.nodes.parent_index.len();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for (idx, &parent) in doc.nodes.parent_index.iter().enumerate() {
            if parent >= 0 && (parent as usize) < node_count {
                children[parent as usize].push(idx);
            }
        }

        let mut layout_by_node = HashMap::new();
        for (row, &node_idx) in doc.layout.node_index.iter().enumerate() {
            if node_idx >= 0 {
                // Keep the first row; later rows are fragments of the same node.
                layout_by_node.entry(node_idx as usize).or_insert(row);
            }
        }

        let mut values = HashMap::new();
        for (&slot, &value) in doc
            .nodes
            .input_value
            .index
            .iter()
            .zip(&doc.nodes.input_value.value)
        {
            values.insert(slot as usize, value);
        }
        for (&slot, &value) in doc
            .nodes
            .text_value
            .index
            .iter()
            .zip(&doc.nodes.text_value.value)
        {
            values.entry(slot as usize).or_insert(value);
        }

        let checked = doc
            .nodes
            .input_checked
            .index
            .iter()
            .map(|&i| i as usize)
            .collect();
        let selected = doc
            .nodes
            .option_selected
            .index
            .iter()
            .map(|&i| i as usize)
            .collect();

        let mut content_docs = HashMap::new();
        for (&slot, &value) in doc
            .nodes
            .content_document_index
            .index
            .iter()
            .zip(&doc.nodes.content_document_index.value)
        {
            if value >= 0 {
                content_docs.insert(slot as usize, value as usize);
            }
        }

        Self {
            doc,
            layout_by_node,
            children,
            values,
            checked,
            selected,
            content_docs,
            origin,
        }
    }

    fn node_type(&self, idx: usize) -> i64 {
        self.doc.nodes.node_type.get(idx).copied().unwrap_or(0)
    }
}

impl Decoder<'_> {
    fn string_idx(&self, idx: i64) -> String {
        if idx < 0 {
            return String::new();
        }
        self.capture
            .strings
            .get(idx as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn string_opt(&self, idx: Option<i64>) -> String {
        idx.map(|i| self.string_idx(i)).unwrap_or_default()
    }

    fn decode_document(
        &self,
        doc_index: usize,
        origin: (f64, f64),
        frame_depth: usize,
    ) -> Result<DomNodeData, BrowserError> {
        if frame_depth > MAX_FRAME_DEPTH {
            return Err(BrowserError::InvalidResponse(
                "snapshot frame nesting too deep".to_string(),
            ));
        }
        let doc = self.capture.documents.get(doc_index).ok_or_else(|| {
            BrowserError::InvalidResponse(format!("snapshot references document {doc_index}"))
        })?;

        let ctx = DocContext::build(doc, origin);
        let node_count = doc.nodes.parent_index.len();
        let root_idx = (0..node_count)
            .find(|&i| doc.nodes.parent_index[i] < 0)
            .unwrap_or(0);

        Ok(self
            .build_node(&ctx, root_idx, frame_depth)?
            .unwrap_or_else(DomNodeData::document))
    }

    fn build_node(
        &self,
        ctx: &DocContext<'_>,
        idx: usize,
        frame_depth: usize,
    ) -> Result<Option<DomNodeData>, BrowserError> {
        let nodes = &ctx.doc.nodes;

        match ctx.node_type(idx) {
            NODE_ELEMENT => {
                let tag = self
                    .string_idx(nodes.node_name.get(idx).copied().unwrap_or(-1))
                    .to_lowercase();
                let mut node = DomNodeData::element(tag);
                node.backend_id = nodes.backend_node_id.get(idx).copied().filter(|&id| id > 0);

                if let Some(pairs) = nodes.attributes.get(idx) {
                    for pair in pairs.chunks_exact(2) {
                        let name = self.string_idx(pair[0]).to_lowercase();
                        node.attributes.insert(name, self.string_idx(pair[1]));
                    }
                }

                if let Some(&row) = ctx.layout_by_node.get(&idx) {
                    node.rect = self.decode_bounds(ctx, row);
                    if let Some(style_row) = ctx.doc.layout.styles.get(row) {
                        node.style = self.decode_style(style_row);
                    }
                    node.scroll = decode_scroll(ctx.doc, row);
                }

                if let Some(&value_idx) = ctx.values.get(&idx) {
                    node.value = Some(self.string_idx(value_idx));
                }
                node.checked = ctx.checked.contains(&idx);
                node.selected = ctx.selected.contains(&idx);

                if let Some(&child_doc) = ctx.content_docs.get(&idx) {
                    // Frames without layout are not rendered; skip their inside.
                    if let Some(rect) = node.rect {
                        node.content_document = Some(Box::new(self.decode_document(
                            child_doc,
                            (rect.x, rect.y),
                            frame_depth + 1,
                        )?));
                    }
                }

                self.collect_children(ctx, idx, &mut node.children, frame_depth)?;
                Ok(Some(node))
            }
            NODE_TEXT => {
                let text = self.string_idx(nodes.node_value.get(idx).copied().unwrap_or(-1));
                Ok(Some(DomNodeData::text_node(text)))
            }
            NODE_DOCUMENT => {
                let mut node = DomNodeData::document();
                node.backend_id = nodes.backend_node_id.get(idx).copied().filter(|&id| id > 0);
                self.collect_children(ctx, idx, &mut node.children, frame_depth)?;
                Ok(Some(node))
            }
            // Comments, doctypes and the rest carry nothing perception uses.
            _ => Ok(None),
        }
    }

    /// Append decoded children of `idx`, splicing shadow-root fragments into
    /// their host's child list.
    fn collect_children(
        &self,
        ctx: &DocContext<'_>,
        idx: usize,
        out: &mut Vec<DomNodeData>,
        frame_depth: usize,
    ) -> Result<(), BrowserError> {
        for &child in &ctx.children[idx] {
            if ctx.node_type(child) == NODE_FRAGMENT {
                self.collect_children(ctx, child, out, frame_depth)?;
            } else if let Some(node) = self.build_node(ctx, child, frame_depth)? {
                out.push(node);
            }
        }
        Ok(())
    }

    /// Bounds arrive in document coordinates; shift by the document's scroll
    /// and its own viewport origin to get viewport-relative geometry.
    fn decode_bounds(&self, ctx: &DocContext<'_>, row: usize) -> Option<Rect> {
        let b = ctx.doc.layout.bounds.get(row)?;
        if b.len() < 4 {
            return None;
        }
        Some(Rect::new(
            b[0] - ctx.doc.scroll_offset_x + ctx.origin.0,
            b[1] - ctx.doc.scroll_offset_y + ctx.origin.1,
            b[2],
            b[3],
        ))
    }

    fn decode_style(&self, row: &[i64]) -> ComputedStyle {
        let value = |pos: usize| -> Option<String> {
            row.get(pos)
                .copied()
                .filter(|&i| i >= 0)
                .map(|i| self.string_idx(i))
        };

        let mut style = ComputedStyle::default();
        if let Some(v) = value(0) {
            style.display = v;
        }
        if let Some(v) = value(1) {
            style.visibility = v;
        }
        if let Some(v) = value(2) {
            style.opacity = v.parse().unwrap_or(1.0);
        }
        if let Some(v) = value(3) {
            style.overflow_x = v;
        }
        if let Some(v) = value(4) {
            style.overflow_y = v;
        }
        if let Some(v) = value(5) {
            style.cursor = v;
        }
        if let Some(v) = value(6) {
            style.position = v;
        }
        style
    }
}

/// Element scroll metrics from the DOM-rects side tables. Only elements
/// whose content actually overflows report metrics; the style gate lives in
/// `dom::visibility::scrollability`.
fn decode_scroll(doc: &DocumentSnapshot, row: usize) -> Option<ElementScroll> {
    let sr = doc.layout.scroll_rects.get(row)?;
    let cr = doc.layout.client_rects.get(row)?;
    if sr.len() < 4 || cr.len() < 4 {
        return None;
    }

    let scroll = ElementScroll {
        scroll_left: sr[0],
        scroll_top: sr[1],
        scroll_width: sr[2],
        scroll_height: sr[3],
        client_width: cr[2],
        client_height: cr[3],
    };

    let overflows = scroll.scroll_height > scroll.client_height + 1.0
        || scroll.scroll_width > scroll.client_width + 1.0;
    overflows.then_some(scroll)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
