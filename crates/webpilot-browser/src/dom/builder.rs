//! Single-pass DOM walk producing the indexed element tree.
//!
//! The walk visits the structured snapshot in document order, elides nodes
//! that are pure styling wrappers, assigns 1-based indices to actionable
//! elements, and renders the indented text tree a decision-maker reads.
//! Indices live in an [`ElementRegistry`] scoped to one snapshot generation;
//! nothing is written back into the page.

use std::collections::BTreeMap;

use tracing::trace;
use webpilot_protocols::{IndexedElement, PageSnapshot, Rect};

use super::interactive::{is_form_control, is_interactive, is_propagating_ancestor};
use super::node::{DomNodeData, DomSnapshotData};
use super::selector::{self, ChainEntry};
use super::text::{collapse_whitespace, compact_attributes, element_text, truncate};
use super::visibility::{
    CONTAINMENT_THRESHOLD, containment_ratio, in_expanded_viewport, is_visible, scrollability,
    visible_through_frames,
};
use crate::config::PerceptionConfig;
use crate::error::BrowserError;

/// Subtrees that never carry an interaction surface.
pub(crate) const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "meta", "link", "title",
];

/// SVG internals. The `svg` root element itself is walked so icon buttons
/// keep their click targets.
pub(crate) const SVG_CHILD_TAGS: &[&str] = &[
    "path",
    "rect",
    "circle",
    "ellipse",
    "line",
    "polyline",
    "polygon",
    "defs",
    "g",
    "use",
    "symbol",
    "lineargradient",
    "radialgradient",
    "stop",
    "mask",
    "clippath",
    "filter",
];

/// Durable handle to one indexed element.
///
/// Actions re-find the node by backend id first and fall back to the
/// recorded selector, so DOM mutations that leave the element attached do
/// not break a click issued against an earlier read.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    pub backend_id: Option<i64>,
    pub css_selector: String,
    pub tag: String,
}

/// Index → node mapping for one snapshot generation.
///
/// Replaced wholesale by every build. Indices from an older generation fail
/// with [`BrowserError::UnknownIndex`] instead of silently resolving to
/// whatever node happens to hold that index now.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    generation: u64,
    entries: BTreeMap<u32, NodeRef>,
}

impl ElementRegistry {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            entries: BTreeMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&NodeRef> {
        self.entries.get(&index)
    }

    /// All entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&u32, &NodeRef)> {
        self.entries.iter()
    }

    /// The entry for `index`, or the error a tool should report.
    pub fn resolve(&self, index: u32) -> Result<&NodeRef, BrowserError> {
        self.entries.get(&index).ok_or(BrowserError::UnknownIndex {
            index,
            generation: self.generation,
        })
    }

    fn insert(&mut self, index: u32, node_ref: NodeRef) {
        self.entries.insert(index, node_ref);
    }
}

/// Everything one perception pass produces.
#[derive(Debug, Clone)]
pub struct BuiltTree {
    pub snapshot: PageSnapshot,
    pub registry: ElementRegistry,
}

/// Walk `data` and produce the snapshot plus the registry for `generation`.
pub fn build_tree(data: &DomSnapshotData, config: &PerceptionConfig, generation: u64) -> BuiltTree {
    let mut walker = Walker {
        config,
        viewport: data.viewport,
        lines: Vec::new(),
        elements: Vec::new(),
        registry: ElementRegistry::new(generation),
        next_index: 1,
        frame_rects: Vec::new(),
    };
    let mut chain = Vec::new();
    walker.walk_children(
        &data.root,
        &data.root,
        &mut chain,
        WalkFrame {
            depth: 0,
            rendered_depth: 0,
            parent_visible: true,
            text_claimed: false,
            suppress_within: None,
        },
    );

    BuiltTree {
        snapshot: PageSnapshot {
            url: data.url.clone(),
            title: data.title.clone(),
            tree_text: walker.lines.join("\n"),
            elements: walker.elements,
            scroll: data.scroll,
            generation,
            screenshot: None,
        },
        registry: walker.registry,
    }
}

/// Per-level walk context, passed down by value.
#[derive(Clone, Copy)]
struct WalkFrame {
    /// Structural recursion depth (guard).
    depth: usize,
    /// Indentation level; only rendered lines advance it.
    rendered_depth: usize,
    /// Whether the immediate parent is visible. Invisible wrappers keep
    /// walking element children but drop their bare text.
    parent_visible: bool,
    /// An indexed ancestor already shows this subtree's text on its line.
    text_claimed: bool,
    /// Bounds of the nearest indexed anchor/button/summary ancestor;
    /// descendants contained in it are not separately indexed.
    suppress_within: Option<Rect>,
}

struct Walker<'a> {
    config: &'a PerceptionConfig,
    viewport: Rect,
    lines: Vec<String>,
    elements: Vec<IndexedElement>,
    registry: ElementRegistry,
    next_index: u32,
    /// Rects of the frame elements enclosing the current document.
    frame_rects: Vec<Rect>,
}

impl<'a> Walker<'a> {
    fn walk_children(
        &mut self,
        parent: &'a DomNodeData,
        doc_root: &'a DomNodeData,
        chain: &mut Vec<ChainEntry<'a>>,
        frame: WalkFrame,
    ) {
        let mut tag_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for child in &parent.children {
            if child.is_text() {
                if frame.parent_visible && !frame.text_claimed {
                    self.render_text(&child.text, frame.rendered_depth);
                }
                continue;
            }
            if !child.is_element() {
                continue;
            }
            let nth = {
                let slot = tag_counts.entry(child.tag.as_str()).or_insert(0);
                *slot += 1;
                *slot
            };
            self.walk_element(child, doc_root, chain, nth, frame);
        }
    }

    fn walk_element(
        &mut self,
        node: &'a DomNodeData,
        doc_root: &'a DomNodeData,
        chain: &mut Vec<ChainEntry<'a>>,
        nth: usize,
        frame: WalkFrame,
    ) {
        if frame.depth >= self.config.max_depth {
            return;
        }
        let tag = node.tag.as_str();
        if tag.is_empty() || SKIPPED_TAGS.contains(&tag) || SVG_CHILD_TAGS.contains(&tag) {
            return;
        }

        chain.push((node, nth));

        let rect = node.rect.unwrap_or_default();
        let visible = is_visible(node) && visible_through_frames(&rect, &self.frame_rects);
        let scrollable = scrollability(node).any();
        let interactive = is_interactive(node);
        let file_input = tag == "input"
            && node
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("file"));

        // File inputs are worth an index even while visually parked
        // off-screen or collapsed, so they skip the viewport test.
        let in_reach = file_input
            || node.rect.is_some_and(|r| {
                in_expanded_viewport(&r, &self.viewport, self.config.viewport_expansion)
            });
        let suppressed = frame.suppress_within.is_some_and(|ancestor| {
            !is_form_control(tag) && containment_ratio(&ancestor, &rect) >= CONTAINMENT_THRESHOLD
        });

        let index = if interactive
            && (visible || file_input)
            && in_reach
            && !suppressed
            && self.elements.len() < self.config.max_elements
        {
            let index = self.next_index;
            self.next_index += 1;
            Some(index)
        } else {
            None
        };

        let rendered = index.is_some() || (scrollable && visible);
        if let Some(index) = index {
            let display_text = element_text(node, self.config.max_text_length);
            let attrs =
                compact_attributes(node, &self.config.preserved_attributes, &display_text);
            let css = selector::css_path(chain, doc_root);
            trace!("[{}] {}", index, selector::debug_path(chain));
            self.registry.insert(
                index,
                NodeRef {
                    backend_id: node.backend_id,
                    css_selector: css.clone(),
                    tag: node.tag.clone(),
                },
            );
            self.render_element(
                node,
                Some(index),
                &attrs,
                &display_text,
                scrollable,
                frame.rendered_depth,
            );
            self.elements.push(IndexedElement {
                index,
                tag: node.tag.clone(),
                role: node.attr("role").map(str::to_string),
                rect,
                visible,
                scrollable,
                attributes: attrs.into_iter().collect(),
                text: display_text,
                css_path: css,
            });
        } else if rendered {
            // Non-actionable scroll container: context line, no index, no
            // text (its content renders below).
            let attrs = compact_attributes(node, &self.config.preserved_attributes, "");
            self.render_element(node, None, &attrs, "", scrollable, frame.rendered_depth);
        }

        let child_frame = WalkFrame {
            depth: frame.depth + 1,
            rendered_depth: frame.rendered_depth + usize::from(rendered),
            parent_visible: visible,
            text_claimed: frame.text_claimed || index.is_some(),
            suppress_within: if index.is_some() && is_propagating_ancestor(tag) {
                node.rect
            } else {
                frame.suppress_within
            },
        };

        // Same-process frame content: selectors do not cross the boundary,
        // so the chain and document root start over. The frame's own rect
        // clips everything inside; a frame without layout contributes no
        // clip entry.
        if let Some(doc) = node.content_document.as_deref() {
            if let Some(clip) = node.rect {
                self.frame_rects.push(clip);
            }
            let mut frame_chain = Vec::new();
            self.walk_children(
                doc,
                doc,
                &mut frame_chain,
                WalkFrame {
                    suppress_within: None,
                    ..child_frame
                },
            );
            if node.rect.is_some() {
                self.frame_rects.pop();
            }
        }

        self.walk_children(node, doc_root, chain, child_frame);
        chain.pop();
    }

    fn render_text(&mut self, raw: &str, rendered_depth: usize) {
        let text = collapse_whitespace(raw);
        if text.is_empty() {
            return;
        }
        let mut line = "\t".repeat(rendered_depth);
        line.push_str(&truncate(&text, self.config.max_text_length));
        self.lines.push(line);
    }

    fn render_element(
        &mut self,
        node: &DomNodeData,
        index: Option<u32>,
        attrs: &[(String, String)],
        display_text: &str,
        scrollable: bool,
        rendered_depth: usize,
    ) {
        let mut line = "\t".repeat(rendered_depth);
        if scrollable {
            line.push_str("[scroll]");
        }
        if let Some(index) = index {
            line.push('[');
            line.push_str(&index.to_string());
            line.push(']');
        }
        line.push('<');
        line.push_str(&node.tag);
        for (name, value) in attrs {
            line.push(' ');
            line.push_str(name);
            if !value.is_empty() {
                line.push('=');
                line.push_str(value);
            }
        }
        if display_text.is_empty() {
            line.push_str("/>");
        } else {
            line.push('>');
            line.push_str(display_text);
            line.push_str("</");
            line.push_str(&node.tag);
            line.push('>');
        }
        if scrollable {
            if let Some(scroll) = &node.scroll {
                let client = scroll.client_height.max(1.0);
                let above = (scroll.scroll_top.max(0.0) / client * 10.0).round() / 10.0;
                let remaining =
                    (scroll.scroll_height - scroll.client_height - scroll.scroll_top).max(0.0);
                let below = (remaining / client * 10.0).round() / 10.0;
                line.push_str(&format!(" ({above:.1} pages above, {below:.1} pages below)"));
            }
        }
        self.lines.push(line);
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
