//! Structured view of a live DOM, as handed over by a page backend.
//!
//! This is the input side of perception: a plain tree of nodes with the
//! computed-style and geometry facts the tree builder needs. Backends fill
//! it however they can (the CDP backend decodes `DOMSnapshot.captureSnapshot`
//! into it); the builder never talks to a page directly.

use std::collections::BTreeMap;
use webpilot_protocols::{Rect, ScrollInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
}

/// The computed-style subset perception cares about.
///
/// Values default to the visible/neutral case so synthetic trees in tests
/// stay terse; `rect: None` is what makes a node invisible by default.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f32,
    pub overflow_x: String,
    pub overflow_y: String,
    pub cursor: String,
    pub position: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
            overflow_x: "visible".to_string(),
            overflow_y: "visible".to_string(),
            cursor: "auto".to_string(),
            position: "static".to_string(),
        }
    }
}

/// Scroll metrics of one element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementScroll {
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub client_width: f64,
    pub client_height: f64,
}

/// One node of the structured DOM view.
///
/// Shadow-root children are spliced into `children` in document order.
/// Same-process iframe content hangs off `content_document`; cross-origin
/// frames have none (their inside cannot be inspected).
#[derive(Debug, Clone, PartialEq)]
pub struct DomNodeData {
    pub kind: NodeKind,
    /// Lowercase tag name; empty for text nodes, `#document` for documents.
    pub tag: String,
    /// Text payload for text nodes.
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    /// Durable CDP node reference, when the backend has one.
    pub backend_id: Option<i64>,
    /// Viewport-relative bounds; `None` when the node has no layout.
    pub rect: Option<Rect>,
    pub style: ComputedStyle,
    /// Present only on elements that can scroll their content.
    pub scroll: Option<ElementScroll>,
    /// Live `value` of inputs/textareas/selects.
    pub value: Option<String>,
    pub checked: bool,
    pub selected: bool,
    pub content_document: Option<Box<DomNodeData>>,
    pub children: Vec<DomNodeData>,
}

impl DomNodeData {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: tag.into().to_lowercase(),
            text: String::new(),
            attributes: BTreeMap::new(),
            backend_id: None,
            rect: None,
            style: ComputedStyle::default(),
            scroll: None,
            value: None,
            checked: false,
            selected: false,
            content_document: None,
            children: Vec::new(),
        }
    }

    pub fn document() -> Self {
        let mut node = Self::element("#document");
        node.kind = NodeKind::Document;
        node
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        let mut node = Self::element("");
        node.kind = NodeKind::Text;
        node.text = text.into();
        node
    }

    // Builder-style setters, used by backends and synthetic test trees.

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into().to_lowercase(), value.into());
        self
    }

    pub fn with_rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rect = Some(Rect::new(x, y, width, height));
        self
    }

    pub fn with_backend_id(mut self, id: i64) -> Self {
        self.backend_id = Some(id);
        self
    }

    pub fn with_style(mut self, f: impl FnOnce(&mut ComputedStyle)) -> Self {
        f(&mut self.style);
        self
    }

    pub fn with_scroll(mut self, scroll: ElementScroll) -> Self {
        self.scroll = Some(scroll);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_child(mut self, child: DomNodeData) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DomNodeData>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Self::text_node(text))
    }

    pub fn with_content_document(mut self, doc: DomNodeData) -> Self {
        self.content_document = Some(Box::new(doc));
        self
    }

    // Accessors.

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Space-separated class list.
    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Depth-first search by backend id, piercing frame documents.
    pub fn find_by_backend_id(&self, id: i64) -> Option<&DomNodeData> {
        if self.backend_id == Some(id) {
            return Some(self);
        }
        if let Some(doc) = &self.content_document {
            if let Some(found) = doc.find_by_backend_id(id) {
                return Some(found);
            }
        }
        self.children.iter().find_map(|c| c.find_by_backend_id(id))
    }

    /// Mutable variant of [`find_by_backend_id`](Self::find_by_backend_id).
    pub fn find_by_backend_id_mut(&mut self, id: i64) -> Option<&mut DomNodeData> {
        if self.backend_id == Some(id) {
            return Some(self);
        }
        if let Some(doc) = &mut self.content_document {
            if let Some(found) = doc.find_by_backend_id_mut(id) {
                return Some(found);
            }
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_by_backend_id_mut(id))
    }
}

/// A whole-page structured view: the document tree plus page-level facts.
#[derive(Debug, Clone, PartialEq)]
pub struct DomSnapshotData {
    pub url: String,
    pub title: String,
    /// Visible viewport, origin at (0, 0).
    pub viewport: Rect,
    pub scroll: ScrollInfo,
    pub root: DomNodeData,
}

impl DomSnapshotData {
    pub fn new(url: impl Into<String>, title: impl Into<String>, root: DomNodeData) -> Self {
        let viewport = Rect::new(0.0, 0.0, 1280.0, 1000.0);
        Self {
            url: url.into(),
            title: title.into(),
            viewport,
            scroll: ScrollInfo::new(0.0, 0.0, 1280.0, 1000.0, 1280.0, 1000.0),
            root,
        }
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
