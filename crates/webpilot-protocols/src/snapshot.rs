//! Page perception data: snapshots, indexed elements, geometry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned rectangle in viewport coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Rectangle grown by `margin` px on every side. A negative margin
    /// shrinks it; the result is clamped to non-negative extent.
    pub fn expanded(&self, margin: f64) -> Self {
        let width = (self.width + 2.0 * margin).max(0.0);
        let height = (self.height + 2.0 * margin).max(0.0);
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width,
            height,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Overlapping region, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// Scroll position and extents of the page (or an element).
///
/// The fractional page counts are what deciders act on: "1.5 pages below"
/// reads better than raw pixel offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollInfo {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub content_width: f64,
    pub content_height: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Viewport-heights of content above the current position.
    pub pages_above: f64,
    /// Viewport-heights of content below the current position.
    pub pages_below: f64,
}

impl ScrollInfo {
    pub fn new(
        scroll_x: f64,
        scroll_y: f64,
        content_width: f64,
        content_height: f64,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Self {
        let vh = viewport_height.max(1.0);
        let below = (content_height - viewport_height - scroll_y).max(0.0);
        Self {
            scroll_x,
            scroll_y,
            content_width,
            content_height,
            viewport_width,
            viewport_height,
            pages_above: (scroll_y.max(0.0) / vh * 10.0).round() / 10.0,
            pages_below: (below / vh * 10.0).round() / 10.0,
        }
    }

    pub fn can_scroll_down(&self) -> bool {
        self.pages_below > 0.0
    }

    pub fn can_scroll_up(&self) -> bool {
        self.pages_above > 0.0
    }

    pub fn can_scroll_right(&self) -> bool {
        self.scroll_x + self.viewport_width < self.content_width - 1.0
    }

    pub fn is_at_top(&self) -> bool {
        self.scroll_y <= 0.0
    }

    pub fn is_at_bottom(&self) -> bool {
        !self.can_scroll_down()
    }
}

/// One interactable element surfaced by a perception pass.
///
/// The index is only meaningful against the snapshot that produced it;
/// a later snapshot reassigns indices from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedElement {
    /// 1-based position in this snapshot, document order.
    pub index: u32,
    /// Lowercase tag name.
    pub tag: String,
    /// ARIA role when one is declared.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    /// Viewport-relative bounds.
    pub rect: Rect,
    pub visible: bool,
    pub scrollable: bool,
    /// Preserved attribute subset, in stable (sorted) order.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Compact display text (value/placeholder/label/alt fallbacks applied).
    pub text: String,
    /// Best-effort unique CSS selector.
    pub css_path: String,
}

/// Everything one perception pass produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    /// Indented text tree handed to the decision-maker.
    pub tree_text: String,
    /// The indexed elements, in index order.
    pub elements: Vec<IndexedElement>,
    pub scroll: ScrollInfo,
    /// Registry generation this snapshot's indices belong to.
    pub generation: u64,
    /// Base64 screenshot, when the orchestrator was asked to capture one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub screenshot: Option<String>,
}

impl PageSnapshot {
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn element(&self, index: u32) -> Option<&IndexedElement> {
        self.elements.iter().find(|e| e.index == index)
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
