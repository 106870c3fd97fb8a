//! Visibility, viewport, scrollability and containment predicates.
//!
//! These are pure functions over [`DomNodeData`]; the tree builder strings
//! them together, and the classifier leans on a couple of them too.

use super::node::DomNodeData;
use webpilot_protocols::Rect;

/// Containment ratio above which a descendant of a propagating-interactive
/// ancestor is folded into the ancestor instead of indexed separately.
pub const CONTAINMENT_THRESHOLD: f64 = 0.8;

/// Style-and-geometry visibility of a single node, ignoring ancestors.
///
/// A node with no layout rect is treated as not rendered. The off-screen
/// check only fires for positioned elements parked at large negative
/// offsets (the classic screen-reader-only pattern); elements merely
/// below the fold stay "visible" and are filtered by the viewport test.
pub fn is_visible(node: &DomNodeData) -> bool {
    let Some(rect) = node.rect else {
        return false;
    };
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return false;
    }
    if node.style.display == "none" || node.style.visibility == "hidden" {
        return false;
    }
    if node.style.opacity <= 0.0 {
        return false;
    }
    if matches!(node.style.position.as_str(), "absolute" | "fixed")
        && (rect.right() <= -100.0 || rect.bottom() <= -100.0)
    {
        return false;
    }
    true
}

/// Whether `rect` falls inside the viewport expanded by `expansion` px.
/// A negative expansion means "report everything".
pub fn in_expanded_viewport(rect: &Rect, viewport: &Rect, expansion: i64) -> bool {
    if expansion < 0 {
        return true;
    }
    rect.intersects(&viewport.expanded(expansion as f64))
}

/// Per-axis scrollability of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scrollability {
    pub vertical: bool,
    pub horizontal: bool,
}

impl Scrollability {
    pub fn any(&self) -> bool {
        self.vertical || self.horizontal
    }
}

fn overflow_allows_scroll(overflow: &str) -> bool {
    matches!(overflow, "auto" | "scroll" | "overlay")
}

/// An element scrolls on an axis when its content overflows by more than a
/// pixel and its overflow style actually permits scrolling there.
pub fn scrollability(node: &DomNodeData) -> Scrollability {
    let Some(scroll) = node.scroll else {
        return Scrollability::default();
    };
    Scrollability {
        vertical: scroll.scroll_height > scroll.client_height + 1.0
            && overflow_allows_scroll(&node.style.overflow_y),
        horizontal: scroll.scroll_width > scroll.client_width + 1.0
            && overflow_allows_scroll(&node.style.overflow_x),
    }
}

/// Fraction of `child` covered by `parent` (0.0 when the child has no area).
pub fn containment_ratio(parent: &Rect, child: &Rect) -> f64 {
    let child_area = child.area();
    if child_area <= 0.0 {
        return 0.0;
    }
    match parent.intersection(child) {
        Some(overlap) => overlap.area() / child_area,
        None => 0.0,
    }
}

/// Visibility of an element that lives inside (possibly nested) frames.
///
/// Frames clip their content, so the element must intersect every enclosing
/// frame rect we can see. An empty chain means the element sits in the top
/// document. Past a frame whose inside we cannot inspect there is nothing to
/// check, so content reachable at all is assumed visible at that boundary;
/// callers encode that by simply not having deeper entries in the chain.
pub fn visible_through_frames(rect: &Rect, frame_chain: &[Rect]) -> bool {
    frame_chain.iter().all(|frame| rect.intersects(frame))
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
