//! Interactive-element classification.
//!
//! Decides whether a node deserves an index in the element tree, plus two
//! advisory heuristics layered on top: search-box detection and pagination
//! control detection. The priority order matters: native semantics win,
//! `cursor: pointer` is the last resort because whole card layouts inherit
//! it.

use super::node::DomNodeData;
use webpilot_protocols::IndexedElement;

/// Tags that are actionable by their nature.
pub const INTERACTIVE_TAGS: &[&str] = &[
    "a", "button", "input", "textarea", "select", "option", "details", "summary",
];

/// ARIA roles that mark a node actionable regardless of tag.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "link",
    "checkbox",
    "radio",
    "textbox",
    "combobox",
    "listbox",
    "option",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "tab",
    "switch",
    "slider",
    "spinbutton",
    "searchbox",
    "treeitem",
    "gridcell",
];

/// Attributes that wire up click behavior, including the common framework
/// bindings that survive into served HTML.
pub const CLICK_ATTRIBUTES: &[&str] = &[
    "onclick",
    "onmousedown",
    "onmouseup",
    "ontouchstart",
    "ontouchend",
    "ng-click",
    "@click",
    "v-on:click",
    "data-onclick",
    "data-action",
    "jsaction",
];

/// Substrings that flag an element as a search affordance.
const SEARCH_VOCABULARY: &[&str] = &[
    "search",
    "query",
    "searchbox",
    "search-input",
    "search-field",
    "typeahead",
    "autocomplete",
];

/// Is this node actionable?
pub fn is_interactive(node: &DomNodeData) -> bool {
    if !node.is_element() {
        return false;
    }
    let tag = node.tag.as_str();

    // (a) Native interactive tags. Hidden inputs carry no affordance.
    if INTERACTIVE_TAGS.contains(&tag) {
        return !(tag == "input" && node.attr("type") == Some("hidden"));
    }
    if matches!(tag, "audio" | "video") && node.has_attr("controls") {
        return true;
    }

    // (b) Wrappers that proxy a real control (label > input, span > checkbox).
    if matches!(tag, "label" | "span") && wraps_native_control(node, 3) {
        return true;
    }

    // (c) Explicit wiring: click handlers, focusability, editability.
    if CLICK_ATTRIBUTES.iter().any(|a| node.has_attr(a)) {
        return true;
    }
    if let Some(tabindex) = node.attr("tabindex") {
        if tabindex.parse::<i32>().map(|t| t >= 0).unwrap_or(false) {
            return true;
        }
    }
    if matches!(node.attr("contenteditable"), Some("true") | Some("")) {
        return true;
    }

    // (d) ARIA roles.
    if let Some(role) = node.attr("role") {
        if INTERACTIVE_ROLES.contains(&role.to_lowercase().as_str()) {
            return true;
        }
    }

    // (e) Styling that promises a click target.
    node.style.cursor == "pointer"
}

fn wraps_native_control(node: &DomNodeData, depth: usize) -> bool {
    if depth == 0 {
        return false;
    }
    node.children.iter().any(|child| {
        matches!(child.tag.as_str(), "input" | "textarea" | "select" | "button")
            || wraps_native_control(child, depth - 1)
    })
}

/// Click behavior on these tags propagates to everything they contain, so a
/// pointer-styled descendant inside one is noise rather than a second target.
pub fn is_propagating_ancestor(tag: &str) -> bool {
    matches!(tag, "a" | "button" | "summary")
}

/// Form controls are always worth their own index, even inside an anchor.
pub fn is_form_control(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

/// Advisory: does this element look like a search box or button?
pub fn is_search_affordance(node: &DomNodeData) -> bool {
    if node.attr("type") == Some("search") || node.attr("role") == Some("searchbox") {
        return true;
    }
    let mut haystacks: Vec<String> = Vec::new();
    for key in ["id", "name", "class", "placeholder", "aria-label"] {
        if let Some(v) = node.attr(key) {
            haystacks.push(v.to_lowercase());
        }
    }
    for (name, value) in &node.attributes {
        if name.starts_with("data-") {
            haystacks.push(value.to_lowercase());
        }
    }
    haystacks
        .iter()
        .any(|h| SEARCH_VOCABULARY.iter().any(|term| h.contains(term)))
}

// ===== Pagination detection =====

/// What a pagination control does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationKind {
    Next,
    Previous,
    First,
    Last,
    /// A bare page-number button; the number is the label's value.
    PageNumber(u32),
}

impl std::fmt::Display for PaginationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "previous"),
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
            Self::PageNumber(n) => write!(f, "page {n}"),
        }
    }
}

/// One detected pagination control, referencing an indexed element.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationControl {
    pub index: u32,
    pub kind: PaginationKind,
    pub disabled: bool,
}

const NEXT_WORDS: &[&str] = &[
    "next", "more", "older", "siguiente", "weiter", "suivant", "volgende", "próxima", "proxima",
    "下一页", "下一頁", "次へ", "다음", "»", "›",
];
const PREV_WORDS: &[&str] = &[
    "prev", "previous", "newer", "anterior", "zurück", "zuruck", "précédent", "precedent",
    "vorige", "上一页", "上一頁", "前へ", "이전", "«", "‹",
];
const FIRST_WORDS: &[&str] = &["first", "primera", "erste", "première", "premiere", "首页", "最初"];
const LAST_WORDS: &[&str] = &["last", "última", "ultima", "letzte", "dernière", "derniere", "末页", "最後"];

fn word_match(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

fn control_disabled(element: &IndexedElement) -> bool {
    if element.attributes.contains_key("disabled") {
        return true;
    }
    if element.attributes.get("aria-disabled").map(String::as_str) == Some("true") {
        return true;
    }
    element
        .attributes
        .get("class")
        .map(|c| {
            let c = c.to_lowercase();
            c.contains("disabled") || c.contains("inactive")
        })
        .unwrap_or(false)
}

fn looks_like_link_or_button(element: &IndexedElement) -> bool {
    matches!(element.tag.as_str(), "a" | "button")
        || matches!(
            element.role.as_deref(),
            Some("link") | Some("button") | Some("tab")
        )
}

/// Scan a snapshot's indexed elements for pagination controls.
///
/// Purely advisory: misses and false positives are acceptable, so the
/// matching is loose (multilingual labels, aria-labels, class hints, bare
/// one- or two-digit numbers on link-like elements).
pub fn detect_pagination(elements: &[IndexedElement]) -> Vec<PaginationControl> {
    let mut controls = Vec::new();
    for element in elements {
        if !looks_like_link_or_button(element) {
            continue;
        }
        let mut haystack = element.text.to_lowercase();
        for key in ["aria-label", "rel", "class", "title"] {
            if let Some(v) = element.attributes.get(key) {
                haystack.push(' ');
                haystack.push_str(&v.to_lowercase());
            }
        }

        let kind = if word_match(&haystack, NEXT_WORDS) {
            Some(PaginationKind::Next)
        } else if word_match(&haystack, PREV_WORDS) {
            Some(PaginationKind::Previous)
        } else if word_match(&haystack, FIRST_WORDS) {
            Some(PaginationKind::First)
        } else if word_match(&haystack, LAST_WORDS) {
            Some(PaginationKind::Last)
        } else {
            let trimmed = element.text.trim();
            if (1..=2).contains(&trimmed.len()) {
                trimmed.parse::<u32>().ok().map(PaginationKind::PageNumber)
            } else {
                None
            }
        };

        if let Some(kind) = kind {
            controls.push(PaginationControl {
                index: element.index,
                kind,
                disabled: control_disabled(element),
            });
        }
    }
    controls
}

#[cfg(test)]
#[path = "interactive_tests.rs"]
mod tests;
