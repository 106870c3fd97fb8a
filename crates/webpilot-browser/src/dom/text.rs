//! Compact attribute and text rendering for indexed elements.
//!
//! The goal is a short line per element that still tells a decision-maker
//! what the element is for, so values are truncated, whitespace collapsed,
//! and attributes that merely repeat the display text dropped.

use super::node::DomNodeData;

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Char-safe truncation with an ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn direct_text(node: &DomNodeData) -> String {
    let joined = node
        .children
        .iter()
        .filter(|c| c.is_text())
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

fn deep_text(node: &DomNodeData, depth: usize, out: &mut Vec<String>) {
    if depth == 0 {
        return;
    }
    for child in &node.children {
        if child.is_text() {
            let t = collapse_whitespace(&child.text);
            if !t.is_empty() {
                out.push(t);
            }
        } else if child.is_element() && child.style.display != "none" {
            deep_text(child, depth - 1, out);
        }
    }
}

/// Display text for one element: live value and labelling attributes win for
/// form controls, alt text for images, then direct text, then (shallow)
/// descendant text.
pub fn element_text(node: &DomNodeData, max_chars: usize) -> String {
    let raw = match node.tag.as_str() {
        "input" | "textarea" | "select" => node
            .value
            .clone()
            .filter(|v| !v.is_empty())
            .or_else(|| node.attr("value").map(str::to_string))
            .or_else(|| node.attr("placeholder").map(str::to_string))
            .or_else(|| node.attr("aria-label").map(str::to_string))
            .or_else(|| node.attr("name").map(str::to_string))
            .unwrap_or_default(),
        "img" => node
            .attr("alt")
            .or_else(|| node.attr("aria-label"))
            .unwrap_or_default()
            .to_string(),
        _ => {
            let direct = direct_text(node);
            if !direct.is_empty() {
                direct
            } else {
                let mut parts = Vec::new();
                deep_text(node, 4, &mut parts);
                parts.join(" ")
            }
        }
    };
    truncate(&collapse_whitespace(&raw), max_chars)
}

/// Attributes whose bare presence is the information.
const BOOLEAN_ATTRIBUTES: &[&str] = &["disabled", "checked", "selected", "readonly", "required"];

/// The preserved-attribute subset of one element, compacted: values
/// truncated, duplicates of the display text (and of each other) dropped,
/// boolean attributes kept even when empty.
pub fn compact_attributes(
    node: &DomNodeData,
    preserved: &[String],
    display_text: &str,
) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut seen_values: Vec<String> = Vec::new();
    for name in preserved {
        let Some(value) = node.attr(name) else {
            continue;
        };
        if BOOLEAN_ATTRIBUTES.contains(&name.as_str()) {
            out.push((name.clone(), String::new()));
            continue;
        }
        let value = collapse_whitespace(value);
        if value.is_empty() {
            continue;
        }
        // Redundant with what the line already shows.
        if value == display_text {
            continue;
        }
        if value.len() > 3 && seen_values.contains(&value) {
            continue;
        }
        seen_values.push(value.clone());
        out.push((name.clone(), truncate(&value, 50)));
    }
    out
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
