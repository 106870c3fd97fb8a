//! CSS selector generation and a small selector matcher.
//!
//! Generation prefers what survives page churn: an id, then meaningful
//! classes, then a safe attribute, then a positional path. Every candidate
//! is validated against the snapshot tree for uniqueness before it is
//! reported, which is what the matcher half of this module exists for (it
//! also backs the in-memory test page).
//!
//! The matcher covers the grammar the generator emits plus what hand-written
//! selectors in practice use: compounds of `tag`, `#id`, `.class`,
//! `[attr]`, `[attr="value"]`, `:nth-of-type(n)`, joined by descendant and
//! child combinators, with top-level comma lists.

use super::node::DomNodeData;
use thiserror::Error;

/// Class names that describe transient state rather than identity.
const DYNAMIC_CLASSES: &[&str] = &[
    "active", "focus", "focused", "hover", "selected", "checked", "open", "expanded", "current",
    "highlight", "show", "hidden", "visible", "disabled", "loading",
];

/// Attributes stable enough to identify an element with.
const SAFE_ATTRIBUTES: &[&str] = &[
    "name",
    "type",
    "placeholder",
    "role",
    "data-testid",
    "data-test",
    "data-qa",
    "aria-label",
    "for",
    "title",
    "alt",
];

#[derive(Debug, Error, PartialEq)]
#[error("invalid selector '{selector}': {reason}")]
pub struct SelectorParseError {
    pub selector: String,
    pub reason: String,
}

// ===== Generation =====

/// A node plus its 1-based position among same-tag siblings.
pub type ChainEntry<'a> = (&'a DomNodeData, usize);

fn id_is_safe(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn class_is_stable(class: &str) -> bool {
    if class.len() > 24 || !id_is_safe(class) {
        return false;
    }
    if DYNAMIC_CLASSES.contains(&class.to_lowercase().as_str()) {
        return false;
    }
    // Hashed utility classes: css-1x2y3z, jsx-392817, sc-bdVaJa.
    let lowered = class.to_lowercase();
    if ["css-", "jss-", "jsx-", "sc-"]
        .iter()
        .any(|p| lowered.starts_with(p))
    {
        return false;
    }
    let mut digit_run = 0usize;
    for c in class.chars() {
        if c.is_ascii_digit() {
            digit_run += 1;
            if digit_run >= 3 {
                return false;
            }
        } else {
            digit_run = 0;
        }
    }
    true
}

fn attr_value_usable(value: &str) -> bool {
    !value.is_empty() && value.len() <= 40 && !value.contains('\n') && !value.contains('"')
}

fn is_unique(root: &DomNodeData, selector: &str) -> bool {
    matches_count(root, selector) == 1
}

/// Positional path from the document down, always unique by construction.
fn positional_path(chain: &[ChainEntry<'_>]) -> String {
    let mut segments = Vec::new();
    for (node, nth) in chain {
        if !node.is_element() || node.tag.starts_with('#') {
            continue;
        }
        if matches!(node.tag.as_str(), "html" | "body") {
            segments.push(node.tag.clone());
        } else {
            segments.push(format!("{}:nth-of-type({nth})", node.tag));
        }
    }
    segments.join(" > ")
}

/// Best-effort unique CSS selector for the last element of `chain`.
///
/// `doc_root` is the document the element belongs to; uniqueness is checked
/// against it. Falls back to a positional path when nothing shorter is
/// unique.
pub fn css_path(chain: &[ChainEntry<'_>], doc_root: &DomNodeData) -> String {
    let Some((node, _)) = chain.last() else {
        return String::new();
    };

    if let Some(id) = node.attr("id") {
        if id_is_safe(id) {
            let candidate = format!("#{id}");
            if is_unique(doc_root, &candidate) {
                return candidate;
            }
        }
    }

    let stable_classes: Vec<&str> = node
        .classes()
        .into_iter()
        .filter(|c| class_is_stable(c))
        .take(3)
        .collect();
    if !stable_classes.is_empty() {
        let candidate = format!("{}.{}", node.tag, stable_classes.join("."));
        if is_unique(doc_root, &candidate) {
            return candidate;
        }
    }

    for attr in SAFE_ATTRIBUTES {
        if let Some(value) = node.attr(attr) {
            if attr_value_usable(value) {
                let candidate = format!("{}[{}=\"{}\"]", node.tag, attr, value);
                if is_unique(doc_root, &candidate) {
                    return candidate;
                }
            }
        }
    }

    positional_path(chain)
}

/// XPath equivalent of the positional path.
pub fn xpath(chain: &[ChainEntry<'_>]) -> String {
    let mut out = String::new();
    for (node, nth) in chain {
        if !node.is_element() || node.tag.starts_with('#') {
            continue;
        }
        out.push('/');
        out.push_str(&node.tag);
        out.push_str(&format!("[{nth}]"));
    }
    out
}

/// Short human-readable location, last few ancestors only.
pub fn debug_path(chain: &[ChainEntry<'_>]) -> String {
    let segments: Vec<String> = chain
        .iter()
        .filter(|(node, _)| node.is_element() && !node.tag.starts_with('#'))
        .map(|(node, nth)| {
            if let Some(id) = node.attr("id") {
                if id_is_safe(id) {
                    return format!("{}#{id}", node.tag);
                }
            }
            if let Some(class) = node.classes().iter().find(|c| class_is_stable(c)) {
                return format!("{}.{class}", node.tag);
            }
            if *nth > 1 {
                format!("{}:nth({nth})", node.tag)
            } else {
                node.tag.clone()
            }
        })
        .collect();
    let tail = segments.len().saturating_sub(4);
    segments[tail..].join(" > ")
}

// ===== Matching =====

#[derive(Debug, Clone, Default, PartialEq)]
struct SimplePart {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    nth_of_type: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

type Compound = Vec<(Option<Combinator>, SimplePart)>;

fn parse_error(selector: &str, reason: impl Into<String>) -> SelectorParseError {
    SelectorParseError {
        selector: selector.to_string(),
        reason: reason.into(),
    }
}

fn split_top_level_commas(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut in_quotes = false;
    for c in selector.chars() {
        match c {
            '"' | '\'' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            ',' if !in_brackets && !in_quotes => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

fn parse_simple(token: &str, original: &str) -> Result<SimplePart, SelectorParseError> {
    let mut part = SimplePart::default();
    let mut rest = token;

    // Leading tag or universal.
    let boundary = rest
        .find(|c| ['#', '.', '[', ':'].contains(&c))
        .unwrap_or(rest.len());
    if boundary > 0 {
        let tag = &rest[..boundary];
        if tag != "*" {
            part.tag = Some(tag.to_lowercase());
        }
        rest = &rest[boundary..];
    }

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('#') {
            let end = after
                .find(|c| ['#', '.', '[', ':'].contains(&c))
                .unwrap_or(after.len());
            if end == 0 {
                return Err(parse_error(original, "empty id"));
            }
            part.id = Some(after[..end].to_string());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('.') {
            let end = after
                .find(|c| ['#', '.', '[', ':'].contains(&c))
                .unwrap_or(after.len());
            if end == 0 {
                return Err(parse_error(original, "empty class"));
            }
            part.classes.push(after[..end].to_string());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after
                .find(']')
                .ok_or_else(|| parse_error(original, "unterminated attribute"))?;
            let body = &after[..end];
            match body.split_once('=') {
                Some((name, value)) => {
                    let value = value.trim_matches(|c| c == '"' || c == '\'');
                    part.attrs
                        .push((name.trim().to_lowercase(), Some(value.to_string())));
                }
                None => part.attrs.push((body.trim().to_lowercase(), None)),
            }
            rest = &after[end + 1..];
        } else if let Some(after) = rest.strip_prefix(':') {
            let Some(args) = after.strip_prefix("nth-of-type(") else {
                return Err(parse_error(
                    original,
                    format!("unsupported pseudo-class ':{after}'"),
                ));
            };
            let end = args
                .find(')')
                .ok_or_else(|| parse_error(original, "unterminated nth-of-type"))?;
            let n: usize = args[..end]
                .trim()
                .parse()
                .map_err(|_| parse_error(original, "nth-of-type wants a number"))?;
            part.nth_of_type = Some(n);
            rest = &after["nth-of-type(".len() + end + 1..];
        } else {
            return Err(parse_error(original, format!("unexpected '{rest}'")));
        }
    }
    Ok(part)
}

/// Split a compound selector into simple-selector tokens and `>` markers,
/// leaving bracketed attribute values (which may contain spaces) intact.
fn tokenize(selector: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut in_quotes = false;
    for c in selector.chars() {
        match c {
            '"' | '\'' if in_brackets => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' if !in_quotes => {
                in_brackets = true;
                current.push(c);
            }
            ']' if !in_quotes => {
                in_brackets = false;
                current.push(c);
            }
            c if c.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '>' if !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(">".to_string());
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_compound(selector: &str, original: &str) -> Result<Compound, SelectorParseError> {
    let tokens = tokenize(selector);
    if tokens.is_empty() {
        return Err(parse_error(original, "empty selector"));
    }
    let mut compound: Compound = Vec::new();
    let mut pending: Option<Combinator> = None;
    for token in &tokens {
        let token = token.as_str();
        if token == ">" {
            if pending.is_some() || compound.is_empty() {
                return Err(parse_error(original, "misplaced '>'"));
            }
            pending = Some(Combinator::Child);
            continue;
        }
        let combinator = if compound.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        compound.push((combinator, parse_simple(token, original)?));
    }
    if pending.is_some() {
        return Err(parse_error(original, "dangling '>'"));
    }
    Ok(compound)
}

fn parse_selector(selector: &str) -> Result<Vec<Compound>, SelectorParseError> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(parse_error(selector, "empty selector"));
    }
    split_top_level_commas(trimmed)
        .iter()
        .map(|s| parse_compound(s.trim(), selector))
        .collect()
}

fn simple_matches(part: &SimplePart, node: &DomNodeData, nth: usize) -> bool {
    if let Some(tag) = &part.tag {
        if node.tag != *tag {
            return false;
        }
    }
    if let Some(id) = &part.id {
        if node.attr("id") != Some(id.as_str()) {
            return false;
        }
    }
    if !part.classes.is_empty() {
        let classes = node.classes();
        if !part.classes.iter().all(|c| classes.contains(&c.as_str())) {
            return false;
        }
    }
    for (name, expected) in &part.attrs {
        match (node.attr(name), expected) {
            (None, _) => return false,
            (Some(_), None) => {}
            (Some(actual), Some(expected)) if actual == expected => {}
            _ => return false,
        }
    }
    if let Some(n) = part.nth_of_type {
        if nth != n {
            return false;
        }
    }
    true
}

fn compound_matches(compound: &Compound, chain: &[ChainEntry<'_>]) -> bool {
    fn match_at(
        compound: &Compound,
        part_idx: usize,
        chain: &[ChainEntry<'_>],
        chain_idx: usize,
    ) -> bool {
        let (node, nth) = chain[chain_idx];
        if !simple_matches(&compound[part_idx].1, node, nth) {
            return false;
        }
        if part_idx == 0 {
            return true;
        }
        match compound[part_idx].0 {
            Some(Combinator::Child) => {
                chain_idx > 0 && match_at(compound, part_idx - 1, chain, chain_idx - 1)
            }
            Some(Combinator::Descendant) => (0..chain_idx)
                .rev()
                .any(|a| match_at(compound, part_idx - 1, chain, a)),
            None => unreachable!("only the leftmost part lacks a combinator"),
        }
    }
    !chain.is_empty() && match_at(compound, compound.len() - 1, chain, chain.len() - 1)
}

fn walk_matches<'a>(
    node: &'a DomNodeData,
    chain: &mut Vec<ChainEntry<'a>>,
    nth: usize,
    selectors: &[Compound],
    limit: usize,
    out: &mut Vec<&'a DomNodeData>,
) {
    if out.len() >= limit {
        return;
    }
    chain.push((node, nth));
    if node.is_element()
        && !node.tag.starts_with('#')
        && selectors.iter().any(|c| compound_matches(c, chain))
    {
        out.push(node);
    }
    let mut tag_counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for child in &node.children {
        if !child.is_element() {
            continue;
        }
        let count = tag_counts.entry(child.tag.as_str()).or_insert(0);
        *count += 1;
        walk_matches(child, chain, *count, selectors, limit, out);
        if out.len() >= limit {
            break;
        }
    }
    chain.pop();
}

/// All elements under `root` matching `selector`, document order, capped at
/// `limit`. Does not pierce frame documents (neither does the real
/// `querySelectorAll`).
pub fn query_all<'a>(
    root: &'a DomNodeData,
    selector: &str,
    limit: usize,
) -> Result<Vec<&'a DomNodeData>, SelectorParseError> {
    let selectors = parse_selector(selector)?;
    let mut out = Vec::new();
    let mut chain = Vec::new();
    walk_matches(root, &mut chain, 1, &selectors, limit.max(1), &mut out);
    Ok(out)
}

/// First match, if any.
pub fn query_first<'a>(
    root: &'a DomNodeData,
    selector: &str,
) -> Result<Option<&'a DomNodeData>, SelectorParseError> {
    Ok(query_all(root, selector, 1)?.into_iter().next())
}

/// Number of matches; 0 for unparseable selectors.
pub fn matches_count(root: &DomNodeData, selector: &str) -> usize {
    query_all(root, selector, usize::MAX).map_or(0, |v| v.len())
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
