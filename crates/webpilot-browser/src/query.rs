//! Read-only page queries: text search, element lookup, link and metadata
//! extraction. All of them run Rust-side over a structured snapshot; the
//! page is never touched.

use std::collections::{BTreeMap, BTreeSet};

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use url::Url;
use webpilot_protocols::Rect;

use crate::dom::node::{DomNodeData, DomSnapshotData};
use crate::dom::selector::{self, ChainEntry};
use crate::dom::text::element_text;
use crate::dom::visibility::is_visible;
use crate::error::BrowserError;

// ===== Text search =====

/// One hit from `search-page`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Char offset of the match in the searched text.
    pub offset: usize,
    pub matched: String,
    /// The match with surrounding chars on both sides.
    pub context: String,
}

/// Find `pattern` in `text`. With `use_regex` off the pattern is taken
/// literally. Case-insensitive unless asked otherwise.
pub fn search_text(
    text: &str,
    pattern: &str,
    use_regex: bool,
    case_sensitive: bool,
    max_matches: usize,
    context_chars: usize,
) -> Result<Vec<SearchMatch>, BrowserError> {
    let source = if use_regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    let re = RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| BrowserError::InvalidRequest(format!("bad pattern: {e}")))?;

    let mut out = Vec::new();
    for m in re.find_iter(text).take(max_matches.max(1)) {
        let (start, end) = expand_span(text, m.start(), m.end(), context_chars);
        out.push(SearchMatch {
            offset: text[..m.start()].chars().count(),
            matched: m.as_str().to_string(),
            context: text[start..end].to_string(),
        });
    }
    Ok(out)
}

/// Grow a byte span by up to `margin` chars on each side, staying on char
/// boundaries.
fn expand_span(text: &str, start: usize, end: usize, margin: usize) -> (usize, usize) {
    let mut s = start;
    for _ in 0..margin {
        match text[..s].chars().next_back() {
            Some(c) => s -= c.len_utf8(),
            None => break,
        }
    }
    let mut e = end;
    for _ in 0..margin {
        match text[e..].chars().next() {
            Some(c) => e += c.len_utf8(),
            None => break,
        }
    }
    (s, e)
}

// ===== Element lookup =====

/// One `find-elements` result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundElement {
    pub tag: String,
    pub text: String,
    pub css_path: String,
    pub xpath: String,
    pub visible: bool,
    pub rect: Rect,
}

/// All elements matching `selector`, document order, with generated unique
/// selectors so a follow-up action can target them.
pub fn find_elements(
    data: &DomSnapshotData,
    selector: &str,
    limit: usize,
    visible_only: bool,
) -> Result<Vec<FoundElement>, BrowserError> {
    let matches = selector::query_all(&data.root, selector, usize::MAX)
        .map_err(|e| BrowserError::InvalidRequest(e.to_string()))?;
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut chain: Vec<ChainEntry<'_>> = Vec::new();
    collect_found(
        &data.root,
        &data.root,
        &matches,
        visible_only,
        limit.max(1),
        &mut chain,
        &mut out,
    );
    Ok(out)
}

fn collect_found<'a>(
    node: &'a DomNodeData,
    root: &'a DomNodeData,
    matches: &[&'a DomNodeData],
    visible_only: bool,
    limit: usize,
    chain: &mut Vec<ChainEntry<'a>>,
    out: &mut Vec<FoundElement>,
) {
    if out.len() >= limit {
        return;
    }
    let mut tag_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for child in &node.children {
        if !child.is_element() {
            continue;
        }
        let nth = {
            let slot = tag_counts.entry(child.tag.as_str()).or_insert(0);
            *slot += 1;
            *slot
        };
        chain.push((child, nth));
        if matches.iter().any(|m| std::ptr::eq(*m, child)) {
            let visible = is_visible(child);
            if !visible_only || visible {
                out.push(FoundElement {
                    tag: child.tag.clone(),
                    text: element_text(child, 100),
                    css_path: selector::css_path(chain, root),
                    xpath: selector::xpath(chain),
                    visible,
                    rect: child.rect.unwrap_or_default(),
                });
            }
        }
        if out.len() < limit {
            collect_found(child, root, matches, visible_only, limit, chain, out);
        }
        chain.pop();
        if out.len() >= limit {
            return;
        }
    }
}

// ===== Links =====

/// One `extract-links` result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLink {
    pub url: String,
    pub text: String,
    /// Same-host as the page.
    pub internal: bool,
}

/// Every unique anchor target on the page, resolved absolute, in document
/// order. `internal_only` keeps same-host links only.
pub fn extract_links(
    data: &DomSnapshotData,
    internal_only: bool,
    limit: usize,
) -> Vec<PageLink> {
    let base = Url::parse(&data.url).ok();
    let page_host = base.as_ref().and_then(|u| u.host_str().map(str::to_string));
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();
    collect_links(
        &data.root,
        base.as_ref(),
        page_host.as_deref(),
        internal_only,
        limit.max(1),
        &mut seen,
        &mut out,
    );
    out
}

fn collect_links(
    node: &DomNodeData,
    base: Option<&Url>,
    page_host: Option<&str>,
    internal_only: bool,
    limit: usize,
    seen: &mut BTreeSet<String>,
    out: &mut Vec<PageLink>,
) {
    if out.len() >= limit {
        return;
    }
    if node.tag == "a" {
        if let Some(href) = node.attr("href") {
            if let Some(resolved) = resolve_link(href, base) {
                let internal = resolved
                    .host_str()
                    .map(|h| Some(h) == page_host)
                    .unwrap_or(false);
                let url = resolved.to_string();
                if (!internal_only || internal) && seen.insert(url.clone()) {
                    out.push(PageLink {
                        url,
                        text: element_text(node, 100),
                        internal,
                    });
                }
            }
        }
    }
    for child in &node.children {
        collect_links(child, base, page_host, internal_only, limit, seen, out);
    }
}

fn resolve_link(href: &str, base: Option<&Url>) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }
    match base {
        Some(base) => base.join(href).ok(),
        None => Url::parse(href).ok(),
    }
}

// ===== Metadata =====

/// What `get-page-metadata` reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub canonical_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
    /// Open Graph properties, `og:` prefix stripped.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub open_graph: BTreeMap<String, String>,
}

/// Collect document metadata. Pure over the snapshot, so calling it twice
/// on an unchanged page returns identical output.
pub fn page_metadata(data: &DomSnapshotData) -> PageMetadata {
    let mut meta = PageMetadata {
        url: data.url.clone(),
        title: data.title.clone(),
        ..PageMetadata::default()
    };
    scan_metadata(&data.root, &mut meta);
    meta
}

fn scan_metadata(node: &DomNodeData, meta: &mut PageMetadata) {
    match node.tag.as_str() {
        "html" => {
            if let Some(lang) = node.attr("lang") {
                if !lang.is_empty() {
                    meta.language = Some(lang.to_string());
                }
            }
        }
        "meta" => {
            let content = node.attr("content").unwrap_or_default();
            if content.is_empty() {
                // fall through to children (none for meta, but stay uniform)
            } else if node.attr("name") == Some("description") {
                meta.description = Some(content.to_string());
            } else if let Some(property) = node.attr("property") {
                if let Some(key) = property.strip_prefix("og:") {
                    meta.open_graph
                        .insert(key.to_string(), content.to_string());
                }
            }
        }
        "link" => {
            if node.attr("rel") == Some("canonical") {
                if let Some(href) = node.attr("href") {
                    meta.canonical_url = Some(href.to_string());
                }
            }
        }
        "title" => {
            if meta.title.is_empty() {
                let text: String = node
                    .children
                    .iter()
                    .filter(|c| c.is_text())
                    .map(|c| c.text.as_str())
                    .collect();
                let text = crate::dom::text::collapse_whitespace(&text);
                if !text.is_empty() {
                    meta.title = text;
                }
            }
        }
        _ => {}
    }
    for child in &node.children {
        scan_metadata(child, meta);
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
