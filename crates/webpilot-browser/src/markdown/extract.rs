//! Depth-first DOM walk producing markdown.
//!
//! Headers, links, lists, tables, code and blockquotes keep their structure;
//! everything else flattens to paragraphs. Hidden subtrees and non-content
//! tags are dropped, runs of blank lines collapse to one, and large embedded
//! JSON payloads are redacted so a page full of hydration data does not
//! drown the actual text.

use url::Url;

use crate::dom::builder::{SKIPPED_TAGS, SVG_CHILD_TAGS};
use crate::dom::node::DomNodeData;
use crate::dom::text::collapse_whitespace;

/// Any balanced brace/bracket run longer than this that looks like JSON is
/// replaced with a placeholder.
const JSON_REDACTION_THRESHOLD: usize = 200;

/// Render `root` (a document or element) as markdown. Relative link targets
/// resolve against `base_url`; with `include_links` off, anchors render as
/// bare text.
pub fn extract_markdown(root: &DomNodeData, base_url: &str, include_links: bool) -> String {
    let mut writer = Writer {
        base: Url::parse(base_url).ok(),
        include_links,
        out: String::new(),
    };
    writer.block_children(root);
    let collapsed = collapse_blank_lines(&writer.out);
    redact_json_blobs(collapsed.trim())
}

struct Writer {
    base: Option<Url>,
    include_links: bool,
    out: String,
}

fn is_hidden(node: &DomNodeData) -> bool {
    node.style.display == "none" || node.style.visibility == "hidden"
}

fn is_skipped(tag: &str) -> bool {
    SKIPPED_TAGS.contains(&tag) || SVG_CHILD_TAGS.contains(&tag) || tag == "svg" || tag == "iframe"
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "html"
            | "body"
            | "p"
            | "div"
            | "section"
            | "article"
            | "main"
            | "header"
            | "footer"
            | "aside"
            | "nav"
            | "form"
            | "fieldset"
            | "figure"
            | "figcaption"
            | "details"
            | "summary"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "table"
            | "thead"
            | "tbody"
            | "tfoot"
            | "tr"
            | "pre"
            | "blockquote"
            | "hr"
            | "dl"
            | "dt"
            | "dd"
    )
}

impl Writer {
    /// Walk element children as block content, flushing runs of inline
    /// content as paragraphs.
    fn block_children(&mut self, node: &DomNodeData) {
        let mut inline = String::new();
        for child in &node.children {
            if child.is_text() {
                push_inline(&mut inline, &collapse_whitespace(&child.text));
                continue;
            }
            if !child.is_element() || is_skipped(child.tag.as_str()) || is_hidden(child) {
                continue;
            }
            if is_block(child.tag.as_str()) {
                self.flush_paragraph(&mut inline);
                self.block(child);
            } else {
                self.inline(child, &mut inline);
            }
        }
        self.flush_paragraph(&mut inline);
    }

    fn flush_paragraph(&mut self, inline: &mut String) {
        let text = inline.trim();
        if !text.is_empty() {
            self.ensure_blank_line();
            self.out.push_str(text);
            self.out.push('\n');
        }
        inline.clear();
    }

    fn block(&mut self, node: &DomNodeData) {
        match node.tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = node.tag[1..].parse::<usize>().unwrap_or(1);
                let text = self.inline_text(node);
                if !text.is_empty() {
                    self.ensure_blank_line();
                    self.out.push_str(&"#".repeat(level));
                    self.out.push(' ');
                    self.out.push_str(&text);
                    self.out.push('\n');
                }
            }
            "li" => {
                let text = self.inline_text(node);
                if !text.is_empty() {
                    self.ensure_newline();
                    self.out.push_str("- ");
                    self.out.push_str(&text);
                    self.out.push('\n');
                }
                // Nested lists inside the item keep their own rows.
                for child in &node.children {
                    if matches!(child.tag.as_str(), "ul" | "ol") && !is_hidden(child) {
                        self.block(child);
                    }
                }
            }
            "tr" => {
                let cells: Vec<String> = node
                    .children
                    .iter()
                    .filter(|c| matches!(c.tag.as_str(), "td" | "th") && !is_hidden(c))
                    .map(|c| self.inline_text(c))
                    .collect();
                if !cells.is_empty() {
                    self.ensure_newline();
                    self.out.push_str("| ");
                    self.out.push_str(&cells.join(" | "));
                    self.out.push_str(" |\n");
                }
            }
            "pre" => {
                let mut raw = String::new();
                raw_text(node, &mut raw);
                let raw = raw.trim_matches('\n');
                if !raw.is_empty() {
                    self.ensure_blank_line();
                    self.out.push_str("```\n");
                    self.out.push_str(raw);
                    self.out.push_str("\n```\n");
                }
            }
            "blockquote" => {
                let mut inner = Writer {
                    base: self.base.clone(),
                    include_links: self.include_links,
                    out: String::new(),
                };
                inner.block_children(node);
                let quoted = inner.out.trim();
                if !quoted.is_empty() {
                    self.ensure_blank_line();
                    for line in quoted.lines() {
                        if line.is_empty() {
                            self.out.push_str(">\n");
                        } else {
                            self.out.push_str("> ");
                            self.out.push_str(line);
                            self.out.push('\n');
                        }
                    }
                }
            }
            "hr" => {
                self.ensure_blank_line();
                self.out.push_str("---\n");
            }
            "table" | "thead" | "tbody" | "tfoot" => {
                self.ensure_blank_line();
                self.table_rows(node);
            }
            "ul" | "ol" | "dl" => {
                self.ensure_blank_line();
                self.block_children(node);
            }
            _ => {
                self.ensure_newline();
                self.block_children(node);
            }
        }
    }

    fn table_rows(&mut self, node: &DomNodeData) {
        for child in &node.children {
            if is_hidden(child) {
                continue;
            }
            match child.tag.as_str() {
                "tr" => self.block(child),
                "thead" | "tbody" | "tfoot" => self.table_rows(child),
                _ => {}
            }
        }
    }

    /// Render a subtree as a single inline run (used for headers, list
    /// items, table cells).
    fn inline_text(&self, node: &DomNodeData) -> String {
        let mut out = String::new();
        for child in &node.children {
            if child.is_text() {
                push_inline(&mut out, &collapse_whitespace(&child.text));
            } else if child.is_element() && !is_skipped(child.tag.as_str()) && !is_hidden(child) {
                // Nested lists are handled by the caller, not inlined.
                if matches!(child.tag.as_str(), "ul" | "ol") {
                    continue;
                }
                self.inline(child, &mut out);
            }
        }
        out.trim().to_string()
    }

    fn inline(&self, node: &DomNodeData, out: &mut String) {
        match node.tag.as_str() {
            "a" => {
                let text = self.inline_text(node);
                if text.is_empty() {
                    return;
                }
                match node.attr("href").filter(|_| self.include_links) {
                    Some(href) => {
                        let target = self.absolutize(href);
                        push_inline(out, &format!("[{text}]({target})"));
                    }
                    None => push_inline(out, &text),
                }
            }
            "code" => {
                let text = self.inline_text(node);
                if !text.is_empty() {
                    push_inline(out, &format!("`{text}`"));
                }
            }
            "br" => out.push('\n'),
            "img" => {
                if let Some(alt) = node.attr("alt") {
                    let alt = collapse_whitespace(alt);
                    if !alt.is_empty() {
                        push_inline(out, &alt);
                    }
                }
            }
            "input" | "button" | "select" | "textarea" => {}
            _ => {
                let text = self.inline_text(node);
                push_inline(out, &text);
            }
        }
    }

    fn absolutize(&self, href: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        }
    }

    fn ensure_newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn ensure_blank_line(&mut self) {
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}

fn push_inline(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(text);
}

fn raw_text(node: &DomNodeData, out: &mut String) {
    for child in &node.children {
        if child.is_text() {
            out.push_str(&child.text);
        } else if child.is_element() {
            raw_text(child, out);
        }
    }
}

/// At most one blank line between blocks.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}

/// Replace balanced `{...}`/`[...]` runs longer than the threshold that look
/// like serialized data with a short placeholder.
pub fn redact_json_blobs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;
    while i < chars.len() {
        let c = chars[i];
        if c == '{' || c == '[' {
            if let Some(end) = matching_close(&chars, i) {
                let len = end - i + 1;
                if len > JSON_REDACTION_THRESHOLD {
                    let span: String = chars[i..=end].iter().collect();
                    if looks_like_json(&span) {
                        out.push_str(&format!("[json data removed: {len} chars]"));
                        i = end + 1;
                        continue;
                    }
                }
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Index of the close matching the bracket at `start`, tracking string
/// literals and escapes.
fn matching_close(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0i64;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &c) in chars[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn looks_like_json(span: &str) -> bool {
    span.contains("\":") || span.contains("\" :") || span.contains("},{") || span.contains("\",\"")
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
