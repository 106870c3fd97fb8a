//! Block-aware chunking for paging large markdown through a bounded window.
//!
//! The text parses into atomic blocks first; chunks are then whole-block
//! runs. A fence or table never splits across chunks, so an oversized one is
//! emitted alone and may exceed the nominal size.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Header,
    Fence,
    Table,
    ListItem,
    Paragraph,
    Blank,
}

#[derive(Debug, Clone)]
struct Block {
    kind: BlockKind,
    /// Char offset of the block's first char in the source.
    start: usize,
    /// Char offset one past the block's last char.
    end: usize,
    text: String,
}

impl Block {
    fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// One page of content.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 0-based position among the chunks returned by this call.
    pub index: usize,
    /// How many chunks this call produced.
    pub total: usize,
    /// Char span of the fresh (non-overlap) content in the source text.
    pub start_char: usize,
    pub end_char: usize,
    /// Overlap context plus fresh content.
    pub text: String,
    /// Whether content exists past `end_char`.
    pub has_more: bool,
}

/// Split `content` into ordered chunks of at most `max_chunk_chars` (atomic
/// blocks permitting), starting at the block containing `start_from_char`.
/// Consecutive chunks share up to `overlap_lines` trailing lines of the
/// previous chunk's last block as leading context.
pub fn chunk(
    content: &str,
    max_chunk_chars: usize,
    overlap_lines: usize,
    start_from_char: usize,
) -> Vec<Chunk> {
    let all_blocks = parse_blocks(content);
    // Trailing blank space does not count as unread content.
    let content_end = all_blocks.last().map(|b| b.end).unwrap_or(0);
    let blocks: Vec<Block> = all_blocks
        .into_iter()
        .filter(|b| b.end > start_from_char)
        .collect();
    if blocks.is_empty() {
        return Vec::new();
    }

    let max = max_chunk_chars.max(1);
    let mut runs: Vec<Vec<Block>> = Vec::new();
    let mut current: Vec<Block> = Vec::new();
    let mut current_len = 0usize;
    for block in blocks {
        let len = block.char_len();
        if !current.is_empty() && current_len + len > max {
            runs.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current_len += len;
        current.push(block);
    }
    if !current.is_empty() {
        runs.push(current);
    }

    let total = runs.len();
    let mut chunks = Vec::with_capacity(total);
    let mut carry: Option<String> = None;
    for (index, run) in runs.iter().enumerate() {
        let start_char = run.first().map(|b| b.start).unwrap_or(0);
        let end_char = run.last().map(|b| b.end).unwrap_or(start_char);
        let mut text = String::new();
        if let Some(overlap) = carry.take() {
            if !overlap.is_empty() {
                text.push_str(&overlap);
                text.push('\n');
            }
        }
        let body = run
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        text.push_str(&body);

        if overlap_lines > 0 {
            carry = run.last().map(|b| trailing_lines(&b.text, overlap_lines));
        }

        chunks.push(Chunk {
            index,
            total,
            start_char,
            end_char,
            text,
            has_more: end_char < content_end,
        });
    }
    chunks
}

/// The last `n` lines of `text`.
fn trailing_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(n);
    lines[skip..].join("\n")
}

fn parse_blocks(content: &str) -> Vec<Block> {
    // Line records: (char offset, text).
    let mut lines: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0usize;
    for line in content.split('\n') {
        lines.push((offset, line));
        offset += line.chars().count() + 1;
    }
    let end_of = |i: usize, lines: &[(usize, &str)]| -> usize {
        lines[i].0 + lines[i].1.chars().count()
    };

    let mut blocks = Vec::new();
    let mut i = 0usize;
    while i < lines.len() {
        let (start, line) = lines[i];
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            // Fold a run of blank lines into one block.
            let mut j = i;
            while j + 1 < lines.len() && lines[j + 1].1.trim().is_empty() {
                j += 1;
            }
            blocks.push(Block {
                kind: BlockKind::Blank,
                start,
                end: end_of(j, &lines),
                text: String::new(),
            });
            i = j + 1;
            continue;
        }

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            let marker = &trimmed[..3];
            let mut j = i + 1;
            while j < lines.len() && !lines[j].1.trim_start().starts_with(marker) {
                j += 1;
            }
            let last = j.min(lines.len() - 1);
            blocks.push(Block {
                kind: BlockKind::Fence,
                start,
                end: end_of(last, &lines),
                text: join_lines(&lines[i..=last]),
            });
            i = last + 1;
            continue;
        }

        if trimmed.starts_with('|') {
            let mut j = i;
            while j + 1 < lines.len() && lines[j + 1].1.trim_start().starts_with('|') {
                j += 1;
            }
            blocks.push(Block {
                kind: BlockKind::Table,
                start,
                end: end_of(j, &lines),
                text: join_lines(&lines[i..=j]),
            });
            i = j + 1;
            continue;
        }

        if is_header(trimmed) {
            blocks.push(Block {
                kind: BlockKind::Header,
                start,
                end: end_of(i, &lines),
                text: line.to_string(),
            });
            i += 1;
            continue;
        }

        if is_list_item(trimmed) {
            // The item owns its indented continuation lines.
            let mut j = i;
            while j + 1 < lines.len() {
                let next = lines[j + 1].1;
                if next.trim().is_empty() || !next.starts_with(' ') || is_list_item(next.trim_start())
                {
                    break;
                }
                j += 1;
            }
            blocks.push(Block {
                kind: BlockKind::ListItem,
                start,
                end: end_of(j, &lines),
                text: join_lines(&lines[i..=j]),
            });
            i = j + 1;
            continue;
        }

        // Paragraph: consecutive plain lines.
        let mut j = i;
        while j + 1 < lines.len() {
            let next = lines[j + 1].1;
            let next_trimmed = next.trim_start();
            if next.trim().is_empty()
                || next_trimmed.starts_with("```")
                || next_trimmed.starts_with("~~~")
                || next_trimmed.starts_with('|')
                || is_header(next_trimmed)
                || is_list_item(next_trimmed)
            {
                break;
            }
            j += 1;
        }
        blocks.push(Block {
            kind: BlockKind::Paragraph,
            start,
            end: end_of(j, &lines),
            text: join_lines(&lines[i..=j]),
        });
        i = j + 1;
    }

    blocks.retain(|b| b.kind != BlockKind::Blank);
    blocks
}

fn join_lines(lines: &[(usize, &str)]) -> String {
    lines.iter().map(|(_, l)| *l).collect::<Vec<_>>().join("\n")
}

fn is_header(trimmed: &str) -> bool {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    (1..=6).contains(&hashes)
        && trimmed
            .chars()
            .nth(hashes)
            .map(|c| c == ' ')
            .unwrap_or(false)
}

fn is_list_item(trimmed: &str) -> bool {
    if trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with("+ ") {
        return true;
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0
        && trimmed[digits..].starts_with(". ")
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
