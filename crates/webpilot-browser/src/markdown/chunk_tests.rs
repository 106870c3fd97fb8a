use super::*;

fn sample() -> String {
    let mut text = String::new();
    text.push_str("# Title\n\n");
    for i in 0..6 {
        text.push_str(&format!("Paragraph number {i} with some filler words.\n\n"));
    }
    text
}

#[test]
fn test_small_content_is_one_chunk() {
    let chunks = chunk("# One\n\njust a line", 10_000, 2, 0);
    assert_eq!(chunks.len(), 1);
    let only = &chunks[0];
    assert_eq!(only.index, 0);
    assert_eq!(only.total, 1);
    assert_eq!(only.start_char, 0);
    assert!(!only.has_more);
    assert_eq!(only.text, "# One\njust a line");
}

#[test]
fn test_greedy_assembly_orders_chunks() {
    let text = sample();
    let chunks = chunk(&text, 100, 0, 0);
    assert!(chunks.len() > 1);

    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.index, i);
        assert_eq!(c.total, chunks.len());
        assert_eq!(c.has_more, i + 1 < chunks.len());
        if i > 0 {
            assert!(c.start_char >= chunks[i - 1].end_char);
        }
        // Nominal limit holds when no single block exceeds it.
        assert!(c.text.chars().count() <= 100);
    }
    // Every paragraph lands in exactly one chunk.
    for i in 0..6 {
        let needle = format!("Paragraph number {i}");
        let hits = chunks.iter().filter(|c| c.text.contains(&needle)).count();
        assert_eq!(hits, 1, "{needle} duplicated or lost");
    }
}

#[test]
fn test_oversized_fence_stays_whole() {
    let mut text = String::from("intro paragraph\n\n```\n");
    for i in 0..30 {
        text.push_str(&format!("let line_{i} = {i};\n"));
    }
    text.push_str("```\n\nclosing words\n");

    let chunks = chunk(&text, 80, 0, 0);
    // The fence is far over the limit but must arrive in one piece.
    let fence_chunks: Vec<&Chunk> = chunks.iter().filter(|c| c.text.contains("```")).collect();
    assert_eq!(fence_chunks.len(), 1);
    let fence = fence_chunks[0];
    assert!(fence.text.contains("let line_0 = 0;"));
    assert!(fence.text.contains("let line_29 = 29;"));
    assert_eq!(fence.text.matches("```").count(), 2);
    assert!(fence.text.chars().count() > 80);
}

#[test]
fn test_table_rows_stay_together() {
    let mut text = String::from("before\n\n");
    for i in 0..12 {
        text.push_str(&format!("| row {i} | value {i} |\n"));
    }
    text.push_str("\nafter\n");

    let chunks = chunk(&text, 60, 0, 0);
    let table_chunks: Vec<&Chunk> = chunks.iter().filter(|c| c.text.contains("| row")).collect();
    assert_eq!(table_chunks.len(), 1);
    assert!(table_chunks[0].text.contains("| row 0 |"));
    assert!(table_chunks[0].text.contains("| row 11 |"));
}

#[test]
fn test_overlap_carries_trailing_lines() {
    let text = "- alpha\n- beta\n- gamma\n- delta\n- epsilon\n- zeta\n";
    let chunks = chunk(text, 24, 1, 0);
    assert!(chunks.len() > 1);
    for pair in chunks.windows(2) {
        let prev_last = pair[0].text.lines().last().unwrap().to_string();
        let next_first = pair[1].text.lines().next().unwrap();
        assert_eq!(next_first, prev_last, "chunk should open with overlap");
    }
}

#[test]
fn test_start_from_char_resumes_mid_document() {
    let text = sample();
    let full = chunk(&text, 100, 0, 0);
    assert!(full.len() > 2);
    let resume_at = full[1].start_char;

    let resumed = chunk(&text, 100, 0, resume_at);
    assert_eq!(resumed[0].start_char, full[1].start_char);
    assert!(!resumed[0].text.contains("Paragraph number 0"));
    assert_eq!(resumed.len(), full.len() - 1);
}

#[test]
fn test_empty_and_past_end_inputs() {
    assert!(chunk("", 100, 0, 0).is_empty());
    assert!(chunk("only text", 100, 0, 10_000).is_empty());
}
