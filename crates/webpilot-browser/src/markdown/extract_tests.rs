use super::*;
use crate::dom::node::DomNodeData;

fn page(children: Vec<DomNodeData>) -> DomNodeData {
    DomNodeData::document().with_child(
        DomNodeData::element("html")
            .with_child(DomNodeData::element("body").with_children(children)),
    )
}

#[test]
fn test_headers_paragraphs_and_lists() {
    let root = page(vec![
        DomNodeData::element("h1").with_child(DomNodeData::text_node("Welcome")),
        DomNodeData::element("p").with_child(DomNodeData::text_node("Intro   text here.")),
        DomNodeData::element("h3").with_child(DomNodeData::text_node("Details")),
        DomNodeData::element("ul")
            .with_child(DomNodeData::element("li").with_child(DomNodeData::text_node("first")))
            .with_child(DomNodeData::element("li").with_child(DomNodeData::text_node("second"))),
    ]);
    let md = extract_markdown(&root, "https://example.com/", true);

    assert_eq!(
        md,
        "# Welcome\n\nIntro text here.\n\n### Details\n\n- first\n- second"
    );
}

#[test]
fn test_links_resolve_against_base() {
    let root = page(vec![DomNodeData::element("p").with_children(vec![
        DomNodeData::text_node("See"),
        DomNodeData::element("a")
            .with_attr("href", "../guide/start")
            .with_child(DomNodeData::text_node("the guide")),
    ])]);
    let md = extract_markdown(&root, "https://example.com/docs/page/", true);
    assert_eq!(md, "See [the guide](https://example.com/docs/guide/start)");

    let plain = extract_markdown(&root, "https://example.com/docs/page/", false);
    assert_eq!(plain, "See the guide");
}

#[test]
fn test_tables_and_code() {
    let row = |cells: &[&str], header: bool| {
        let tag = if header { "th" } else { "td" };
        DomNodeData::element("tr").with_children(
            cells
                .iter()
                .map(|c| DomNodeData::element(tag).with_child(DomNodeData::text_node(*c)))
                .collect::<Vec<_>>(),
        )
    };
    let root = page(vec![
        DomNodeData::element("table")
            .with_child(row(&["Name", "Size"], true))
            .with_child(row(&["a.txt", "12"], false)),
        DomNodeData::element("p").with_children(vec![
            DomNodeData::text_node("Run"),
            DomNodeData::element("code").with_child(DomNodeData::text_node("make all")),
        ]),
        DomNodeData::element("pre")
            .with_child(DomNodeData::text_node("fn main() {\n    run();\n}")),
    ]);
    let md = extract_markdown(&root, "https://example.com/", true);

    assert!(md.contains("| Name | Size |\n| a.txt | 12 |"));
    assert!(md.contains("Run `make all`"));
    assert!(md.contains("```\nfn main() {\n    run();\n}\n```"));
}

#[test]
fn test_blockquote_prefix_and_rule() {
    let root = page(vec![
        DomNodeData::element("blockquote")
            .with_child(DomNodeData::element("p").with_child(DomNodeData::text_node("line one")))
            .with_child(DomNodeData::element("p").with_child(DomNodeData::text_node("line two"))),
        DomNodeData::element("hr"),
    ]);
    let md = extract_markdown(&root, "https://example.com/", true);
    assert!(md.starts_with("> line one\n>\n> line two"));
    assert!(md.ends_with("---"));
}

#[test]
fn test_hidden_and_noncontent_subtrees_dropped() {
    let root = page(vec![
        DomNodeData::element("script").with_child(DomNodeData::text_node("var x = 1;")),
        DomNodeData::element("div")
            .with_style(|s| s.display = "none".to_string())
            .with_child(DomNodeData::text_node("invisible words")),
        DomNodeData::element("p").with_child(DomNodeData::text_node("visible words")),
    ]);
    let md = extract_markdown(&root, "https://example.com/", true);
    assert_eq!(md, "visible words");
}

#[test]
fn test_blank_lines_collapse_to_one() {
    let root = page(vec![
        DomNodeData::element("div"),
        DomNodeData::element("div"),
        DomNodeData::element("p").with_child(DomNodeData::text_node("a")),
        DomNodeData::element("div"),
        DomNodeData::element("p").with_child(DomNodeData::text_node("b")),
    ]);
    let md = extract_markdown(&root, "https://example.com/", true);
    assert_eq!(md, "a\n\nb");
}

#[test]
fn test_json_blobs_are_redacted() {
    let blob = format!(
        "{{\"items\":[{}]}}",
        (0..40)
            .map(|i| format!("{{\"id\":{i},\"name\":\"row {i}\"}}"))
            .collect::<Vec<_>>()
            .join(",")
    );
    assert!(blob.len() > 200);
    let root = page(vec![
        DomNodeData::element("p").with_child(DomNodeData::text_node(format!("before {blob} after"))),
    ]);
    let md = extract_markdown(&root, "https://example.com/", true);

    assert!(md.starts_with("before [json data removed: "));
    assert!(md.ends_with(" chars] after"));
    assert!(!md.contains("\"id\""));

    // Short JSON-ish runs stay.
    let small = redact_json_blobs("config {\"a\":1} done");
    assert_eq!(small, "config {\"a\":1} done");
}
