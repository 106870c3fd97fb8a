use super::*;
use crate::dom::node::{DomSnapshotData, ElementScroll};

fn snapshot_with_body(children: Vec<DomNodeData>) -> DomSnapshotData {
    let body = DomNodeData::element("body")
        .with_rect(0.0, 0.0, 1280.0, 1000.0)
        .with_children(children);
    let html = DomNodeData::element("html")
        .with_rect(0.0, 0.0, 1280.0, 1000.0)
        .with_child(body);
    DomSnapshotData::new(
        "https://example.com/",
        "Example",
        DomNodeData::document().with_child(html),
    )
}

fn go_button() -> DomNodeData {
    DomNodeData::element("button")
        .with_rect(100.0, 100.0, 80.0, 30.0)
        .with_backend_id(42)
        .with_child(DomNodeData::text_node("Go"))
}

#[test]
fn test_single_button_gets_index_one() {
    let data = snapshot_with_body(vec![go_button().with_attr("id", "go")]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    assert_eq!(built.snapshot.element_count(), 1);
    let element = &built.snapshot.elements[0];
    assert_eq!(element.index, 1);
    assert_eq!(element.tag, "button");
    assert_eq!(element.text, "Go");
    assert!(built.snapshot.tree_text.contains("[1]<button id=go>Go</button>"));

    let node_ref = built.registry.resolve(1).unwrap();
    assert_eq!(node_ref.backend_id, Some(42));
    assert_eq!(node_ref.tag, "button");
    assert_eq!(node_ref.css_selector, "#go");
}

#[test]
fn test_indices_are_stable_across_rebuilds() {
    let data = snapshot_with_body(vec![
        go_button().with_attr("id", "a"),
        DomNodeData::element("a")
            .with_rect(100.0, 200.0, 120.0, 20.0)
            .with_attr("href", "/next")
            .with_child(DomNodeData::text_node("Next")),
        DomNodeData::element("input")
            .with_rect(100.0, 300.0, 200.0, 24.0)
            .with_attr("name", "q"),
    ]);
    let config = PerceptionConfig::default();
    let first = build_tree(&data, &config, 1);
    let second = build_tree(&data, &config, 2);

    assert_eq!(first.snapshot.tree_text, second.snapshot.tree_text);
    assert_eq!(first.snapshot.elements, second.snapshot.elements);
    assert_eq!(first.snapshot.generation, 1);
    assert_eq!(second.snapshot.generation, 2);
    assert_eq!(second.registry.generation(), 2);
}

#[test]
fn test_invisible_wrapper_does_not_suppress_children() {
    // The wrapper is display:none (and has no layout), but the child is
    // reported with its own geometry: it must still be indexed.
    let wrapper = DomNodeData::element("div")
        .with_style(|s| s.display = "none".to_string())
        .with_child(go_button());
    let data = snapshot_with_body(vec![wrapper]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    assert_eq!(built.snapshot.element_count(), 1);
    assert_eq!(built.snapshot.elements[0].index, 1);
    assert_eq!(built.snapshot.elements[0].tag, "button");
}

#[test]
fn test_elided_wrappers_do_not_indent() {
    // body > div > div > button: the wrappers render nothing, so the button
    // line sits at indentation zero.
    let nested = DomNodeData::element("div")
        .with_rect(0.0, 0.0, 1280.0, 400.0)
        .with_child(
            DomNodeData::element("div")
                .with_rect(0.0, 0.0, 1280.0, 400.0)
                .with_child(go_button()),
        );
    let data = snapshot_with_body(vec![nested]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    assert_eq!(built.snapshot.tree_text, "[1]<button>Go</button>");
}

#[test]
fn test_descendants_of_anchors_are_suppressed() {
    let anchor = DomNodeData::element("a")
        .with_rect(100.0, 100.0, 200.0, 40.0)
        .with_attr("href", "/buy")
        .with_child(
            DomNodeData::element("span")
                .with_rect(110.0, 105.0, 80.0, 20.0)
                .with_style(|s| s.cursor = "pointer".to_string())
                .with_child(DomNodeData::text_node("Buy now")),
        );
    let data = snapshot_with_body(vec![anchor]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    // Only the anchor is indexed; the pointer-styled span inside it is noise.
    assert_eq!(built.snapshot.element_count(), 1);
    assert_eq!(built.snapshot.elements[0].tag, "a");
}

#[test]
fn test_form_controls_escape_suppression() {
    let anchor = DomNodeData::element("a")
        .with_rect(100.0, 100.0, 300.0, 60.0)
        .with_attr("href", "#")
        .with_child(
            DomNodeData::element("input")
                .with_rect(110.0, 110.0, 100.0, 24.0)
                .with_attr("type", "checkbox"),
        );
    let data = snapshot_with_body(vec![anchor]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    let tags: Vec<&str> = built
        .snapshot
        .elements
        .iter()
        .map(|e| e.tag.as_str())
        .collect();
    assert_eq!(tags, vec!["a", "input"]);
}

#[test]
fn test_file_input_indexed_without_layout() {
    let hidden_upload = DomNodeData::element("input")
        .with_attr("type", "file")
        .with_style(|s| s.display = "none".to_string());
    let data = snapshot_with_body(vec![hidden_upload]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    assert_eq!(built.snapshot.element_count(), 1);
    assert_eq!(built.snapshot.elements[0].tag, "input");
    assert!(!built.snapshot.elements[0].visible);
}

#[test]
fn test_scroll_container_renders_context_line() {
    let list = DomNodeData::element("div")
        .with_rect(0.0, 0.0, 300.0, 400.0)
        .with_attr("id", "feed")
        .with_scroll(ElementScroll {
            scroll_top: 400.0,
            scroll_left: 0.0,
            scroll_width: 300.0,
            scroll_height: 2000.0,
            client_width: 300.0,
            client_height: 400.0,
        })
        .with_style(|s| s.overflow_y = "auto".to_string())
        .with_child(go_button());
    let data = snapshot_with_body(vec![list]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    let lines: Vec<&str> = built.snapshot.tree_text.lines().collect();
    assert_eq!(lines[0], "[scroll]<div id=feed/> (1.0 pages above, 3.0 pages below)");
    // The container renders a line, so its child indents one level.
    assert_eq!(lines[1], "\t[1]<button>Go</button>");
    // Context lines are not actionable.
    assert_eq!(built.snapshot.element_count(), 1);
}

#[test]
fn test_text_is_not_duplicated_under_indexed_elements() {
    let para = DomNodeData::element("p")
        .with_rect(0.0, 500.0, 600.0, 40.0)
        .with_child(DomNodeData::text_node("Plain paragraph."));
    let anchor = DomNodeData::element("a")
        .with_rect(0.0, 560.0, 100.0, 20.0)
        .with_attr("href", "/x")
        .with_child(
            DomNodeData::element("span")
                .with_rect(0.0, 560.0, 100.0, 20.0)
                .with_child(DomNodeData::text_node("Details")),
        );
    let data = snapshot_with_body(vec![para, anchor]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    // "Details" appears once, inside the anchor line.
    assert_eq!(built.snapshot.tree_text.matches("Details").count(), 1);
    assert!(built.snapshot.tree_text.contains("Plain paragraph."));
}

#[test]
fn test_deny_list_subtrees_are_dropped() {
    let script = DomNodeData::element("script")
        .with_child(DomNodeData::text_node("var secret = 1;"));
    let svg = DomNodeData::element("svg")
        .with_rect(10.0, 10.0, 16.0, 16.0)
        .with_child(DomNodeData::element("path").with_attr("d", "M0 0L10 10"));
    let data = snapshot_with_body(vec![script, svg, go_button()]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    assert!(!built.snapshot.tree_text.contains("secret"));
    assert!(!built.snapshot.tree_text.contains("path"));
    assert_eq!(built.snapshot.element_count(), 1);
}

#[test]
fn test_viewport_expansion_bounds_indexing() {
    let below_fold = DomNodeData::element("button")
        .with_rect(100.0, 1400.0, 80.0, 30.0)
        .with_child(DomNodeData::text_node("Later"));
    let data = snapshot_with_body(vec![go_button(), below_fold]);

    let near = build_tree(&data, &PerceptionConfig::default(), 1);
    assert_eq!(near.snapshot.element_count(), 2);

    let strict = PerceptionConfig {
        viewport_expansion: 0,
        ..PerceptionConfig::default()
    };
    let tight = build_tree(&data, &strict, 1);
    assert_eq!(tight.snapshot.element_count(), 1);

    let everything = PerceptionConfig {
        viewport_expansion: -1,
        ..PerceptionConfig::default()
    };
    let all = build_tree(&data, &everything, 1);
    assert_eq!(all.snapshot.element_count(), 2);
}

#[test]
fn test_element_cap_stops_indexing() {
    let buttons: Vec<DomNodeData> = (0..5)
        .map(|i| {
            DomNodeData::element("button")
                .with_rect(10.0, 10.0 + 40.0 * f64::from(i), 80.0, 30.0)
                .with_child(DomNodeData::text_node(format!("B{i}")))
        })
        .collect();
    let data = snapshot_with_body(buttons);
    let config = PerceptionConfig {
        max_elements: 3,
        ..PerceptionConfig::default()
    };
    let built = build_tree(&data, &config, 1);

    assert_eq!(built.snapshot.element_count(), 3);
    assert_eq!(built.registry.len(), 3);
}

#[test]
fn test_registry_rejects_unknown_index() {
    let data = snapshot_with_body(vec![go_button()]);
    let built = build_tree(&data, &PerceptionConfig::default(), 7);

    match built.registry.resolve(99) {
        Err(BrowserError::UnknownIndex { index, generation }) => {
            assert_eq!(index, 99);
            assert_eq!(generation, 7);
        }
        other => panic!("expected UnknownIndex, got {other:?}"),
    }
}

#[test]
fn test_frame_content_is_walked() {
    let frame_doc = DomNodeData::document().with_child(
        DomNodeData::element("html").with_rect(0.0, 0.0, 400.0, 300.0).with_child(
            DomNodeData::element("body")
                .with_rect(0.0, 0.0, 400.0, 300.0)
                .with_child(
                    DomNodeData::element("button")
                        .with_rect(20.0, 20.0, 60.0, 20.0)
                        .with_child(DomNodeData::text_node("Inner")),
                ),
        ),
    );
    let iframe = DomNodeData::element("iframe")
        .with_rect(0.0, 0.0, 400.0, 300.0)
        .with_content_document(frame_doc);
    let data = snapshot_with_body(vec![iframe, go_button()]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    let texts: Vec<&str> = built
        .snapshot
        .elements
        .iter()
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Inner", "Go"]);
}

#[test]
fn test_frame_clips_out_of_bounds_content() {
    // The second button sits past the iframe's bounds; the frame clips it,
    // so only the first is indexed.
    let frame_doc = DomNodeData::document().with_child(
        DomNodeData::element("body")
            .with_rect(0.0, 0.0, 400.0, 300.0)
            .with_children(vec![
                DomNodeData::element("button")
                    .with_rect(20.0, 20.0, 60.0, 20.0)
                    .with_child(DomNodeData::text_node("Shown")),
                DomNodeData::element("button")
                    .with_rect(500.0, 400.0, 60.0, 20.0)
                    .with_child(DomNodeData::text_node("Clipped")),
            ]),
    );
    let iframe = DomNodeData::element("iframe")
        .with_rect(0.0, 0.0, 400.0, 300.0)
        .with_content_document(frame_doc);
    let data = snapshot_with_body(vec![iframe]);
    let built = build_tree(&data, &PerceptionConfig::default(), 1);

    let texts: Vec<&str> = built
        .snapshot
        .elements
        .iter()
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Shown"]);
}
