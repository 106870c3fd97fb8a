use serde_json::json;

use super::*;

fn metrics() -> LayoutMetrics {
    LayoutMetrics {
        viewport: Rect::new(0.0, 0.0, 1280.0, 800.0),
        scroll: ScrollInfo::new(0.0, 100.0, 1280.0, 2000.0, 1280.0, 800.0),
    }
}

/// A page scrolled 100px down: html > body > (button#go "Go", input value
/// "hello" checked, div display:none without layout).
fn capture_fixture() -> serde_json::Value {
    json!({
        "strings": [
            "https://example.com/", // 0
            "Example",              // 1
            "HTML",                 // 2
            "BODY",                 // 3
            "BUTTON",               // 4
            "Go",                   // 5
            "id",                   // 6
            "go",                   // 7
            "block",                // 8
            "visible",              // 9
            "1",                    // 10
            "auto",                 // 11
            "pointer",              // 12
            "static",               // 13
            "INPUT",                // 14
            "hello",                // 15
            "#document",            // 16
            "DIV",                  // 17
        ],
        "documents": [{
            "documentURL": 0,
            "title": 1,
            "scrollOffsetX": 0.0,
            "scrollOffsetY": 100.0,
            "contentWidth": 1280.0,
            "contentHeight": 2000.0,
            "nodes": {
                "parentIndex":   [-1, 0, 1, 2, 3, 2, 2],
                "nodeType":      [9, 1, 1, 1, 3, 1, 1],
                "nodeName":      [16, 2, 3, 4, -1, 14, 17],
                "nodeValue":     [-1, -1, -1, -1, 5, -1, -1],
                "backendNodeId": [100, 101, 102, 103, 104, 105, 106],
                "attributes":    [[], [], [], [6, 7], [], [], []],
                "inputValue":    {"index": [5], "value": [15]},
                "inputChecked":  {"index": [5]},
                "optionSelected": {"index": []},
                "contentDocumentIndex": {"index": [], "value": []}
            },
            "layout": {
                "nodeIndex": [1, 2, 3, 5],
                "styles": [
                    [8, 9, 10, 9, 9, 11, 13],
                    [8, 9, 10, 9, 9, 11, 13],
                    [8, 9, 10, 9, 9, 12, 13],
                    [8, 9, 10, 9, 9, 11, 13]
                ],
                "bounds": [
                    [0.0, 0.0, 1280.0, 2000.0],
                    [0.0, 0.0, 1280.0, 2000.0],
                    [40.0, 150.0, 120.0, 40.0],
                    [40.0, 260.0, 200.0, 30.0]
                ],
                "scrollRects": [[0.0, 100.0, 1280.0, 2000.0], [], [], []],
                "clientRects": [[0.0, 0.0, 1280.0, 800.0], [], [], []]
            }
        }]
    })
}

#[test]
fn test_decode_builds_tree_with_backend_ids() {
    let data = decode_snapshot(capture_fixture(), &metrics()).unwrap();

    assert_eq!(data.url, "https://example.com/");
    assert_eq!(data.title, "Example");

    let html = &data.root.children[0];
    assert_eq!(html.tag, "html");
    let body = &html.children[0];
    assert_eq!(body.tag, "body");
    assert_eq!(body.backend_id, Some(102));

    let button = &body.children[0];
    assert_eq!(button.tag, "button");
    assert_eq!(button.backend_id, Some(103));
    assert_eq!(button.attr("id"), Some("go"));
    assert!(button.children[0].is_text());
    assert_eq!(button.children[0].text, "Go");

    let input = &body.children[1];
    assert_eq!(input.value.as_deref(), Some("hello"));
    assert!(input.checked);
}

#[test]
fn test_bounds_shift_by_document_scroll() {
    let data = decode_snapshot(capture_fixture(), &metrics()).unwrap();
    let button = &data.root.children[0].children[0].children[0];

    // Document y 150 with the page scrolled 100px down.
    assert_eq!(button.rect, Some(Rect::new(40.0, 50.0, 120.0, 40.0)));
}

#[test]
fn test_elements_without_layout_have_no_rect() {
    let data = decode_snapshot(capture_fixture(), &metrics()).unwrap();
    let body = &data.root.children[0].children[0];

    let div = &body.children[2];
    assert_eq!(div.tag, "div");
    assert!(div.rect.is_none());
    assert!(div.scroll.is_none());
}

#[test]
fn test_scroll_metrics_only_where_content_overflows() {
    let data = decode_snapshot(capture_fixture(), &metrics()).unwrap();
    let html = &data.root.children[0];

    let scroll = html.scroll.expect("html overflows");
    assert_eq!(scroll.scroll_top, 100.0);
    assert_eq!(scroll.scroll_height, 2000.0);
    assert_eq!(scroll.client_height, 800.0);

    let button = &html.children[0].children[0];
    assert!(button.scroll.is_none());
}

#[test]
fn test_style_rows_decode_in_request_order() {
    let data = decode_snapshot(capture_fixture(), &metrics()).unwrap();
    let button = &data.root.children[0].children[0].children[0];

    assert_eq!(button.style.display, "block");
    assert_eq!(button.style.cursor, "pointer");
    assert_eq!(button.style.opacity, 1.0);
}

#[test]
fn test_iframe_content_composes_viewport_origin() {
    let raw = json!({
        "strings": ["IFRAME", "BUTTON", "block", "visible", "1", "auto", "static", "inner"],
        "documents": [
            {
                "scrollOffsetX": 0.0,
                "scrollOffsetY": 0.0,
                "nodes": {
                    "parentIndex":   [-1, 0],
                    "nodeType":      [9, 1],
                    "nodeName":      [-1, 0],
                    "nodeValue":     [-1, -1],
                    "backendNodeId": [1, 2],
                    "attributes":    [[], []],
                    "contentDocumentIndex": {"index": [1], "value": [1]}
                },
                "layout": {
                    "nodeIndex": [1],
                    "styles": [[2, 3, 4, 3, 3, 5, 6]],
                    "bounds": [[100.0, 200.0, 400.0, 300.0]],
                    "scrollRects": [[]],
                    "clientRects": [[]]
                }
            },
            {
                "scrollOffsetX": 0.0,
                "scrollOffsetY": 0.0,
                "nodes": {
                    "parentIndex":   [-1, 0, 1],
                    "nodeType":      [9, 1, 3],
                    "nodeName":      [-1, 1, -1],
                    "nodeValue":     [-1, -1, 7],
                    "backendNodeId": [10, 11, 12],
                    "attributes":    [[], [], []]
                },
                "layout": {
                    "nodeIndex": [1],
                    "styles": [[2, 3, 4, 3, 3, 5, 6]],
                    "bounds": [[10.0, 20.0, 80.0, 30.0]],
                    "scrollRects": [[]],
                    "clientRects": [[]]
                }
            }
        ]
    });

    let data = decode_snapshot(raw, &metrics()).unwrap();
    let iframe = &data.root.children[0];
    assert_eq!(iframe.tag, "iframe");

    let inner_doc = iframe.content_document.as_deref().expect("frame content");
    let inner_button = &inner_doc.children[0];
    assert_eq!(inner_button.tag, "button");
    assert_eq!(inner_button.backend_id, Some(11));
    // Frame document origin (100, 200) plus in-frame position (10, 20).
    assert_eq!(inner_button.rect, Some(Rect::new(110.0, 220.0, 80.0, 30.0)));
}

#[test]
fn test_shadow_fragments_splice_into_host() {
    let raw = json!({
        "strings": ["DIV", "SPAN"],
        "documents": [{
            "nodes": {
                "parentIndex":   [-1, 0, 1, 2],
                "nodeType":      [9, 1, 11, 1],
                "nodeName":      [-1, 0, -1, 1],
                "nodeValue":     [-1, -1, -1, -1],
                "backendNodeId": [1, 2, 3, 4],
                "attributes":    [[], [], [], []]
            },
            "layout": {}
        }]
    });

    let data = decode_snapshot(raw, &metrics()).unwrap();
    let host = &data.root.children[0];
    assert_eq!(host.tag, "div");
    assert_eq!(host.children.len(), 1);
    assert_eq!(host.children[0].tag, "span");
}

#[test]
fn test_empty_capture_is_an_error() {
    let raw = json!({"strings": [], "documents": []});
    assert!(decode_snapshot(raw, &metrics()).is_err());
}

#[test]
fn test_layout_metrics_decode() {
    let raw = json!({
        "cssLayoutViewport": {"pageX": 0.0, "pageY": 340.0, "clientWidth": 1280.0, "clientHeight": 720.0},
        "cssContentSize": {"width": 1280.0, "height": 4600.0}
    });
    let metrics = decode_layout_metrics(&raw);

    assert_eq!(metrics.viewport, Rect::new(0.0, 0.0, 1280.0, 720.0));
    assert_eq!(metrics.scroll.scroll_y, 340.0);
    assert_eq!(metrics.scroll.content_height, 4600.0);
    assert_eq!(metrics.scroll.viewport_height, 720.0);
}

#[test]
fn test_scroll_info_from_script_value() {
    let value = json!({
        "scrollX": 0.0,
        "scrollY": 500.0,
        "contentWidth": 1280.0,
        "contentHeight": 3000.0,
        "viewportWidth": 1280.0,
        "viewportHeight": 1000.0
    });
    let info = scroll_info_from_value(&value);
    assert_eq!(info.scroll_y, 500.0);
    assert_eq!(info.pages_above, 0.5);
    assert_eq!(info.pages_below, 1.5);
}
