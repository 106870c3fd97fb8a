use super::*;

fn page() -> DomNodeData {
    DomNodeData::document().with_child(
        DomNodeData::element("html").with_child(
            DomNodeData::element("body")
                .with_child(
                    DomNodeData::element("div")
                        .with_attr("id", "main")
                        .with_child(
                            DomNodeData::element("button")
                                .with_attr("class", "btn primary")
                                .with_text("Go"),
                        )
                        .with_child(
                            DomNodeData::element("button")
                                .with_attr("class", "btn")
                                .with_attr("aria-label", "Close dialog"),
                        ),
                )
                .with_child(
                    DomNodeData::element("form").with_child(
                        DomNodeData::element("input")
                            .with_attr("type", "text")
                            .with_attr("name", "q"),
                    ),
                ),
        ),
    )
}

#[test]
fn test_query_by_id() {
    let dom = page();
    let found = query_first(&dom, "#main").unwrap().unwrap();
    assert_eq!(found.tag, "div");
}

#[test]
fn test_query_by_tag_and_class() {
    let dom = page();
    let all = query_all(&dom, "button.btn", 10).unwrap();
    assert_eq!(all.len(), 2);
    let primary = query_all(&dom, "button.primary", 10).unwrap();
    assert_eq!(primary.len(), 1);
}

#[test]
fn test_query_by_attribute() {
    let dom = page();
    let by_name = query_first(&dom, "input[name=\"q\"]").unwrap().unwrap();
    assert_eq!(by_name.tag, "input");
    let by_presence = query_all(&dom, "[aria-label]", 10).unwrap();
    assert_eq!(by_presence.len(), 1);
}

#[test]
fn test_attribute_value_with_space() {
    let dom = page();
    let found = query_first(&dom, "button[aria-label=\"Close dialog\"]")
        .unwrap()
        .unwrap();
    assert_eq!(found.attr("aria-label"), Some("Close dialog"));
}

#[test]
fn test_child_and_descendant_combinators() {
    let dom = page();
    assert_eq!(query_all(&dom, "div > button", 10).unwrap().len(), 2);
    assert_eq!(query_all(&dom, "body button", 10).unwrap().len(), 2);
    // input is not a direct child of body.
    assert!(query_all(&dom, "body > input", 10).unwrap().is_empty());
    assert_eq!(query_all(&dom, "body input", 10).unwrap().len(), 1);
}

#[test]
fn test_nth_of_type() {
    let dom = page();
    let second = query_first(&dom, "button:nth-of-type(2)").unwrap().unwrap();
    assert_eq!(second.attr("aria-label"), Some("Close dialog"));
}

#[test]
fn test_selector_list() {
    let dom = page();
    let matches = query_all(&dom, "input, button.primary", 10).unwrap();
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_limit_respected() {
    let dom = page();
    assert_eq!(query_all(&dom, "button", 1).unwrap().len(), 1);
}

#[test]
fn test_unsupported_pseudo_class_errors() {
    let err = query_all(&page(), "button:hover", 10).unwrap_err();
    assert!(err.to_string().contains("unsupported pseudo-class"));
    assert!(query_first(&page(), "").is_err());
}

#[test]
fn test_matches_count() {
    let dom = page();
    assert_eq!(matches_count(&dom, "button"), 2);
    assert_eq!(matches_count(&dom, "#main"), 1);
    assert_eq!(matches_count(&dom, "#missing"), 0);
    assert_eq!(matches_count(&dom, ":::"), 0);
}

fn chain_for<'a>(dom: &'a DomNodeData, id: i64) -> Vec<ChainEntry<'a>> {
    fn walk<'a>(
        node: &'a DomNodeData,
        nth: usize,
        id: i64,
        chain: &mut Vec<ChainEntry<'a>>,
    ) -> bool {
        chain.push((node, nth));
        if node.backend_id == Some(id) {
            return true;
        }
        let mut counts = std::collections::HashMap::new();
        for child in &node.children {
            if !child.is_element() {
                continue;
            }
            let n = counts.entry(child.tag.clone()).or_insert(0usize);
            *n += 1;
            if walk(child, *n, id, chain) {
                return true;
            }
        }
        chain.pop();
        false
    }
    let mut chain = Vec::new();
    walk(dom, 1, id, &mut chain);
    chain
}

fn tagged_page() -> DomNodeData {
    DomNodeData::document().with_child(
        DomNodeData::element("html").with_child(
            DomNodeData::element("body").with_child(
                DomNodeData::element("div")
                    .with_attr("class", "sidebar css-9x1k2 active")
                    .with_child(DomNodeData::element("a").with_backend_id(1))
                    .with_child(
                        DomNodeData::element("a")
                            .with_attr("id", "logout")
                            .with_backend_id(2),
                    ),
            ),
        ),
    )
}

#[test]
fn test_css_path_prefers_unique_id() {
    let dom = tagged_page();
    let chain = chain_for(&dom, 2);
    assert_eq!(css_path(&chain, &dom), "#logout");
}

#[test]
fn test_css_path_falls_back_to_position() {
    let dom = tagged_page();
    let chain = chain_for(&dom, 1);
    let path = css_path(&chain, &dom);
    assert_eq!(path, "html > body > div:nth-of-type(1) > a:nth-of-type(1)");
    // The fallback still resolves uniquely.
    assert_eq!(matches_count(&dom, &path), 1);
}

#[test]
fn test_css_path_filters_dynamic_classes() {
    // "css-9x1k2" is hashed, "active" is state; only "sidebar" survives.
    let dom = tagged_page();
    let div = query_first(&dom, "div").unwrap().unwrap();
    let chain = chain_for(&dom, div.backend_id.unwrap_or_default());
    // No backend id on the div, so build the chain manually.
    let chain = if chain.is_empty() {
        let html = &dom.children[0];
        let body = &html.children[0];
        vec![(&dom, 1), (html, 1), (body, 1), (&body.children[0], 1)]
    } else {
        chain
    };
    assert_eq!(css_path(&chain, &dom), "div.sidebar");
}

#[test]
fn test_xpath_and_debug_path() {
    let dom = tagged_page();
    let chain = chain_for(&dom, 1);
    assert_eq!(xpath(&chain), "/html[1]/body[1]/div[1]/a[1]");
    assert_eq!(debug_path(&chain), "html > body > div.sidebar > a");
}
