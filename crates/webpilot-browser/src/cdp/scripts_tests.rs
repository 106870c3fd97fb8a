use super::*;

fn braces_balance(script: &str) -> bool {
    let mut depth = 0i64;
    for c in script.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

#[test]
fn test_function_scripts_are_function_declarations() {
    for script in [
        DESCRIBE_NODE,
        SET_FIELD_VALUE,
        DROPDOWN_OPTIONS,
        SELECT_OPTION,
        CLICK_NODE,
        SCROLL_INTO_VIEW,
        HIGHLIGHT_NODE,
        SCROLL_NODE_BY,
    ] {
        assert!(script.starts_with("function"), "not a function: {script}");
        assert!(braces_balance(script), "unbalanced braces: {script}");
    }
}

#[test]
fn test_page_scroll_by_embeds_delta() {
    let script = page_scroll_by(0.0, 720.0);
    assert!(script.contains("top: 720"));
    assert!(script.contains("window.scrollBy"));
    assert!(braces_balance(&script));
}

#[test]
fn test_page_scroll_info_is_an_expression() {
    assert!(PAGE_SCROLL_INFO.starts_with("(function()"));
    assert!(PAGE_SCROLL_INFO.trim_end().ends_with("})()"));
}
