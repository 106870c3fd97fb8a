use super::*;

#[test]
fn test_unknown_index_vs_stale_element_are_distinct() {
    let unknown = BrowserError::UnknownIndex {
        index: 7,
        generation: 3,
    };
    let stale = BrowserError::StaleElement { index: 7 };
    assert!(unknown.to_string().contains("no element at index 7"));
    assert!(unknown.to_string().contains("generation 3"));
    assert!(stale.to_string().contains("no longer attached"));
    assert_ne!(unknown.to_string(), stale.to_string());
}

#[test]
fn test_protocol_error_carries_code() {
    let err = BrowserError::Protocol {
        code: -32000,
        message: "Could not find node".to_string(),
    };
    assert!(err.to_string().contains("-32000"));
    assert!(err.to_string().contains("Could not find node"));
}

#[test]
fn test_serialization_error_converts() {
    let bad = serde_json::from_str::<serde_json::Value>("{not json");
    let err: BrowserError = bad.unwrap_err().into();
    assert!(matches!(err, BrowserError::Serialization(_)));
}

#[test]
fn test_url_parse_error_converts() {
    let err: BrowserError = url::Url::parse("::nope::").unwrap_err().into();
    assert!(matches!(err, BrowserError::InvalidRequest(_)));
    assert!(err.to_string().contains("bad URL"));
}

#[test]
fn test_timeout_mentions_duration() {
    assert!(BrowserError::Timeout(30_000).to_string().contains("30000"));
}
