use super::*;

#[test]
fn test_browser_config_defaults() {
    let config = BrowserConfig::default();
    assert_eq!(config.debug_port, 9222);
    assert_eq!(config.endpoint(), "http://127.0.0.1:9222");
    assert!(config.auto_launch);
    assert!(!config.headless);
    assert_eq!(config.command_timeout_ms, 30_000);
}

#[test]
fn test_perception_defaults() {
    let config = PerceptionConfig::default();
    assert_eq!(config.max_depth, 30);
    assert_eq!(config.viewport_expansion, 500);
    assert!(config.preserved_attributes.iter().any(|a| a == "aria-label"));
    assert!(config.preserved_attributes.iter().any(|a| a == "placeholder"));
}

#[test]
fn test_perception_overrides() {
    let base = PerceptionConfig::default();
    let tuned = base.with_overrides(Some(-1), Some(10));
    assert_eq!(tuned.viewport_expansion, -1);
    assert_eq!(tuned.max_depth, 10);
    // Untouched fields carry over.
    assert_eq!(tuned.max_elements, base.max_elements);

    let same = base.with_overrides(None, None);
    assert_eq!(same.viewport_expansion, base.viewport_expansion);
}

#[test]
fn test_config_fills_defaults_for_missing_fields() {
    let config: BrowserConfig =
        serde_json::from_str(r#"{"debug_port": 9333, "headless": true}"#).unwrap();
    assert_eq!(config.debug_port, 9333);
    assert!(config.headless);
    assert_eq!(config.debug_host, "127.0.0.1");
}
