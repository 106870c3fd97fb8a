use super::*;
use std::io::Write;

use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults_match_library_defaults() {
    let config = Config::default();
    assert_eq!(config.browser.debug_host, "127.0.0.1");
    assert_eq!(config.browser.debug_port, 9222);
    assert!(config.browser.auto_launch);
    assert!(!config.browser.headless);
    assert_eq!(config.perception.max_elements, 400);
    assert_eq!(config.agent.max_steps, 50);
    assert!(!config.agent.capture_screenshots);
}

#[test]
fn test_partial_file_fills_the_rest_with_defaults() {
    let file = write_config(
        r#"
[browser]
debug_port = 9333
headless = true

[agent]
max_steps = 12
"#,
    );
    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.browser.debug_port, 9333);
    assert!(config.browser.headless);
    assert_eq!(config.agent.max_steps, 12);
    // Untouched sections keep their defaults.
    assert_eq!(config.browser.debug_host, "127.0.0.1");
    assert_eq!(config.perception.viewport_expansion, 500);
    assert!(!config.agent.capture_screenshots);
}

#[test]
fn test_timeout_and_perception_tuning() {
    let file = write_config(
        r#"
[browser]
command_timeout_ms = 5000
navigation_timeout_ms = 8000

[perception]
max_elements = 50
viewport_expansion = -1
"#,
    );
    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.browser.command_timeout_ms, 5000);
    assert_eq!(config.browser.navigation_timeout_ms, 8000);
    assert_eq!(config.perception.max_elements, 50);
    assert_eq!(config.perception.viewport_expansion, -1);
}

#[test]
fn test_explicit_missing_path_is_an_error() {
    let err = Config::load(Some(Path::new("/nonexistent/webpilot.toml"))).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/webpilot.toml"));
}

#[test]
fn test_malformed_file_names_the_file() {
    let file = write_config("[browser\ndebug_port = not-a-number");
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("parsing config file"));
}
