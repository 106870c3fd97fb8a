use super::*;
use crate::config::BrowserConfig;

#[test]
fn test_find_chrome_does_not_panic() {
    let _result = BrowserManager::find_chrome();
}

#[test]
fn test_profile_dir_default_under_home() {
    let manager = BrowserManager::new(BrowserConfig::default());
    let profile = manager.profile_dir();
    assert!(profile.ends_with(".webpilot/browser-profile"));
}

#[test]
fn test_profile_dir_honors_override() {
    let config = BrowserConfig {
        user_data_dir: Some("/tmp/webpilot-test-profile".to_string()),
        ..BrowserConfig::default()
    };
    let manager = BrowserManager::new(config);
    assert_eq!(
        manager.profile_dir(),
        PathBuf::from("/tmp/webpilot-test-profile")
    );
}

#[test]
fn test_browser_binary_rejects_missing_override() {
    let config = BrowserConfig {
        chrome_path: Some("/nonexistent/chrome-binary".to_string()),
        ..BrowserConfig::default()
    };
    let manager = BrowserManager::new(config);
    assert!(matches!(
        manager.browser_binary(),
        Err(BrowserError::ConnectionFailed(_))
    ));
}

#[tokio::test]
async fn test_close_without_connect() {
    let manager = BrowserManager::new(BrowserConfig::default());
    assert!(manager.close().await.is_ok());
}

#[tokio::test]
async fn test_no_active_page_before_connect() {
    let manager = BrowserManager::new(BrowserConfig::default());
    assert!(!manager.has_active_page().await);
}
