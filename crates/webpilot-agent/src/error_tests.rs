use super::*;

#[test]
fn test_busy_message() {
    assert_eq!(AgentError::Busy.to_string(), "a task is already running");
}

#[test]
fn test_step_limit_names_the_ceiling() {
    let msg = AgentError::StepLimitReached(50).to_string();
    assert!(msg.contains("step limit of 50"), "got: {msg}");
}

#[test]
fn test_perception_wraps_browser_error() {
    let err = AgentError::from(BrowserError::NotConnected);
    let msg = err.to_string();
    assert!(msg.starts_with("perception failed:"), "got: {msg}");
    assert!(msg.contains("not connected"), "got: {msg}");
}
