//! Error types for the browser core.

use thiserror::Error;

/// Everything that can go wrong between the dispatcher and the page.
///
/// Target-resolution failures (`UnknownIndex`, `StaleElement`,
/// `TargetNotFound`, `InvalidTarget`) are deliberately distinct so callers
/// can tell "you gave me a bad index" from "the page moved on underneath
/// you". Wait-style timeouts are not errors at all; `Timeout` here is only
/// for internal protocol bounds.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser is not connected")]
    NotConnected,

    #[error("failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("browser debug endpoint not reachable at {0}")]
    EndpointUnreachable(String),

    #[error("no Chrome or Chromium binary found; install one or set chrome_path")]
    ChromeNotFound,

    #[error("failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("protocol error {code}: {message}")]
    Protocol { code: i64, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no element at index {index} in snapshot generation {generation}; take a fresh snapshot")]
    UnknownIndex { index: u32, generation: u64 },

    #[error("element {index} is no longer attached to the page")]
    StaleElement { index: u32 },

    #[error("no element matches {0}")]
    TargetNotFound(String),

    #[error("{0}")]
    InvalidTarget(String),

    #[error("page script failed: {0}")]
    PageScript(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("operation timed out after {0}ms")]
    Timeout(u64),

    #[error("browser session closed")]
    SessionClosed,

    #[error("invalid response from browser: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for BrowserError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

impl From<reqwest::Error> for BrowserError {
    fn from(err: reqwest::Error) -> Self {
        Self::ConnectionFailed(err.to_string())
    }
}

impl From<url::ParseError> for BrowserError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidRequest(format!("bad URL: {err}"))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
