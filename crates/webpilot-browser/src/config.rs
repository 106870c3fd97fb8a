//! Configuration for the browser connection and the perception pass.

use serde::{Deserialize, Serialize};

/// Attributes kept on indexed elements, in the order they are rendered.
pub const DEFAULT_PRESERVED_ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "type",
    "name",
    "role",
    "placeholder",
    "value",
    "href",
    "rel",
    "title",
    "alt",
    "aria-label",
    "aria-expanded",
    "aria-checked",
    "aria-selected",
    "aria-disabled",
    "checked",
    "selected",
    "disabled",
    "readonly",
    "contenteditable",
    "tabindex",
];

/// How to reach (or start) the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// DevTools debug host.
    pub debug_host: String,
    /// DevTools debug port.
    pub debug_port: u16,
    /// Launch a browser when the endpoint is unreachable.
    pub auto_launch: bool,
    /// Run the launched browser headless.
    pub headless: bool,
    /// Explicit browser binary; discovered per-OS when unset.
    pub chrome_path: Option<String>,
    /// Profile directory; a per-user default is created when unset.
    pub user_data_dir: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    /// Per-command protocol timeout.
    pub command_timeout_ms: u64,
    /// Cap on `navigate` load waits.
    pub navigation_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_host: "127.0.0.1".to_string(),
            debug_port: 9222,
            auto_launch: true,
            headless: false,
            chrome_path: None,
            user_data_dir: None,
            window_width: 1280,
            window_height: 900,
            command_timeout_ms: 30_000,
            navigation_timeout_ms: 15_000,
        }
    }
}

impl BrowserConfig {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.debug_host, self.debug_port)
    }
}

/// Tuning for the DOM tree builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Structural recursion limit.
    pub max_depth: usize,
    /// Extra pixels beyond the viewport still considered near enough to
    /// report; -1 reports everything regardless of position.
    pub viewport_expansion: i64,
    /// Cap on indexed elements per snapshot.
    pub max_elements: usize,
    /// Cap on rendered text per line.
    pub max_text_length: usize,
    /// Attribute names preserved on indexed elements.
    pub preserved_attributes: Vec<String>,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            max_depth: 30,
            viewport_expansion: 500,
            max_elements: 400,
            max_text_length: 100,
            preserved_attributes: DEFAULT_PRESERVED_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl PerceptionConfig {
    /// Copy with per-call overrides applied.
    pub fn with_overrides(
        &self,
        viewport_expansion: Option<i64>,
        max_depth: Option<usize>,
    ) -> Self {
        let mut config = self.clone();
        if let Some(expansion) = viewport_expansion {
            config.viewport_expansion = expansion;
        }
        if let Some(depth) = max_depth {
            config.max_depth = depth;
        }
        config
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
