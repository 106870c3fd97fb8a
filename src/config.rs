//! Runtime configuration for the webpilot binary.
//!
//! Settings load from a TOML file (`--config` path, or `./webpilot.toml`
//! when one exists), then command-line flags override individual fields.
//! Every section and every field is optional; what the file does not set
//! falls back to the library defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use webpilot_browser::{BrowserConfig, PerceptionConfig};

/// `[agent]` section: task-loop tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AgentSection {
    /// Step ceiling per task.
    pub max_steps: u32,
    /// Attach a screenshot to every perception pass.
    pub capture_screenshots: bool,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_steps: 50,
            capture_screenshots: false,
        }
    }
}

/// Everything `webpilot.toml` can carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub browser: BrowserConfig,
    pub perception: PerceptionConfig,
    pub agent: AgentSection,
}

impl Config {
    /// Load from `path` when given (the file must exist), otherwise from
    /// `./webpilot.toml` when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let local = PathBuf::from("webpilot.toml");
                if !local.exists() {
                    return Ok(Self::default());
                }
                local
            }
        };
        Self::from_file(&path)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
