//! Browser session wiring shared by the CLI commands.

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use webpilot_browser::{AutomationSession, BrowserManager};
use webpilot_protocols::{NavigateParams, ToolAction};

use crate::config::Config;

/// Connect (or launch) per config and wrap the browser in a session. When
/// `url` is given the active tab navigates there first.
///
/// The browser is left running on exit so later invocations can re-attach
/// to the same endpoint and profile.
pub(crate) async fn open_session(
    config: &Config,
    url: Option<&str>,
) -> Result<Arc<AutomationSession>> {
    let manager = Arc::new(BrowserManager::new(config.browser.clone()));
    info!(endpoint = %config.browser.endpoint(), "using browser endpoint");

    let session = Arc::new(AutomationSession::new(
        manager,
        config.perception.clone(),
        config.browser.navigation_timeout_ms,
    ));

    if let Some(url) = url {
        let result = session
            .execute(&ToolAction::Navigate(NavigateParams {
                url: url.to_string(),
                new_tab: false,
            }))
            .await;
        if !result.is_success() {
            bail!("navigation to {url} failed: {}", result.error_message());
        }
    }

    Ok(session)
}
