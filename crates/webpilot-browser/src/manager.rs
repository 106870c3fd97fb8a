//! Browser lifecycle: binary discovery, launch, connect, active-page
//! tracking.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cdp::{CdpClient, CdpPage};
use crate::config::BrowserConfig;
use crate::error::BrowserError;
use crate::page::{BrowserHost, PageContext};

/// Owns the connection to one browser instance and the page actions run on.
///
/// Connects lazily: nothing talks to the browser until the first page is
/// requested. When `auto_launch` is set and the debug endpoint is down, a
/// browser is started with a dedicated profile and torn down again by
/// [`shutdown`](Self::shutdown).
pub struct BrowserManager {
    config: BrowserConfig,
    client: RwLock<Option<Arc<CdpClient>>>,
    active: RwLock<Option<Arc<CdpPage>>>,
    /// Browser process handle when this manager launched it.
    browser_process: RwLock<Option<Child>>,
}

impl BrowserManager {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
            active: RwLock::new(None),
            browser_process: RwLock::new(None),
        }
    }

    /// Find a Chrome or Chromium binary on this machine.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    fn browser_binary(&self) -> Result<PathBuf, BrowserError> {
        if let Some(path) = &self.config.chrome_path {
            let p = PathBuf::from(path);
            if p.exists() {
                return Ok(p);
            }
            return Err(BrowserError::ConnectionFailed(format!(
                "configured browser binary not found: {path}"
            )));
        }
        Self::find_chrome().ok_or(BrowserError::ChromeNotFound)
    }

    fn profile_dir(&self) -> PathBuf {
        self.config
            .user_data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".webpilot")
                    .join("browser-profile")
            })
    }

    async fn endpoint_up(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    async fn launch_browser(&self) -> Result<Child, BrowserError> {
        let binary = self.browser_binary()?;
        let profile_dir = self.profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("failed to create profile directory: {e}");
        }

        info!(
            binary = %binary.display(),
            profile = %profile_dir.display(),
            "launching browser"
        );

        let mut cmd = Command::new(&binary);
        cmd.arg(format!("--remote-debugging-port={}", self.config.debug_port))
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg(format!(
                "--window-size={},{}",
                self.config.window_width, self.config.window_height
            ))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--metrics-recording-only")
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if self.config.headless {
            cmd.arg("--headless=new");
        }

        let child = cmd
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!(pid = ?child.id(), "browser launched");
        Ok(child)
    }

    /// Connect to the debug endpoint, launching a browser first when allowed.
    pub async fn connect(&self) -> Result<(), BrowserError> {
        if self.client.read().await.is_some() {
            return Ok(());
        }

        if !self.endpoint_up().await {
            if !self.config.auto_launch {
                return Err(BrowserError::EndpointUnreachable(self.config.endpoint()));
            }

            info!(
                port = self.config.debug_port,
                "debug endpoint down, launching browser"
            );
            let child = self.launch_browser().await?;
            *self.browser_process.write().await = Some(child);

            let mut attempts = 0;
            while attempts < 30 {
                tokio::time::sleep(Duration::from_millis(200)).await;
                if self.endpoint_up().await {
                    break;
                }
                attempts += 1;
            }
            if attempts >= 30 {
                return Err(BrowserError::LaunchFailed(
                    "browser did not open its debug port in time".to_string(),
                ));
            }
        }

        let timeout = Duration::from_millis(self.config.command_timeout_ms);
        let client = CdpClient::connect(&self.config.endpoint(), timeout).await?;
        *self.client.write().await = Some(Arc::new(client));

        info!(endpoint = %self.config.endpoint(), "connected to browser");
        Ok(())
    }

    pub async fn ensure_connected(&self) -> Result<(), BrowserError> {
        if self.client.read().await.is_none() {
            self.connect().await?;
        }
        Ok(())
    }

    async fn client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(BrowserError::NotConnected)
    }

    /// Attach to whatever tab already exists, or open a blank one.
    async fn adopt_page(&self) -> Result<Arc<CdpPage>, BrowserError> {
        let client = self.client().await?;

        let session = match client.list_pages().await?.into_iter().next() {
            Some(info) => {
                debug!(target_id = %info.id, url = %info.url, "adopting existing tab");
                client.attach_page(&info.id).await?
            }
            None => client.new_page("about:blank").await?,
        };

        let page = Arc::new(CdpPage::new(session, self.config.navigation_timeout_ms));
        *self.active.write().await = Some(Arc::clone(&page));
        Ok(page)
    }

    /// Whether a page is currently attached.
    pub async fn has_active_page(&self) -> bool {
        self.active.read().await.is_some()
    }

    /// Drop page and connection state; leaves the browser itself running.
    pub async fn close(&self) -> Result<(), BrowserError> {
        *self.active.write().await = None;
        let _ = self.client.write().await.take();
        info!("browser connection closed");
        Ok(())
    }

    /// Close the connection and kill the browser if this manager started it.
    pub async fn shutdown(&self) -> Result<(), BrowserError> {
        self.close().await?;
        if let Some(mut child) = self.browser_process.write().await.take() {
            info!("shutting down launched browser");
            let _ = child.kill().await;
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserHost for BrowserManager {
    async fn active_page(&self) -> Result<Arc<dyn PageContext>, BrowserError> {
        self.ensure_connected().await?;

        if let Some(page) = self.active.read().await.clone() {
            return Ok(page);
        }
        Ok(self.adopt_page().await?)
    }

    async fn open_page(&self, url: &str) -> Result<Arc<dyn PageContext>, BrowserError> {
        self.ensure_connected().await?;
        let client = self.client().await?;

        let session = client.new_page(url).await?;
        client.activate_page(session.target_id()).await?;

        let page = Arc::new(CdpPage::new(session, self.config.navigation_timeout_ms));
        // A slow page should not fail tab creation; the next snapshot sees
        // whatever has loaded by then.
        if let Err(e) = page.wait_for_load(self.config.navigation_timeout_ms).await {
            warn!(%url, "new tab still loading: {e}");
        }

        *self.active.write().await = Some(Arc::clone(&page));
        Ok(page)
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
