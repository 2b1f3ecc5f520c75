//! BrowserManager core: Chrome discovery, launch, connect and shutdown.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserManagerConfig};
use crate::cdp::{CdpClient, PageSession};

/// Endpoint polls after launching Chrome, and the delay between them.
const STARTUP_POLLS: u32 = 30;
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Owns the CDP connection and, when it launched one, the Chrome process.
pub struct BrowserManager {
    config: BrowserManagerConfig,
    client: RwLock<Option<Arc<CdpClient>>>,
    chrome_process: Mutex<Option<Child>>,
}

impl BrowserManager {
    pub fn new(config: BrowserManagerConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
            chrome_process: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrowserManagerConfig {
        &self.config
    }

    /// Find a Chrome executable, preferring `explicit` when it exists.
    pub fn find_chrome(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return path.exists().then(|| path.to_path_buf());
        }

        #[cfg(target_os = "macos")]
        let candidates: &[&str] = &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];

        #[cfg(target_os = "linux")]
        let candidates: &[&str] = &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let candidates: &[&str] = &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let candidates: &[&str] = &[];

        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }

    async fn is_chrome_running(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    async fn launch_chrome(&self) -> Result<Child, BrowserError> {
        let chrome_path = Self::find_chrome(self.config.chrome_path.as_deref())
            .ok_or(BrowserError::ChromeNotFound)?;
        let profile_dir = self.config.get_profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!(
            "Launching {} (headless: {}, profile: {})",
            chrome_path.display(),
            self.config.headless,
            profile_dir.display()
        );

        let child = Command::new(&chrome_path)
            .args(self.config.launch_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Connect to the browser, launching it if nothing listens on the port.
    pub async fn connect(&self) -> Result<(), BrowserError> {
        if self.client.read().await.is_some() {
            return Ok(());
        }

        if self.is_chrome_running().await {
            info!("Chrome already running on port {}", self.config.debug_port);
        } else {
            let child = self.launch_chrome().await?;
            *self.chrome_process.lock().await = Some(child);

            let mut ready = false;
            for _ in 0..STARTUP_POLLS {
                tokio::time::sleep(STARTUP_POLL_INTERVAL).await;
                if self.is_chrome_running().await {
                    ready = true;
                    break;
                }
            }
            if !ready {
                return Err(BrowserError::LaunchFailed(
                    "Chrome failed to start within timeout".to_string(),
                ));
            }
        }

        let client = CdpClient::connect(&self.config.endpoint()).await?;
        info!("Connected to {} at {}", client.browser(), self.config.endpoint());
        *self.client.write().await = Some(Arc::new(client));
        Ok(())
    }

    async fn client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(BrowserError::NotConnected)
    }

    /// Open a fresh tab.
    pub async fn open_page(&self) -> Result<PageSession, BrowserError> {
        let client = self.client().await?;
        let page = client.new_page().await?;
        debug!("Opened page {}", page.target_id());
        Ok(page)
    }

    pub async fn close_page(&self, page: &PageSession) -> Result<(), BrowserError> {
        let client = self.client().await?;
        client.close_page(page.target_id()).await?;
        Ok(())
    }

    /// Drop the connection and kill Chrome if this manager launched it.
    pub async fn shutdown(&self) -> Result<(), BrowserError> {
        let _ = self.client.write().await.take();
        if let Some(mut child) = self.chrome_process.lock().await.take() {
            info!("Shutting down Chrome...");
            if let Err(e) = child.kill().await {
                warn!("Failed to kill Chrome: {}", e);
            }
        }
        info!("Browser connection closed");
        Ok(())
    }
}
