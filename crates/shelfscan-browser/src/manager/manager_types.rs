//! Browser manager type definitions and configuration.

use std::path::PathBuf;

use shelfscan_config::BrowserConfig;
use shelfscan_core::DriverError;
use thiserror::Error;

use crate::cdp::CdpError;

/// Browser manager errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Stale element: {0}")]
    StaleElement(String),

    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Install Google Chrome or set browser.chrome_path.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        if e.is_stale_reference() {
            return BrowserError::StaleElement(e.to_string());
        }
        match e {
            CdpError::ConnectionFailed(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::ChromeNotAvailable(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::WebSocket(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::NavigationFailed(msg) => BrowserError::NavigationFailed(msg),
            CdpError::JavaScript(msg) => BrowserError::ActionFailed(format!("JS error: {}", msg)),
            CdpError::Timeout(msg) => BrowserError::Timeout(msg),
            CdpError::SessionClosed => BrowserError::NotConnected,
            _ => BrowserError::ActionFailed(e.to_string()),
        }
    }
}

impl From<BrowserError> for DriverError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::NavigationFailed(msg) => DriverError::Navigation(msg),
            BrowserError::StaleElement(msg) => DriverError::StaleElement(msg),
            BrowserError::Timeout(msg) => DriverError::Timeout(msg),
            BrowserError::NotConnected | BrowserError::ConnectionFailed(_) => DriverError::Closed,
            other => DriverError::Action(other.to_string()),
        }
    }
}

/// Launch and connection settings.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    pub window_width: u32,
    pub window_height: u32,
    /// Profile directory; a throwaway default keeps runs isolated.
    pub profile_dir: Option<PathBuf>,
    /// Explicit Chrome executable, searched for when unset.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    /// Keep Chrome's sandbox; `--no-sandbox` is passed otherwise.
    pub sandbox: bool,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            window_width: 1920,
            window_height: 1080,
            profile_dir: None,
            chrome_path: None,
            headless: true,
            sandbox: false,
        }
    }
}

impl From<&BrowserConfig> for BrowserManagerConfig {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            debug_port: config.debug_port,
            window_width: config.window_width,
            window_height: config.window_height,
            profile_dir: config.profile_dir.as_ref().map(PathBuf::from),
            chrome_path: config.chrome_path.as_ref().map(PathBuf::from),
            headless: config.headless,
            sandbox: config.sandbox,
        }
    }
}

impl BrowserManagerConfig {
    /// The profile directory, defaulting to one under the user cache dir.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("shelfscan")
                .join("chrome-profile")
        })
    }

    /// The CDP HTTP endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    /// Command-line flags passed to Chrome.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            format!("--user-data-dir={}", self.get_profile_dir().display()),
            format!("--window-size={},{}", self.window_width, self.window_height),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];
        if !self.sandbox {
            args.push("--no-sandbox".to_string());
        }
        if self.headless {
            args.push("--headless=new".to_string());
        } else {
            args.push("--start-maximized".to_string());
        }
        args
    }
}
