//! Infrastructure configuration: browser process and log output.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Browser launch and connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Keep Chrome's sandbox. Off by default so the browser starts as root
    /// and inside containers.
    #[serde(default)]
    pub sandbox: bool,

    /// Profile directory for the launched browser.
    #[serde(default)]
    pub profile_dir: Option<String>,

    /// Explicit browser executable; auto-detected when unset.
    #[serde(default)]
    pub chrome_path: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            sandbox: false,
            profile_dir: None,
            chrome_path: None,
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving one timestamped detail log per run.
    #[serde(default = "default_log_dir")]
    pub dir: String,

    /// Filter for the console layer (flow messages).
    #[serde(default = "default_console_level")]
    pub console_level: String,

    /// Filter for the file layer (per-product detail).
    #[serde(default = "default_file_level")]
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            console_level: default_console_level(),
            file_level: default_file_level(),
        }
    }
}

fn default_log_dir() -> String {
    "extraction".to_string()
}

fn default_console_level() -> String {
    "info".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}
