use super::*;
use shelfscan_config::BrowserConfig;
use shelfscan_core::DriverError;

use crate::cdp::CdpError;

#[test]
fn test_config_default() {
    let config = BrowserManagerConfig::default();
    assert_eq!(config.debug_port, 9222);
    assert_eq!(config.window_width, 1920);
    assert_eq!(config.window_height, 1080);
    assert!(config.headless);
}

#[test]
fn test_config_from_browser_section() {
    let mut section = BrowserConfig::default();
    section.debug_port = 9333;
    section.headless = false;
    section.profile_dir = Some("/tmp/shelfscan-profile".to_string());

    let config = BrowserManagerConfig::from(&section);
    assert_eq!(config.endpoint(), "http://localhost:9333");
    assert_eq!(config.get_profile_dir(), std::path::PathBuf::from("/tmp/shelfscan-profile"));
    assert!(!config.headless);
}

#[test]
fn test_default_profile_dir() {
    let config = BrowserManagerConfig::default();
    assert!(config.get_profile_dir().ends_with("shelfscan/chrome-profile"));
}

#[test]
fn test_launch_args_headless() {
    let config = BrowserManagerConfig::default();
    let args = config.launch_args();
    assert!(args.contains(&"--remote-debugging-port=9222".to_string()));
    assert!(args.contains(&"--window-size=1920,1080".to_string()));
    assert!(args.contains(&"--headless=new".to_string()));
    assert!(args.contains(&"--no-sandbox".to_string()));
    assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
    assert!(!args.contains(&"--start-maximized".to_string()));
}

#[test]
fn test_launch_args_with_sandbox() {
    let mut section = BrowserConfig::default();
    section.sandbox = true;

    let args = BrowserManagerConfig::from(&section).launch_args();
    assert!(!args.contains(&"--no-sandbox".to_string()));
    assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
}

#[test]
fn test_launch_args_headed() {
    let config = BrowserManagerConfig {
        headless: false,
        ..BrowserManagerConfig::default()
    };
    let args = config.launch_args();
    assert!(args.contains(&"--start-maximized".to_string()));
    assert!(!args.iter().any(|a| a.starts_with("--headless")));
}

#[test]
fn test_find_chrome_explicit_missing() {
    let path = std::path::Path::new("/nonexistent/chrome");
    assert!(BrowserManager::find_chrome(Some(path)).is_none());
}

#[test]
fn test_browser_error_display() {
    let err = BrowserError::ConnectionFailed("timeout".to_string());
    assert_eq!(err.to_string(), "Connection failed: timeout");

    let err = BrowserError::LaunchFailed("permission denied".to_string());
    assert_eq!(err.to_string(), "Failed to launch Chrome: permission denied");
}

#[test]
fn test_cdp_error_mapping() {
    let err = BrowserError::from(CdpError::NavigationFailed("net::ERR_NAME_NOT_RESOLVED".into()));
    assert!(matches!(err, BrowserError::NavigationFailed(_)));

    let err = BrowserError::from(CdpError::Protocol {
        code: -32000,
        message: "Could not find object with given id".into(),
    });
    assert!(matches!(err, BrowserError::StaleElement(_)));

    let err = BrowserError::from(CdpError::SessionClosed);
    assert!(matches!(err, BrowserError::NotConnected));
}

#[test]
fn test_driver_error_mapping() {
    let err = DriverError::from(BrowserError::Timeout("Runtime.evaluate timed out".into()));
    assert!(matches!(err, DriverError::Timeout(_)));

    let err = DriverError::from(BrowserError::NotConnected);
    assert!(matches!(err, DriverError::Closed));

    let err = DriverError::from(BrowserError::ActionFailed("JS error: boom".into()));
    assert!(matches!(err, DriverError::Action(_)));
}

#[tokio::test]
async fn test_open_page_without_connect() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(matches!(manager.open_page().await, Err(BrowserError::NotConnected)));
}

#[tokio::test]
async fn test_shutdown_without_connect() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(manager.shutdown().await.is_ok());
}
