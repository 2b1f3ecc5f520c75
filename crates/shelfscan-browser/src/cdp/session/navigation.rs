//! Navigation for a page session.

use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

const READY_POLL: Duration = Duration::from_millis(100);

impl PageSession {
    /// Navigate to `url` and wait until the document is parsed.
    ///
    /// Returns the frame id reported by the browser.
    pub async fn navigate(&self, url: &str, load_timeout: Duration) -> Result<String, CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(|e| e.as_str()) {
            return Err(CdpError::NavigationFailed(format!("{} ({})", error, url)));
        }

        let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();

        self.wait_for_load(load_timeout).await?;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Poll `document.readyState` until it leaves `loading`.
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<(), CdpError> {
        let start = Instant::now();

        loop {
            // The old execution context may be gone mid-navigation.
            match self.evaluate("document.readyState").await {
                Ok(state) => {
                    if matches!(state.as_str(), Some("complete") | Some("interactive")) {
                        return Ok(());
                    }
                }
                Err(e) if e.is_stale_reference() => {}
                Err(e) => return Err(e),
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(READY_POLL).await;
        }
    }
}
