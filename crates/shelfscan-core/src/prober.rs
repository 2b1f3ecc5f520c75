//! Load-readiness probing for listing pages.

use std::time::Duration;

use tracing::{debug, warn};

use crate::driver::{Locator, PageDriver};

/// Decides whether a navigated listing page has rendered product content.
#[derive(Debug, Clone)]
pub struct ReadinessProber {
    locator: Locator,
    timeout: Duration,
}

impl ReadinessProber {
    /// Probe for `locator` (the product description) for at most `timeout`.
    pub fn new(locator: Locator, timeout: Duration) -> Self {
        Self { locator, timeout }
    }

    /// `true` as soon as one product description is present, `false` on
    /// timeout or on any driver failure.
    pub async fn wait_for_listing_ready(&self, driver: &dyn PageDriver) -> bool {
        match driver.wait_until_present(&self.locator, self.timeout).await {
            Ok(true) => true,
            Ok(false) => {
                debug!(
                    "[SYNC] No '{}' within {:?}",
                    self.locator, self.timeout
                );
                false
            }
            Err(e) => {
                warn!("[SYNC] Failed while waiting for products: {}", e);
                false
            }
        }
    }
}
