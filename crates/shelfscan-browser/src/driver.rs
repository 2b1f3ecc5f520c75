//! [`PageDriver`] over a single CDP page.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use shelfscan_config::{BrowserConfig, TimingConfig};
use shelfscan_core::{DriverError, ElementHandle, Locator, PageDriver};
use tracing::{debug, warn};

use crate::cdp::{CdpError, PageSession};
use crate::manager::{BrowserError, BrowserManager, BrowserManagerConfig};
use crate::script;

/// Interval between presence polls.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound for a navigation to reach `interactive`.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

fn driver_error(e: CdpError) -> DriverError {
    DriverError::from(BrowserError::from(e))
}

/// Drives one Chrome tab.
///
/// Element handles are Runtime object ids. Every navigation starts a new
/// object group and releases the previous one, so handles from an earlier
/// page become stale rather than leaking.
pub struct CdpDriver {
    manager: BrowserManager,
    page: PageSession,
    implicit_timeout: Mutex<Duration>,
    generation: AtomicU64,
}

impl CdpDriver {
    /// Launch (or attach to) Chrome and open the tab the run will use.
    pub async fn launch(browser: &BrowserConfig, timing: &TimingConfig) -> Result<Self, BrowserError> {
        let manager = BrowserManager::new(BrowserManagerConfig::from(browser));
        manager.connect().await?;
        let page = match manager.open_page().await {
            Ok(page) => page,
            Err(e) => {
                let _ = manager.shutdown().await;
                return Err(e);
            }
        };

        Ok(Self {
            manager,
            page,
            implicit_timeout: Mutex::new(timing.implicit_wait()),
            generation: AtomicU64::new(0),
        })
    }

    fn object_group(&self) -> String {
        format!("shelfscan-{}", self.generation.load(Ordering::SeqCst))
    }

    fn object_id(element: &ElementHandle) -> &str {
        element.id()
    }

    async fn count(&self, locator: &Locator) -> Result<u64, CdpError> {
        let value = self.page.evaluate(&script::count(locator)).await?;
        Ok(value.as_u64().unwrap_or(0))
    }

    async fn call_on(
        &self,
        element: &ElementHandle,
        function: &str,
        args: &[Value],
    ) -> Result<Value, DriverError> {
        self.page
            .call_function_on(Self::object_id(element), function, args)
            .await
            .map_err(driver_error)
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let previous = self.object_group();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.page.release_object_group(&previous).await {
            debug!("Could not release {}: {}", previous, e);
        }

        self.page
            .navigate(url, LOAD_TIMEOUT)
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, DriverError> {
        let start = Instant::now();
        loop {
            match self.count(locator).await {
                Ok(n) if n > 0 => return Ok(true),
                Ok(_) => {}
                // Context replaced by a client-side transition; poll again.
                Err(e) if e.is_stale_reference() => {}
                Err(CdpError::JavaScript(msg)) => {
                    return Err(DriverError::Lookup(format!("'{}': {}", locator, msg)));
                }
                Err(e) => return Err(driver_error(e)),
            }

            if start.elapsed() >= timeout {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError> {
        let group = self.object_group();
        let array = self
            .page
            .evaluate_handle(&script::query_all(locator), &group)
            .await
            .map_err(|e| match e {
                CdpError::JavaScript(msg) => DriverError::Lookup(format!("'{}': {}", locator, msg)),
                other => driver_error(other),
            })?;

        let Some(array_id) = array.object_id else {
            return Ok(Vec::new());
        };

        let mut indexed: Vec<(usize, ElementHandle)> = self
            .page
            .get_properties(&array_id)
            .await
            .map_err(driver_error)?
            .into_iter()
            .filter_map(|prop| {
                let index = prop.name.parse::<usize>().ok()?;
                let value = prop.value?;
                if !value.is_node() {
                    return None;
                }
                Some((index, ElementHandle::new(value.object_id?)))
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);

        Ok(indexed.into_iter().map(|(_, handle)| handle).collect())
    }

    async fn find_child(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Option<ElementHandle>, DriverError> {
        let timeout = self.implicit_timeout();
        let function = script::query_child(locator);
        let args = [json!(locator.as_str())];
        let start = Instant::now();

        loop {
            let found = self
                .page
                .call_function_on_handle(Self::object_id(parent), function, &args)
                .await
                .map_err(driver_error)?;

            if found.is_node() {
                return Ok(found.object_id.map(ElementHandle::new));
            }
            if start.elapsed() >= timeout {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let value = self.call_on(element, script::INNER_TEXT, &[]).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let value = self
            .call_on(element, script::GET_ATTRIBUTE, &[json!(name)])
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let object_id = Self::object_id(element);
        self.page
            .scroll_into_view(object_id)
            .await
            .map_err(driver_error)?;

        let model = self
            .page
            .get_box_model(object_id)
            .await
            .map_err(driver_error)?
            .ok_or_else(|| DriverError::Action("element is not rendered".to_string()))?;
        let (x, y) = PageSession::quad_center(&model.content)
            .ok_or_else(|| DriverError::Action("element has no content box".to_string()))?;

        self.page.click(x, y).await.map_err(driver_error)
    }

    async fn script_click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.call_on(element, script::SCRIPT_CLICK, &[]).await?;
        Ok(())
    }

    fn implicit_timeout(&self) -> Duration {
        *self.implicit_timeout.lock()
    }

    fn set_implicit_timeout(&self, timeout: Duration) {
        *self.implicit_timeout.lock() = timeout;
    }

    async fn close(&self) -> Result<(), DriverError> {
        if let Err(e) = self.manager.close_page(&self.page).await {
            warn!("Failed to close page {}: {}", self.page.target_id(), e);
        }
        self.manager.shutdown().await.map_err(DriverError::from)
    }
}
