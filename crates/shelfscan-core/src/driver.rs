//! Rendering engine boundary.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DriverError;

/// How an element is located on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    /// Parse a configured selector. Expressions starting with `/` or `(`
    /// are XPath, everything else is CSS.
    pub fn parse(selector: &str) -> Self {
        let trimmed = selector.trim();
        if trimmed.starts_with('/') || trimmed.starts_with('(') {
            Locator::XPath(trimmed.to_string())
        } else {
            Locator::Css(trimmed.to_string())
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// The raw selector or expression.
    pub fn as_str(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to an element owned by the driver.
///
/// Handles are only meaningful to the driver that produced them and only
/// until the next navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// A single browser page the pipeline drives.
///
/// Absence is not an error: `wait_until_present` returns `false` on timeout
/// and `find_child` returns `None` once the implicit timeout elapses.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url` in the page.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Poll until at least one element matches, up to `timeout`.
    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, DriverError>;

    /// All elements currently matching, in document order.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError>;

    /// First descendant of `parent` matching, waiting up to the implicit timeout.
    async fn find_child(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Option<ElementHandle>, DriverError>;

    /// Rendered text of the element.
    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError>;

    /// Attribute value, `None` when the attribute is not set.
    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Click with a real pointer event at the element's center.
    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Click through script, bypassing overlays that intercept pointer events.
    async fn script_click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Current implicit lookup timeout used by `find_child`.
    fn implicit_timeout(&self) -> Duration;

    fn set_implicit_timeout(&self, timeout: Duration);

    /// Release the page and the browser behind it.
    async fn close(&self) -> Result<(), DriverError>;
}

/// Lowers the implicit lookup timeout for its lifetime and restores the
/// previous value when dropped.
pub struct ImplicitTimeoutGuard<'a> {
    driver: &'a dyn PageDriver,
    previous: Duration,
}

impl<'a> ImplicitTimeoutGuard<'a> {
    pub fn set(driver: &'a dyn PageDriver, timeout: Duration) -> Self {
        let previous = driver.implicit_timeout();
        driver.set_implicit_timeout(timeout);
        Self { driver, previous }
    }
}

impl Drop for ImplicitTimeoutGuard<'_> {
    fn drop(&mut self) {
        self.driver.set_implicit_timeout(self.previous);
    }
}
