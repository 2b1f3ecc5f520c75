//! In-memory storefront implementing [`PageDriver`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shelfscan_config::SiteConfig;
use tokio_util::sync::CancellationToken;

use crate::driver::{ElementHandle, Locator, PageDriver};
use crate::error::DriverError;

/// One product card as rendered on a listing page.
#[derive(Debug, Clone)]
pub(crate) struct FakeCard {
    description: Option<String>,
    price: Option<String>,
    broken: bool,
}

impl FakeCard {
    pub(crate) fn priced(description: &str, price: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            price: Some(price.to_string()),
            broken: false,
        }
    }

    pub(crate) fn unpriced(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            price: None,
            broken: false,
        }
    }

    /// Matches the card selector but has no description (banner, spacer).
    pub(crate) fn decoration() -> Self {
        Self {
            description: None,
            price: Some("R$ 1,00".to_string()),
            broken: false,
        }
    }

    /// Has a description, but reading its price fails.
    pub(crate) fn broken(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            price: Some("R$ 1,00".to_string()),
            broken: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePage {
    cards: Vec<FakeCard>,
    links: Vec<String>,
    present: Vec<String>,
}

impl FakePage {
    pub(crate) fn listing(cards: Vec<FakeCard>) -> Self {
        Self {
            cards,
            ..Self::default()
        }
    }

    /// Landing page with a department menu and the given anchor hrefs.
    pub(crate) fn home(site: &SiteConfig, links: &[&str]) -> Self {
        Self {
            links: links.iter().map(|l| l.to_string()).collect(),
            present: vec![site.menu_expand_selector.clone()],
            ..Self::default()
        }
    }

    pub(crate) fn with_element(mut self, selector: &str) -> Self {
        self.present.push(selector.to_string());
        self
    }

    pub(crate) fn without_element(mut self, selector: &str) -> Self {
        self.present.retain(|s| s != selector);
        self
    }
}

#[derive(Default)]
struct FakeState {
    pages: HashMap<String, FakePage>,
    current: Option<String>,
    navigations: Vec<String>,
    nav_failures: HashMap<String, u32>,
    panic_on: Option<String>,
    cancel_on: Option<(String, CancellationToken)>,
    fail_waits: bool,
    fail_find_all: bool,
    panic_on_find_child: bool,
    fail_clicks: HashSet<String>,
    clicks: Vec<(String, bool)>,
    implicit_timeout: Duration,
    lookup_timeouts: Vec<Duration>,
    closed: bool,
}

/// Scriptable storefront. Clones share state, so a test can keep one
/// clone for inspection while the session owns another.
#[derive(Clone)]
pub(crate) struct FakeStorefront {
    site: Arc<SiteConfig>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeStorefront {
    pub(crate) fn new(site: &SiteConfig) -> Self {
        let state = FakeState {
            implicit_timeout: Duration::from_secs(10),
            ..FakeState::default()
        };
        Self {
            site: Arc::new(site.clone()),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub(crate) fn add_page(&self, url: &str, page: FakePage) {
        self.state.lock().pages.insert(url.to_string(), page);
    }

    /// Make the next `times` navigations to `url` fail.
    pub(crate) fn fail_navigation(&self, url: &str, times: u32) {
        self.state.lock().nav_failures.insert(url.to_string(), times);
    }

    pub(crate) fn panic_on_navigation(&self, url: &str) {
        self.state.lock().panic_on = Some(url.to_string());
    }

    /// Cancel `token` when `url` is navigated to. The navigation itself
    /// still succeeds.
    pub(crate) fn cancel_on_navigation(&self, url: &str, token: CancellationToken) {
        self.state.lock().cancel_on = Some((url.to_string(), token));
    }

    pub(crate) fn fail_find_all(&self, fail: bool) {
        self.state.lock().fail_find_all = fail;
    }

    pub(crate) fn panic_on_find_child(&self, panic: bool) {
        self.state.lock().panic_on_find_child = panic;
    }

    pub(crate) fn fail_waits(&self, fail: bool) {
        self.state.lock().fail_waits = fail;
    }

    pub(crate) fn fail_click(&self, selector: &str) {
        self.state.lock().fail_clicks.insert(selector.to_string());
    }

    /// Set the current page without going through the driver.
    pub(crate) fn navigate_now(&self, url: &str) {
        self.state.lock().current = Some(url.to_string());
    }

    pub(crate) fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    /// Clicked selectors, with `true` for scripted clicks.
    pub(crate) fn clicks(&self) -> Vec<(String, bool)> {
        self.state.lock().clicks.clone()
    }

    /// Implicit timeout in effect at each `find_child` call.
    pub(crate) fn lookup_timeouts(&self) -> Vec<Duration> {
        self.state.lock().lookup_timeouts.clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn current_page(state: &FakeState) -> FakePage {
        state
            .current
            .as_ref()
            .and_then(|url| state.pages.get(url))
            .cloned()
            .unwrap_or_default()
    }

    fn matches(&self, page: &FakePage, locator: &Locator) -> Vec<ElementHandle> {
        let selector = locator.as_str();
        if selector == self.site.product_card_selector {
            (0..page.cards.len())
                .map(|i| ElementHandle::new(format!("card:{}", i)))
                .collect()
        } else if selector == self.site.department_link_selector {
            (0..page.links.len())
                .map(|i| ElementHandle::new(format!("link:{}", i)))
                .collect()
        } else if selector == self.site.description_selector {
            page.cards
                .iter()
                .enumerate()
                .filter(|(_, card)| card.description.is_some())
                .map(|(i, _)| ElementHandle::new(format!("desc:{}", i)))
                .collect()
        } else if page.present.iter().any(|s| s == selector) {
            vec![ElementHandle::new(format!("el:{}", selector))]
        } else {
            Vec::new()
        }
    }

    fn index(handle: &ElementHandle, prefix: &str) -> Result<usize, DriverError> {
        handle
            .id()
            .strip_prefix(prefix)
            .and_then(|i| i.parse().ok())
            .ok_or_else(|| DriverError::StaleElement(handle.id().to_string()))
    }

    fn card(page: &FakePage, index: usize) -> Result<FakeCard, DriverError> {
        page.cards
            .get(index)
            .cloned()
            .ok_or_else(|| DriverError::StaleElement(format!("card {}", index)))
    }

    fn record_click(&self, element: &ElementHandle, scripted: bool) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let selector = element.id().trim_start_matches("el:").to_string();
        if state.fail_clicks.contains(&selector) {
            return Err(DriverError::Action(format!(
                "element click intercepted: {}",
                selector
            )));
        }
        state.clicks.push((selector, scripted));
        Ok(())
    }
}

#[async_trait]
impl PageDriver for FakeStorefront {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.navigations.push(url.to_string());
        if state.panic_on.as_deref() == Some(url) {
            drop(state);
            panic!("renderer crashed on {}", url);
        }
        if let Some((target, token)) = &state.cancel_on {
            if target == url {
                token.cancel();
            }
        }
        if let Some(remaining) = state.nav_failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DriverError::Navigation(format!("net::ERR_TIMED_OUT {}", url)));
            }
        }
        state.current = Some(url.to_string());
        Ok(())
    }

    async fn wait_until_present(
        &self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<bool, DriverError> {
        let state = self.state.lock();
        if state.fail_waits {
            return Err(DriverError::Lookup("target crashed".to_string()));
        }
        let page = Self::current_page(&state);
        Ok(!self.matches(&page, locator).is_empty())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError> {
        let state = self.state.lock();
        if state.fail_find_all {
            return Err(DriverError::Lookup("execution context destroyed".to_string()));
        }
        let page = Self::current_page(&state);
        Ok(self.matches(&page, locator))
    }

    async fn find_child(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Option<ElementHandle>, DriverError> {
        let mut state = self.state.lock();
        let timeout = state.implicit_timeout;
        state.lookup_timeouts.push(timeout);
        if state.panic_on_find_child {
            drop(state);
            panic!("renderer crashed during lookup");
        }

        let index = Self::index(parent, "card:")?;
        let card = Self::card(&Self::current_page(&state), index)?;
        let selector = locator.as_str();

        let child = if selector == self.site.description_selector {
            card.description.map(|_| format!("desc:{}", index))
        } else if selector == self.site.price_selector {
            card.price.map(|_| format!("price:{}", index))
        } else {
            None
        };
        Ok(child.map(ElementHandle::new))
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let state = self.state.lock();
        let page = Self::current_page(&state);

        if let Ok(index) = Self::index(element, "desc:") {
            let card = Self::card(&page, index)?;
            return card
                .description
                .ok_or_else(|| DriverError::StaleElement(element.id().to_string()));
        }

        let index = Self::index(element, "price:")?;
        let card = Self::card(&page, index)?;
        if card.broken {
            return Err(DriverError::StaleElement(element.id().to_string()));
        }
        card.price
            .ok_or_else(|| DriverError::StaleElement(element.id().to_string()))
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let state = self.state.lock();
        let page = Self::current_page(&state);
        let index = Self::index(element, "link:")?;
        if name != "href" {
            return Ok(None);
        }
        Ok(page.links.get(index).cloned())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record_click(element, false)
    }

    async fn script_click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record_click(element, true)
    }

    fn implicit_timeout(&self) -> Duration {
        self.state.lock().implicit_timeout
    }

    fn set_implicit_timeout(&self, timeout: Duration) {
        self.state.lock().implicit_timeout = timeout;
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.state.lock().closed = true;
        Ok(())
    }
}
