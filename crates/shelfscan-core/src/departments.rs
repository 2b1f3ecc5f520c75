//! Department discovery: modal dismissal, menu expansion and link harvesting.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use shelfscan_config::Config;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::driver::{Locator, PageDriver};
use crate::error::ExtractError;
use crate::pause;
use crate::types::DepartmentRef;

fn department_pattern(prefix: &str) -> Result<Regex, regex::Error> {
    let prefix = prefix.trim_matches('/');
    Regex::new(&format!(r"(?:^|/)({}/[^/?#]+)", regex::escape(prefix)))
}

fn collect_with<'a, I>(pattern: &Regex, hrefs: I) -> Vec<DepartmentRef>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    hrefs
        .into_iter()
        .filter_map(|href| pattern.captures(href))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|path| seen.insert(path.clone()))
        .map(DepartmentRef::new)
        .collect()
}

/// Extract the distinct `<prefix>/<slug>` paths from anchor hrefs, in
/// first-seen order. Hrefs that do not contain the prefix are ignored.
pub fn collect_department_paths<'a, I>(
    hrefs: I,
    prefix: &str,
) -> Result<Vec<DepartmentRef>, ExtractError>
where
    I: IntoIterator<Item = &'a str>,
{
    let pattern = department_pattern(prefix)?;
    Ok(collect_with(&pattern, hrefs))
}

/// Finds the departments listed in the storefront's navigation menu.
pub struct DepartmentDiscoverer {
    modal_locators: Vec<Locator>,
    menu: Locator,
    links: Locator,
    pattern: Regex,
    scripted_menu_click: bool,
    modal_timeout: Duration,
    modal_pause: Duration,
    menu_timeout: Duration,
    menu_pause: Duration,
    links_timeout: Duration,
}

impl DepartmentDiscoverer {
    pub fn new(config: &Config) -> Result<Self, ExtractError> {
        let site = &config.site;
        let timing = &config.timing;
        Ok(Self {
            modal_locators: site.modal_selectors.iter().map(|s| Locator::parse(s)).collect(),
            menu: Locator::parse(&site.menu_expand_selector),
            links: Locator::parse(&site.department_link_selector),
            pattern: department_pattern(&site.department_prefix)?,
            scripted_menu_click: config.features.scripted_menu_click,
            modal_timeout: timing.modal_timeout(),
            modal_pause: timing.modal_pause(),
            menu_timeout: timing.menu_timeout(),
            menu_pause: timing.menu_pause(),
            links_timeout: timing.links_timeout(),
        })
    }

    /// Close the first blocking modal found, trying locators in order.
    ///
    /// Returns whether a modal was closed. Finding none is normal.
    pub async fn dismiss_modals(&self, driver: &dyn PageDriver, cancel: &CancellationToken) -> bool {
        for locator in &self.modal_locators {
            if cancel.is_cancelled() {
                return false;
            }
            match driver.wait_until_present(locator, self.modal_timeout).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("[MODAL] '{}' not present", locator);
                    continue;
                }
                Err(e) => {
                    debug!("[MODAL] Lookup of '{}' failed: {}", locator, e);
                    continue;
                }
            }

            let element = match driver.find_all(locator).await {
                Ok(found) => match found.into_iter().next() {
                    Some(element) => element,
                    None => continue,
                },
                Err(e) => {
                    warn!("[MODAL] Could not read '{}': {}", locator, e);
                    continue;
                }
            };

            match driver.click(&element).await {
                Ok(()) => {
                    info!("[MODAL] Closed modal via '{}'", locator);
                    pause(self.modal_pause, cancel).await;
                    return true;
                }
                Err(e) => warn!("[MODAL] Click on '{}' failed: {}", locator, e),
            }
        }

        info!("[MODAL] No modal found");
        false
    }

    /// Open the collapsed department menu. `false` when the control never
    /// appears or cannot be clicked.
    pub async fn expand_department_menu(
        &self,
        driver: &dyn PageDriver,
        cancel: &CancellationToken,
    ) -> bool {
        match driver.wait_until_present(&self.menu, self.menu_timeout).await {
            Ok(true) => {}
            Ok(false) => {
                error!("[MENU] Menu control '{}' not found within {:?}", self.menu, self.menu_timeout);
                return false;
            }
            Err(e) => {
                error!("[MENU] Failed while waiting for menu control: {}", e);
                return false;
            }
        }

        let element = match driver.find_all(&self.menu).await {
            Ok(found) => found.into_iter().next(),
            Err(e) => {
                error!("[MENU] Could not read menu control: {}", e);
                return false;
            }
        };
        let Some(element) = element else {
            error!("[MENU] Menu control disappeared before click");
            return false;
        };

        let clicked = if self.scripted_menu_click {
            driver.script_click(&element).await
        } else {
            driver.click(&element).await
        };
        if let Err(e) = clicked {
            error!("[MENU] Could not expand department menu: {}", e);
            return false;
        }

        info!("[MENU] Department menu expanded");
        pause(self.menu_pause, cancel).await;
        true
    }

    /// Harvest department paths from the expanded menu. Empty on timeout.
    pub async fn discover_department_paths(&self, driver: &dyn PageDriver) -> Vec<DepartmentRef> {
        match driver.wait_until_present(&self.links, self.links_timeout).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("[DEPT] No department links within {:?}", self.links_timeout);
                return Vec::new();
            }
            Err(e) => {
                warn!("[DEPT] Failed while waiting for department links: {}", e);
                return Vec::new();
            }
        }

        let anchors = match driver.find_all(&self.links).await {
            Ok(anchors) => anchors,
            Err(e) => {
                warn!("[DEPT] Could not enumerate department links: {}", e);
                return Vec::new();
            }
        };

        let mut hrefs = Vec::with_capacity(anchors.len());
        for anchor in &anchors {
            match driver.attribute(anchor, "href").await {
                Ok(Some(href)) => hrefs.push(href),
                Ok(None) => {}
                Err(e) => debug!("[DEPT] Skipping anchor {}: {}", anchor.id(), e),
            }
        }

        let departments = collect_with(&self.pattern, hrefs.iter().map(String::as_str));
        info!(
            "[DEPT] {} department links, {} distinct departments",
            hrefs.len(),
            departments.len()
        );
        departments
    }
}

#[cfg(test)]
#[path = "departments_tests.rs"]
mod tests;
