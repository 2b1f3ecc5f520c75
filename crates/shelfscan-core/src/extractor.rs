//! Per-page product extraction.

use std::time::Duration;

use shelfscan_config::{SiteConfig, TimingConfig};
use tracing::{debug, warn};

use crate::driver::{ElementHandle, ImplicitTimeoutGuard, Locator, PageDriver};
use crate::error::DriverError;
use crate::normalize::{is_sentinel_price, normalize_description, normalize_price};
use crate::types::{PageOutcome, ProductRecord};

/// Width of the description column in product log lines.
const LOG_DESCRIPTION_WIDTH: usize = 80;

/// Turns the product cards of the currently loaded listing page into
/// normalized [`ProductRecord`]s.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    card: Locator,
    description: Locator,
    price: Locator,
    lookup_timeout: Duration,
}

impl PageExtractor {
    pub fn new(site: &SiteConfig, timing: &TimingConfig) -> Self {
        Self {
            card: Locator::parse(&site.product_card_selector),
            description: Locator::parse(&site.description_selector),
            price: Locator::parse(&site.price_selector),
            lookup_timeout: timing.lookup_wait(),
        }
    }

    /// Extract every card on the current page.
    ///
    /// The implicit lookup timeout is lowered for the duration of the call
    /// so that cards without a price do not each cost the full default
    /// wait. A failing card is counted and skipped; a failing enumeration
    /// yields an empty outcome.
    pub async fn extract_current_page(&self, driver: &dyn PageDriver) -> PageOutcome {
        let _lookup = ImplicitTimeoutGuard::set(driver, self.lookup_timeout);
        let mut page = PageOutcome::default();

        let cards = match driver.find_all(&self.card).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!("[EXTRACT] Could not enumerate product cards: {}", e);
                return page;
            }
        };
        debug!("[EXTRACT] {} candidate cards", cards.len());

        for card in &cards {
            if let Err(e) = self.extract_card(driver, card, &mut page).await {
                warn!("[EXTRACT] Skipping card {}: {}", card.id(), e);
                page.mark_error();
            }
        }

        page
    }

    async fn extract_card(
        &self,
        driver: &dyn PageDriver,
        card: &ElementHandle,
        page: &mut PageOutcome,
    ) -> Result<(), DriverError> {
        let Some(description_el) = driver.find_child(card, &self.description).await? else {
            return Ok(());
        };
        let description = normalize_description(&driver.text(&description_el).await?);
        page.mark_seen();

        let Some(price_el) = driver.find_child(card, &self.price).await? else {
            page.mark_missing_price();
            debug!("[FILTER] {} | null price", log_column(&description));
            return Ok(());
        };

        let price = normalize_price(&driver.text(&price_el).await?);
        if is_sentinel_price(&price) {
            page.mark_zero_price();
            debug!("[FILTER] {} | zero price", log_column(&description));
            return Ok(());
        }

        debug!("{} | R$ {}", log_column(&description), price);
        page.keep(ProductRecord::new(description, price));
        Ok(())
    }
}

/// Pad or truncate to the log column width, counting characters.
fn log_column(description: &str) -> String {
    format!(
        "{:<width$.width$}",
        description,
        width = LOG_DESCRIPTION_WIDTH
    )
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
