//! Page-by-page traversal of one department listing.
//!
//! Each department is walked by a small state machine:
//!
//! ```text
//! LoadingPage ──ready──> Extracting ──records or page 1──> LoadingPage (page + 1)
//!     │   ▲                  └──page > 1 and no records──> Done(EmptyTailPage)
//!     │   └── Retrying <──navigation error / not ready, attempts left
//!     └── attempts exhausted ──> Done(EmptyFirstPage | ExhaustedRetries)
//! ```
//!
//! Cancellation and the optional page limit are checked each time a new
//! page is entered.

use std::time::Duration;

use shelfscan_config::Config;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::driver::{Locator, PageDriver};
use crate::extractor::PageExtractor;
use crate::pause;
use crate::prober::ReadinessProber;
use crate::types::{DepartmentOutcome, DepartmentRef, StopReason};

/// Build the listing URL for `path` at 1-based `page`.
///
/// Page 1 has no query string; later pages append `?page=n`.
pub fn page_url(base_url: &str, path: &str, page: u32) -> String {
    let path = path.trim_start_matches('/');
    let separator = if base_url.ends_with('/') {
        ""
    } else {
        "/"
    };
    if page <= 1 {
        format!("{}{}{}", base_url, separator, path)
    } else {
        format!("{}{}{}?page={}", base_url, separator, path, page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    LoadingPage { page: u32, attempt: u32 },
    Retrying { page: u32, attempt: u32, pause: Duration },
    Extracting { page: u32 },
    Done(StopReason),
}

/// Drives the page sequence of a department until it ends.
#[derive(Debug, Clone)]
pub struct PaginationController {
    base_url: String,
    max_attempts: u32,
    max_pages: Option<u32>,
    render_pause: Duration,
    retry_pause: Duration,
    prober: ReadinessProber,
    extractor: PageExtractor,
}

impl PaginationController {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.site.base_url.clone(),
            max_attempts: config.pagination.max_attempts.max(1),
            max_pages: config.pagination.max_pages,
            render_pause: config.timing.render_pause(),
            retry_pause: config.timing.retry_pause(),
            prober: ReadinessProber::new(
                Locator::parse(&config.site.description_selector),
                config.timing.ready_timeout(),
            ),
            extractor: PageExtractor::new(&config.site, &config.timing),
        }
    }

    /// Collect every page of `department`.
    pub async fn collect_department(
        &self,
        driver: &dyn PageDriver,
        department: &DepartmentRef,
        cancel: &CancellationToken,
    ) -> DepartmentOutcome {
        let mut outcome = DepartmentOutcome::new(department.clone());
        let mut state = self.enter_page(1, cancel);

        loop {
            state = match state {
                PageState::LoadingPage { page, attempt } => {
                    self.load_page(driver, department, page, attempt, cancel)
                        .await
                }
                PageState::Retrying {
                    page,
                    attempt,
                    pause: wait,
                } => {
                    pause(wait, cancel).await;
                    if cancel.is_cancelled() {
                        PageState::Done(StopReason::Cancelled)
                    } else {
                        PageState::LoadingPage {
                            page,
                            attempt: attempt + 1,
                        }
                    }
                }
                PageState::Extracting { page } => {
                    let extracted = self.extractor.extract_current_page(driver).await;
                    info!(
                        "[PAGE] {} page {}: {} kept of {} seen",
                        department.display_name(),
                        page,
                        extracted.positive_count(),
                        extracted.seen_count()
                    );
                    let empty = extracted.is_empty();
                    outcome.absorb(extracted);
                    if page > 1 && empty {
                        info!(
                            "[PAGE] {} page {} has no products, end of listing",
                            department.display_name(),
                            page
                        );
                        PageState::Done(StopReason::EmptyTailPage)
                    } else {
                        self.enter_page(page + 1, cancel)
                    }
                }
                PageState::Done(reason) => return outcome.finish(reason),
            };
        }
    }

    fn enter_page(&self, page: u32, cancel: &CancellationToken) -> PageState {
        if cancel.is_cancelled() {
            return PageState::Done(StopReason::Cancelled);
        }
        match self.max_pages {
            Some(max) if page > max => {
                info!("[PAGE] Page limit {} reached", max);
                PageState::Done(StopReason::PageLimit)
            }
            _ => PageState::LoadingPage { page, attempt: 1 },
        }
    }

    async fn load_page(
        &self,
        driver: &dyn PageDriver,
        department: &DepartmentRef,
        page: u32,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> PageState {
        let url = page_url(&self.base_url, &department.path, page);
        info!(
            "[PAGE] {} page {} (attempt {}/{}): {}",
            department.display_name(),
            page,
            attempt,
            self.max_attempts,
            url
        );

        if let Err(e) = driver.navigate(&url).await {
            warn!("[PAGE] Failed to load {}: {}", url, e);
            return self.retry_or_stop(page, attempt, self.retry_pause);
        }

        pause(self.render_pause, cancel).await;
        if self.prober.wait_for_listing_ready(driver).await {
            PageState::Extracting { page }
        } else {
            self.retry_or_stop(page, attempt, Duration::ZERO)
        }
    }

    fn retry_or_stop(&self, page: u32, attempt: u32, wait: Duration) -> PageState {
        if attempt < self.max_attempts {
            return PageState::Retrying {
                page,
                attempt,
                pause: wait,
            };
        }
        if page == 1 {
            warn!("[PAGE] No products on first page after {} attempts", attempt);
            PageState::Done(StopReason::EmptyFirstPage)
        } else {
            info!("[PAGE] Page {} never loaded, end of listing", page);
            PageState::Done(StopReason::ExhaustedRetries)
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
