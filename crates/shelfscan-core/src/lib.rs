//! # shelfscan core
//!
//! Extraction pipeline for dynamically rendered storefronts.
//!
//! ```text
//! ExtractionSession
//!   ├── DepartmentDiscoverer   modal dismissal, menu expansion, department paths
//!   └── PaginationController   one department, page by page
//!         ├── ReadinessProber  bounded wait for rendered products
//!         └── PageExtractor    cards -> normalized ProductRecords
//! ```
//!
//! The browser is reached only through the [`PageDriver`] trait, so the
//! pipeline runs unchanged against a real browser or an in-memory fake.

pub mod departments;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod normalize;
pub mod pagination;
pub mod prober;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use departments::{collect_department_paths, DepartmentDiscoverer};
pub use driver::{ElementHandle, ImplicitTimeoutGuard, Locator, PageDriver};
pub use error::{DriverError, ExtractError};
pub use extractor::PageExtractor;
pub use normalize::{is_sentinel_price, normalize_description, normalize_price, SENTINEL_PRICE};
pub use pagination::{page_url, PaginationController};
pub use prober::ReadinessProber;
pub use session::ExtractionSession;
pub use types::*;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Fixed pause that returns early when the run is cancelled.
pub(crate) async fn pause(duration: Duration, cancel: &CancellationToken) {
    if duration.is_zero() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = cancel.cancelled() => {}
    }
}
