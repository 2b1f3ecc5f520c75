//! # shelfscan browser
//!
//! Chrome DevTools Protocol adapter for the extraction pipeline.
//!
//! [`CdpDriver`] implements [`shelfscan_core::PageDriver`] on one Chrome
//! tab, launched and owned through [`BrowserManager`].

pub mod cdp;
pub mod manager;

mod driver;
mod script;

pub use driver::CdpDriver;
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
