//! Chrome process and connection management.
//!
//! Launches Chrome with remote debugging (or reuses one already listening
//! on the debug port), connects the CDP client and opens pages.

mod manager_core;
mod manager_types;

pub use manager_core::BrowserManager;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
