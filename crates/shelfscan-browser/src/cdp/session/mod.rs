//! CDP page session for interacting with a single page.

mod core;
mod input;
mod navigation;
mod runtime;

pub use self::core::PageSession;
