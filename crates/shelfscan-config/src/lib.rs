//! # shelfscan config
//!
//! Configuration for the storefront extractor: target site selectors,
//! browser launch options, timing, pagination policy and feature flags.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
