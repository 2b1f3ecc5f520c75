//! Error types for the extraction pipeline.

use thiserror::Error;

/// Failures reported by a [`PageDriver`](crate::PageDriver) implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Page could not be loaded.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Element lookup could not be performed (not the same as "absent").
    #[error("Element lookup failed: {0}")]
    Lookup(String),

    /// Element handle no longer refers to a live element.
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// Click, read or script action failed.
    #[error("Action failed: {0}")]
    Action(String),

    /// A bounded browser operation ran out of time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The browser session is gone.
    #[error("Browser session closed")]
    Closed,
}

/// Conditions that end an extraction run early.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The department menu could not be expanded.
    #[error("Department menu could not be expanded")]
    MenuExpansion,

    /// No department link was found after expanding the menu.
    #[error("No department links found")]
    NoDepartments,

    /// Department path pattern could not be compiled.
    #[error("Invalid department pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Unrecovered driver failure.
    #[error("Browser driver error: {0}")]
    Driver(#[from] DriverError),
}

impl ExtractError {
    /// Whether this error is a setup failure (the run cannot start
    /// enumerating departments) rather than a crash.
    pub fn is_setup_failure(&self) -> bool {
        matches!(self, ExtractError::MenuExpansion | ExtractError::NoDepartments)
    }
}
