//! Run-time behaviour: waits and pauses, pagination policy, feature flags.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::default_true;

/// Timeouts and pauses, all in milliseconds.
///
/// Timeouts bound condition-based waits. Pauses are fixed sleeps reserved
/// for client-side rendering and animations that expose no condition to
/// wait on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Default implicit lookup timeout for child elements.
    #[serde(default = "default_implicit_wait_ms")]
    pub implicit_wait_ms: u64,

    /// Implicit lookup timeout while enumerating product cards.
    #[serde(default = "default_lookup_wait_ms")]
    pub lookup_wait_ms: u64,

    /// How long a listing page may take to show its first product.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    #[serde(default = "default_menu_timeout_ms")]
    pub menu_timeout_ms: u64,

    #[serde(default = "default_links_timeout_ms")]
    pub links_timeout_ms: u64,

    /// Per-selector wait while looking for a blocking modal.
    #[serde(default = "default_modal_timeout_ms")]
    pub modal_timeout_ms: u64,

    /// Modal fade-out animation.
    #[serde(default = "default_modal_pause_ms")]
    pub modal_pause_ms: u64,

    /// Department menu expansion animation.
    #[serde(default = "default_menu_pause_ms")]
    pub menu_pause_ms: u64,

    /// Client-side rendering after each navigation.
    #[serde(default = "default_render_pause_ms")]
    pub render_pause_ms: u64,

    /// Back-off after a failed navigation.
    #[serde(default = "default_retry_pause_ms")]
    pub retry_pause_ms: u64,

    /// Politeness delay between departments.
    #[serde(default = "default_department_pause_ms")]
    pub department_pause_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            implicit_wait_ms: default_implicit_wait_ms(),
            lookup_wait_ms: default_lookup_wait_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
            menu_timeout_ms: default_menu_timeout_ms(),
            links_timeout_ms: default_links_timeout_ms(),
            modal_timeout_ms: default_modal_timeout_ms(),
            modal_pause_ms: default_modal_pause_ms(),
            menu_pause_ms: default_menu_pause_ms(),
            render_pause_ms: default_render_pause_ms(),
            retry_pause_ms: default_retry_pause_ms(),
            department_pause_ms: default_department_pause_ms(),
        }
    }
}

impl TimingConfig {
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    pub fn lookup_wait(&self) -> Duration {
        Duration::from_millis(self.lookup_wait_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn menu_timeout(&self) -> Duration {
        Duration::from_millis(self.menu_timeout_ms)
    }

    pub fn links_timeout(&self) -> Duration {
        Duration::from_millis(self.links_timeout_ms)
    }

    pub fn modal_timeout(&self) -> Duration {
        Duration::from_millis(self.modal_timeout_ms)
    }

    pub fn modal_pause(&self) -> Duration {
        Duration::from_millis(self.modal_pause_ms)
    }

    pub fn menu_pause(&self) -> Duration {
        Duration::from_millis(self.menu_pause_ms)
    }

    pub fn render_pause(&self) -> Duration {
        Duration::from_millis(self.render_pause_ms)
    }

    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }

    pub fn department_pause(&self) -> Duration {
        Duration::from_millis(self.department_pause_ms)
    }
}

fn default_implicit_wait_ms() -> u64 {
    10_000
}

fn default_lookup_wait_ms() -> u64 {
    1_000
}

fn default_ready_timeout_ms() -> u64 {
    5_000
}

fn default_menu_timeout_ms() -> u64 {
    10_000
}

fn default_links_timeout_ms() -> u64 {
    10_000
}

fn default_modal_timeout_ms() -> u64 {
    3_000
}

fn default_modal_pause_ms() -> u64 {
    1_500
}

fn default_menu_pause_ms() -> u64 {
    2_000
}

fn default_render_pause_ms() -> u64 {
    3_000
}

fn default_retry_pause_ms() -> u64 {
    5_000
}

fn default_department_pause_ms() -> u64 {
    1_000
}

/// Pagination policy for a single department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Load attempts per listing page before giving up on it.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Hard stop on the page index, if set.
    #[serde(default)]
    pub max_pages: Option<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            max_pages: None,
        }
    }
}

fn default_max_attempts() -> u32 {
    2
}

/// Feature flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Try to close blocking modals before expanding the department menu.
    #[serde(default = "default_true")]
    pub dismiss_modals: bool,

    /// Click the menu-expand control through script instead of a mouse event.
    #[serde(default = "default_true")]
    pub scripted_menu_click: bool,

    /// Report seen/positive counters in per-department summaries.
    #[serde(default = "default_true")]
    pub report_counters: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            dismiss_modals: true,
            scripted_menu_click: true,
            report_counters: true,
        }
    }
}
