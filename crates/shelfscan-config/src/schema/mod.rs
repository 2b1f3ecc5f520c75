//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_infra;
mod schema_runtime;

pub use schema_infra::*;
pub use schema_runtime::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub features: FeaturesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Target storefront: base URL and the selectors that locate its parts.
///
/// Selectors are CSS unless they start with `/` or `(`, which marks them
/// as XPath expressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Leading path segment shared by every department link.
    #[serde(default = "default_department_prefix")]
    pub department_prefix: String,

    #[serde(default = "default_menu_expand_selector")]
    pub menu_expand_selector: String,

    #[serde(default = "default_department_link_selector")]
    pub department_link_selector: String,

    #[serde(default = "default_product_card_selector")]
    pub product_card_selector: String,

    #[serde(default = "default_description_selector")]
    pub description_selector: String,

    #[serde(default = "default_price_selector")]
    pub price_selector: String,

    /// Close/dismiss controls tried in order before the menu is expanded.
    #[serde(default = "default_modal_selectors")]
    pub modal_selectors: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            department_prefix: default_department_prefix(),
            menu_expand_selector: default_menu_expand_selector(),
            department_link_selector: default_department_link_selector(),
            product_card_selector: default_product_card_selector(),
            description_selector: default_description_selector(),
            price_selector: default_price_selector(),
            modal_selectors: default_modal_selectors(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.supercentralonline.com.br/".to_string()
}

fn default_department_prefix() -> String {
    "departamentos".to_string()
}

fn default_menu_expand_selector() -> String {
    ".text-3xl.icon-expand_more".to_string()
}

fn default_department_link_selector() -> String {
    "a[href^='/departamentos/']".to_string()
}

fn default_product_card_selector() -> String {
    ".vertical.ng-star-inserted".to_string()
}

fn default_description_selector() -> String {
    ".vip-card-produto-descricao".to_string()
}

fn default_price_selector() -> String {
    ".font-bold".to_string()
}

fn default_modal_selectors() -> Vec<String> {
    vec![
        "button.close".to_string(),
        ".close-button".to_string(),
        ".close-modal".to_string(),
        ".icon-close".to_string(),
        "//button[contains(text(), 'Fechar')]".to_string(),
        "//span[contains(text(), 'Entrar')]".to_string(),
    ]
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
