//! CLI definitions for shelfscan.

use std::path::PathBuf;

use clap::Parser;
use shelfscan_config::Config;

/// Extract the priced product catalog of a storefront.
#[derive(Debug, Parser)]
#[command(name = "shelfscan")]
#[command(about = "Browser-driven storefront catalog extractor")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults apply when it does not exist)
    #[arg(short, long, default_value = "config/shelfscan.toml")]
    pub config: PathBuf,

    /// Storefront base URL
    #[arg(long, env = "SHELFSCAN_BASE_URL")]
    pub base_url: Option<String>,

    /// Run Chrome headless (true/false)
    #[arg(long)]
    pub headless: Option<bool>,

    /// Stop each department after this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Write the run summary as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for the extraction log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.site.base_url = base_url.clone();
            if !config.site.base_url.ends_with('/') {
                config.site.base_url.push('/');
            }
        }
        if let Some(headless) = self.headless {
            config.browser.headless = headless;
        }
        if let Some(max_pages) = self.max_pages {
            config.pagination.max_pages = Some(max_pages);
        }
        if let Some(dir) = &self.log_dir {
            config.logging.dir = dir.display().to_string();
        }
    }
}
