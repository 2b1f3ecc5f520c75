//! Configuration validation.

use url::Url;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a `ConfigError`, or hand back the warnings.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_site(config, &mut result);
        Self::validate_browser(config, &mut result);
        Self::validate_timing(config, &mut result);
        Self::validate_pagination(config, &mut result);

        Ok(result)
    }

    fn validate_site(config: &Config, result: &mut ValidationResult) {
        let site = &config.site;

        match Url::parse(&site.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                if !site.base_url.ends_with('/') {
                    result.add_warning(ValidationWarning::new(
                        "site.base_url",
                        "base_url has no trailing slash, one is inserted before department paths",
                    ));
                }
            }
            Ok(_) => result.add_error(ValidationError::new(
                "site.base_url",
                "base_url must start with http:// or https://",
            )),
            Err(e) => result.add_error(ValidationError::new(
                "site.base_url",
                format!("base_url is not a valid URL: {}", e),
            )),
        }

        if site.department_prefix.is_empty() || site.department_prefix.contains('/') {
            result.add_error(ValidationError::new(
                "site.department_prefix",
                "department_prefix must be a single, non-empty path segment",
            ));
        }

        let selectors = [
            ("site.menu_expand_selector", &site.menu_expand_selector),
            ("site.department_link_selector", &site.department_link_selector),
            ("site.product_card_selector", &site.product_card_selector),
            ("site.description_selector", &site.description_selector),
            ("site.price_selector", &site.price_selector),
        ];
        for (path, selector) in selectors {
            if selector.trim().is_empty() {
                result.add_error(ValidationError::new(path, "Selector cannot be empty"));
            }
        }

        if config.features.dismiss_modals && site.modal_selectors.is_empty() {
            result.add_warning(ValidationWarning::new(
                "site.modal_selectors",
                "Modal dismissal is enabled but no selectors are configured",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if config.browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Port cannot be 0",
            ));
        }

        if config.browser.window_width == 0 || config.browser.window_height == 0 {
            result.add_error(ValidationError::new(
                "browser.window_width",
                "Window dimensions must be greater than 0",
            ));
        }
    }

    fn validate_timing(config: &Config, result: &mut ValidationResult) {
        let timing = &config.timing;

        let timeouts = [
            ("timing.ready_timeout_ms", timing.ready_timeout_ms),
            ("timing.menu_timeout_ms", timing.menu_timeout_ms),
            ("timing.links_timeout_ms", timing.links_timeout_ms),
            ("timing.modal_timeout_ms", timing.modal_timeout_ms),
        ];
        for (path, value) in timeouts {
            if value == 0 {
                result.add_error(ValidationError::new(path, "Timeout must be greater than 0"));
            }
        }

        if timing.lookup_wait_ms > timing.implicit_wait_ms {
            result.add_warning(ValidationWarning::new(
                "timing.lookup_wait_ms",
                "lookup_wait_ms exceeds implicit_wait_ms, card enumeration will be slower than other lookups",
            ));
        }

        let pauses = [
            ("timing.render_pause_ms", timing.render_pause_ms),
            ("timing.retry_pause_ms", timing.retry_pause_ms),
            ("timing.department_pause_ms", timing.department_pause_ms),
        ];
        for (path, value) in pauses {
            if value > 60_000 {
                result.add_warning(ValidationWarning::new(
                    path,
                    "Pause is longer than a minute, runs over many pages will be very slow",
                ));
            }
        }
    }

    fn validate_pagination(config: &Config, result: &mut ValidationResult) {
        if config.pagination.max_attempts < 2 {
            result.add_error(ValidationError::new(
                "pagination.max_attempts",
                "max_attempts must be at least 2",
            ));
        }

        if config.pagination.max_attempts > 10 {
            result.add_warning(ValidationWarning::new(
                "pagination.max_attempts",
                "max_attempts is very high (>10), broken departments will take long to skip",
            ));
        }

        if config.pagination.max_pages == Some(0) {
            result.add_error(ValidationError::new(
                "pagination.max_pages",
                "max_pages must be greater than 0 when set",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
