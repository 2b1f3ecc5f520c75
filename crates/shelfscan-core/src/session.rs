//! Run orchestration.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use shelfscan_config::{Config, FeaturesConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::departments::DepartmentDiscoverer;
use crate::driver::PageDriver;
use crate::error::ExtractError;
use crate::pagination::PaginationController;
use crate::pause;
use crate::types::{
    DepartmentDigest, DepartmentOutcome, ExtractionCounters, ProductRecord, RunOutcome,
    RunSummary, StopReason,
};

/// Totals accumulated while departments are processed.
#[derive(Debug, Default)]
struct RunState {
    all_records: Vec<ProductRecord>,
    totals: ExtractionCounters,
    departments: Vec<DepartmentDigest>,
}

impl RunState {
    fn absorb(&mut self, outcome: DepartmentOutcome) {
        self.totals += outcome.counters();
        self.departments.push(outcome.digest());
        self.all_records.extend(outcome.into_records());
    }
}

/// One extraction run over a storefront.
///
/// Owns the driver for the whole run and closes it on every exit path,
/// including setup aborts, cancellation and panics inside the run.
pub struct ExtractionSession<D: PageDriver> {
    driver: D,
    base_url: String,
    features: FeaturesConfig,
    department_pause: Duration,
    discoverer: DepartmentDiscoverer,
    controller: PaginationController,
    cancel: CancellationToken,
}

impl<D: PageDriver> ExtractionSession<D> {
    pub fn new(driver: D, config: &Config) -> Result<Self, ExtractError> {
        driver.set_implicit_timeout(config.timing.implicit_wait());
        Ok(Self {
            driver,
            base_url: config.site.base_url.clone(),
            features: config.features.clone(),
            department_pause: config.timing.department_pause(),
            discoverer: DepartmentDiscoverer::new(config)?,
            controller: PaginationController::new(config),
            cancel: CancellationToken::new(),
        })
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run to completion and return what was collected.
    ///
    /// Never fails: errors and panics end up in [`RunSummary::outcome`].
    pub async fn run(self) -> RunSummary {
        let started_at = Utc::now();
        info!("[START] Extraction started at {}", started_at.format("%Y-%m-%d %H:%M:%S"));

        let mut state = RunState::default();
        let result = AssertUnwindSafe(self.run_body(&mut state))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) if e.is_setup_failure() => {
                error!("[ABORT] {}", e);
                RunOutcome::Aborted(e.to_string())
            }
            Ok(Err(e)) => {
                error!("[FATAL] {:?}", e);
                RunOutcome::Failed(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("[FATAL] Extraction panicked: {}", message);
                RunOutcome::Failed(message)
            }
        };

        self.finalize(state, started_at, outcome).await
    }

    async fn run_body(&self, state: &mut RunState) -> Result<RunOutcome, ExtractError> {
        let driver: &dyn PageDriver = &self.driver;

        info!("[NAV] Opening {}", self.base_url);
        driver.navigate(&self.base_url).await?;

        if self.features.dismiss_modals {
            self.discoverer.dismiss_modals(driver, &self.cancel).await;
        }

        if !self.discoverer.expand_department_menu(driver, &self.cancel).await {
            return Err(ExtractError::MenuExpansion);
        }

        let departments = self.discoverer.discover_department_paths(driver).await;
        if departments.is_empty() {
            return Err(ExtractError::NoDepartments);
        }
        info!("[DEPT] {} departments to process", departments.len());

        let total = departments.len();
        for (index, department) in departments.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled);
            }

            info!("[DEPT] ({}/{}) {}", index + 1, total, department.display_name());
            let outcome = self
                .controller
                .collect_department(driver, department, &self.cancel)
                .await;
            self.report_department(&outcome);

            let cancelled = outcome.stop_reason() == StopReason::Cancelled;
            state.absorb(outcome);
            if cancelled {
                return Ok(RunOutcome::Cancelled);
            }

            pause(self.department_pause, &self.cancel).await;
        }

        if self.cancel.is_cancelled() {
            Ok(RunOutcome::Cancelled)
        } else {
            Ok(RunOutcome::Completed)
        }
    }

    fn report_department(&self, outcome: &DepartmentOutcome) {
        let name = outcome.department().display_name();
        if self.features.report_counters {
            info!(
                "[DEPT] {} done: seen {} | positive {} | pages {} | stop: {}",
                name,
                outcome.seen_count(),
                outcome.positive_count(),
                outcome.pages_loaded(),
                outcome.stop_reason()
            );
        } else {
            info!("[DEPT] {} done: {} products collected", name, outcome.records().len());
        }
    }

    async fn finalize(
        &self,
        state: RunState,
        started_at: DateTime<Utc>,
        outcome: RunOutcome,
    ) -> RunSummary {
        if let Err(e) = self.driver.close().await {
            warn!("[CLOSE] Failed to close browser: {}", e);
        }

        let finished_at = Utc::now();
        let elapsed = (finished_at - started_at).num_seconds();
        info!(
            "[SUMMARY] seen: {} | positive: {} | kept: {}",
            state.totals.seen,
            state.totals.positive,
            state.all_records.len()
        );
        info!(
            "[SUMMARY] started {} | finished {} | {}s | outcome: {:?}",
            started_at.format("%Y-%m-%d %H:%M:%S"),
            finished_at.format("%Y-%m-%d %H:%M:%S"),
            elapsed,
            outcome
        );

        RunSummary {
            all_records: state.all_records,
            totals: state.totals,
            departments: state.departments,
            started_at,
            finished_at,
            outcome,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
