//! Data model shared by the pipeline stages.

use std::fmt;
use std::ops::AddAssign;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A product kept by the extractor: description plus a positive price
/// formatted with exactly two fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    description: String,
    price: String,
}

impl ProductRecord {
    pub(crate) fn new(description: String, price: String) -> Self {
        Self { description, price }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> &str {
        &self.price
    }
}

/// One department, identified by its relative path (`departamentos/<slug>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DepartmentRef {
    pub path: String,
}

impl DepartmentRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Human label: last path segment, dashes as spaces, uppercased.
    pub fn display_name(&self) -> String {
        self.path
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
            .replace('-', " ")
            .to_uppercase()
    }
}

impl fmt::Display for DepartmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Running counters for seen vs. kept cards.
///
/// `seen` counts cards with a description; `positive` the subset kept as
/// records. The remaining fields break down why a seen card was dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionCounters {
    pub seen: u64,
    pub positive: u64,
    /// Price text present but not a usable positive value.
    pub zero_price: u64,
    /// Price element absent.
    pub missing_price: u64,
    /// Card skipped after an unexpected driver failure.
    pub errors: u64,
}

impl AddAssign for ExtractionCounters {
    fn add_assign(&mut self, other: Self) {
        self.seen += other.seen;
        self.positive += other.positive;
        self.zero_price += other.zero_price;
        self.missing_price += other.missing_price;
        self.errors += other.errors;
    }
}

/// Result of extracting one listing page.
///
/// `positive_count() == records().len() <= seen_count()` holds by
/// construction: records can only be added through [`PageOutcome::keep`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOutcome {
    records: Vec<ProductRecord>,
    counters: ExtractionCounters,
}

impl PageOutcome {
    pub(crate) fn mark_seen(&mut self) {
        self.counters.seen += 1;
    }

    pub(crate) fn mark_missing_price(&mut self) {
        self.counters.missing_price += 1;
    }

    pub(crate) fn mark_zero_price(&mut self) {
        self.counters.zero_price += 1;
    }

    pub(crate) fn mark_error(&mut self) {
        self.counters.errors += 1;
    }

    pub(crate) fn keep(&mut self, record: ProductRecord) {
        self.records.push(record);
        self.counters.positive += 1;
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn seen_count(&self) -> u64 {
        self.counters.seen
    }

    pub fn positive_count(&self) -> u64 {
        self.counters.positive
    }

    pub fn counters(&self) -> ExtractionCounters {
        self.counters
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Why pagination of a department stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Page 1 never became ready; the department link is likely broken.
    EmptyFirstPage,
    /// A later page never became ready; treated as the end of the listing.
    ExhaustedRetries,
    /// A later page loaded but produced no records.
    EmptyTailPage,
    /// The configured page limit was reached.
    PageLimit,
    /// The run was cancelled.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::EmptyFirstPage => "empty first page",
            StopReason::ExhaustedRetries => "retries exhausted",
            StopReason::EmptyTailPage => "empty tail page",
            StopReason::PageLimit => "page limit",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Accumulated result of one department.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentOutcome {
    department: DepartmentRef,
    records: Vec<ProductRecord>,
    counters: ExtractionCounters,
    pages_loaded: u32,
    stop_reason: StopReason,
}

impl DepartmentOutcome {
    pub(crate) fn new(department: DepartmentRef) -> Self {
        Self {
            department,
            records: Vec::new(),
            counters: ExtractionCounters::default(),
            pages_loaded: 0,
            stop_reason: StopReason::EmptyFirstPage,
        }
    }

    /// Fold one extracted page into the department totals.
    pub(crate) fn absorb(&mut self, page: PageOutcome) {
        self.pages_loaded += 1;
        self.counters += page.counters;
        self.records.extend(page.records);
    }

    pub(crate) fn finish(mut self, reason: StopReason) -> Self {
        self.stop_reason = reason;
        self
    }

    pub fn department(&self) -> &DepartmentRef {
        &self.department
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }

    pub fn seen_count(&self) -> u64 {
        self.counters.seen
    }

    pub fn positive_count(&self) -> u64 {
        self.counters.positive
    }

    pub fn counters(&self) -> ExtractionCounters {
        self.counters
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    pub fn digest(&self) -> DepartmentDigest {
        DepartmentDigest {
            path: self.department.path.clone(),
            pages_loaded: self.pages_loaded,
            counters: self.counters,
            stop_reason: self.stop_reason,
        }
    }
}

/// Per-department line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentDigest {
    pub path: String,
    pub pages_loaded: u32,
    pub counters: ExtractionCounters,
    pub stop_reason: StopReason,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Cancelled,
    /// Setup failed (menu expansion or department discovery).
    Aborted(String),
    /// Unexpected failure, including panics inside the run.
    Failed(String),
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub all_records: Vec<ProductRecord>,
    pub totals: ExtractionCounters,
    pub departments: Vec<DepartmentDigest>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
}

impl RunSummary {
    pub fn total_seen(&self) -> u64 {
        self.totals.seen
    }

    pub fn total_positive(&self) -> u64 {
        self.totals.positive
    }
}
