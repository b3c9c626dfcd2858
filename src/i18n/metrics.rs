//! Translation metrics and observability.
//!
//! Each store owns one [`I18nMetrics`] instance tracking locale fetches,
//! fetch failures, missing keys and committed locale changes.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for a single store.
#[derive(Debug, Default)]
pub struct I18nMetrics {
    /// Number of locale payloads requested from the fetch strategy
    fetches: AtomicUsize,

    /// Number of fetches that returned an error
    fetch_failures: AtomicUsize,

    /// Number of translate calls that hit a missing key
    missing_keys: AtomicUsize,

    /// Number of locale changes that were committed
    locale_changes: AtomicUsize,
}

impl I18nMetrics {
    /// Record a locale payload fetch.
    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed locale payload fetch.
    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup of a key absent from the active map.
    pub fn record_missing_key(&self) {
        self.missing_keys.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a committed locale change.
    pub fn record_locale_change(&self) {
        self.locale_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn missing_keys(&self) -> usize {
        self.missing_keys.load(Ordering::Relaxed)
    }

    pub fn locale_changes(&self) -> usize {
        self.locale_changes.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let fetches = self.fetches();
        let failures = self.fetch_failures();
        let fetch_success_rate = if fetches > 0 {
            ((fetches - failures) as f64 / fetches as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            fetches,
            fetch_failures: failures,
            fetch_success_rate,
            missing_keys: self.missing_keys(),
            locale_changes: self.locale_changes(),
        }
    }
}

/// Snapshot of a store's translation statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Number of locale fetches
    pub fetches: usize,

    /// Number of failed locale fetches
    pub fetch_failures: usize,

    /// Fetch success rate as a percentage (0-100)
    pub fetch_success_rate: f64,

    /// Number of missing-key lookups
    pub missing_keys: usize,

    /// Number of committed locale changes
    pub locale_changes: usize,
}
