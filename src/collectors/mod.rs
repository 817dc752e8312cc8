//! Metrics Collectors
//!
//! This module contains the collectors behind `/metrics`.
//!
//! # Architecture
//!
//! - [`stats`] - translates the syslog-ng control socket `STATS` output on every
//!   scrape. It writes exposition text directly and keeps no state between scrapes.
//! - [`site`] and [`dns`] - probe HTTP endpoints and DNS names from the
//!   background loop and update the Prometheus registry in [`crate::metrics`].
//!
//! # Error Handling
//!
//! Individual probe failures are non-fatal - they log warnings and report
//! `CollectionStatus::Failed`. The stats collector degrades to health-only
//! output when the control socket is unreachable.

use crate::metrics::MetricsCollector;
use crate::targets::TargetSet;
use tracing::{debug, warn};

/// Shared context passed to the probe collectors
#[derive(Clone, Copy)]
pub struct CollectionContext<'a> {
    /// HTTP client for site probes
    pub http: &'a reqwest::Client,
    /// Registry holding the probe metrics
    pub metrics: &'a MetricsCollector,
    /// Sites and DNS names currently loaded
    pub targets: &'a TargetSet,
}

/// Status of a metrics collection operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// At least one target answered and its metrics were updated
    Success,
    /// Collection failed but is non-fatal (already logged as warning)
    Failed,
}

/// Result type for collector functions
///
/// - `Ok(CollectionStatus::Success)` = Collection succeeded
/// - `Ok(CollectionStatus::Failed)` = Collection failed but non-fatal (logged as warning)
/// - `Err(_)` = Fatal error (should propagate)
pub type CollectionResult = Result<CollectionStatus, anyhow::Error>;

/// Await one probe and hand its result to `process`.
///
/// Failures are logged as warnings and reported as `CollectionStatus::Failed`.
///
/// # Arguments
///
/// * `target` - Target being probed (for logging)
/// * `probe` - Async probe returning data
/// * `process` - Function that records the data in metrics
pub async fn collect_with_handler<T, F, P, E>(target: &str, probe: F, process: P) -> CollectionStatus
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: FnOnce(T),
{
    match probe.await {
        Ok(data) => {
            process(data);
            debug!("Probed {}", target);
            CollectionStatus::Success
        }
        Err(e) => {
            warn!("Failed to probe {}: {}", target, e);
            CollectionStatus::Failed
        }
    }
}

/// Fold per-target statuses: success if any target succeeded
pub fn any_success(statuses: impl IntoIterator<Item = CollectionStatus>) -> CollectionStatus {
    if statuses.into_iter().any(|s| s == CollectionStatus::Success) {
        CollectionStatus::Success
    } else {
        CollectionStatus::Failed
    }
}

// Collector modules
pub mod dns;
pub mod site;
pub mod stats;

pub use dns::collect_dns_metrics;
pub use site::collect_site_metrics;
pub use stats::StatsCollector;
