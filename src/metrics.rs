//! Probe Metrics Definitions
//!
//! Prometheus metrics for the HTTP site and DNS probes. These are updated by
//! the background probe loop and rendered after the syslog-ng stats on every
//! scrape.
//!
//! # Metric Categories
//!
//! ## HTTP Sites
//! - Request attempts and successes (by status code)
//! - Last request duration and a latency histogram
//!
//! ## DNS Lookups
//! - Lookup attempts and successes (by first resolved address)
//! - Last lookup duration and a duration histogram
//!
//! All probe metrics carry a `site` label.

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Histogram buckets (seconds) shared by both probe kinds
pub const DURATION_BUCKETS: &[f64] = &[0.001, 0.01, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0];

/// Registry for the probe metrics
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    // HTTP site metrics
    pub http_request_attempt_total: Arc<CounterVec>,
    pub http_request_success_total: Arc<CounterVec>,
    pub http_request_duration_seconds: Arc<GaugeVec>,
    pub http_request_latency_seconds: Arc<HistogramVec>,

    // DNS metrics
    pub dns_lookup_attempt_total: Arc<CounterVec>,
    pub dns_lookup_success_total: Arc<CounterVec>,
    pub dns_lookup_duration_seconds: Arc<GaugeVec>,
    pub dns_duration_seconds: Arc<HistogramVec>,
}

fn duration_histogram(name: &str, help: &str) -> prometheus::Result<HistogramVec> {
    HistogramVec::new(
        HistogramOpts::new(name, help).buckets(DURATION_BUCKETS.to_vec()),
        &["site"],
    )
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // HTTP site metrics
        let http_request_attempt_total = CounterVec::new(
            Opts::new(
                "http_request_attempt_total",
                "Total number of requests partitioned by site",
            ),
            &["site"],
        )?;

        let http_request_success_total = CounterVec::new(
            Opts::new(
                "http_request_success_total",
                "Total number of requests partitioned by site and HTTP status code",
            ),
            &["site", "code"],
        )?;

        let http_request_duration_seconds = GaugeVec::new(
            Opts::new(
                "http_request_duration_seconds",
                "Duration of the last HTTP request",
            ),
            &["site"],
        )?;

        let http_request_latency_seconds = duration_histogram(
            "http_request_latency_seconds",
            "Duration of HTTP requests bucketed by histogram and partitioned by site",
        )?;

        // DNS metrics
        let dns_lookup_attempt_total = CounterVec::new(
            Opts::new(
                "dns_lookup_attempt_total",
                "Total number of DNS A record requests partitioned by site",
            ),
            &["site"],
        )?;

        let dns_lookup_success_total = CounterVec::new(
            Opts::new(
                "dns_lookup_success_total",
                "Total number of DNS A record requests partitioned by site and IP address",
            ),
            &["site", "ip"],
        )?;

        let dns_lookup_duration_seconds = GaugeVec::new(
            Opts::new(
                "dns_lookup_duration_seconds",
                "Duration of the last DNS A record request partitioned by site",
            ),
            &["site"],
        )?;

        let dns_duration_seconds = duration_histogram(
            "dns_duration_seconds",
            "Duration of DNS A record requests partitioned by site",
        )?;

        registry.register(Box::new(http_request_attempt_total.clone()))?;
        registry.register(Box::new(http_request_success_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_request_latency_seconds.clone()))?;
        registry.register(Box::new(dns_lookup_attempt_total.clone()))?;
        registry.register(Box::new(dns_lookup_success_total.clone()))?;
        registry.register(Box::new(dns_lookup_duration_seconds.clone()))?;
        registry.register(Box::new(dns_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            http_request_attempt_total: Arc::new(http_request_attempt_total),
            http_request_success_total: Arc::new(http_request_success_total),
            http_request_duration_seconds: Arc::new(http_request_duration_seconds),
            http_request_latency_seconds: Arc::new(http_request_latency_seconds),
            dns_lookup_attempt_total: Arc::new(dns_lookup_attempt_total),
            dns_lookup_success_total: Arc::new(dns_lookup_success_total),
            dns_lookup_duration_seconds: Arc::new(dns_lookup_duration_seconds),
            dns_duration_seconds: Arc::new(dns_duration_seconds),
        })
    }

    /// Record a completed HTTP request
    pub fn observe_http(&self, site: &str, code: u16, seconds: f64) {
        self.http_request_duration_seconds
            .with_label_values(&[site])
            .set(seconds);
        let code = code.to_string();
        self.http_request_success_total
            .with_label_values(&[site, code.as_str()])
            .inc();
        self.http_request_latency_seconds
            .with_label_values(&[site])
            .observe(seconds);
    }

    /// Record a completed DNS lookup
    pub fn observe_dns(&self, site: &str, ip: &str, seconds: f64) {
        self.dns_lookup_success_total
            .with_label_values(&[site, ip])
            .inc();
        self.dns_lookup_duration_seconds
            .with_label_values(&[site])
            .set(seconds);
        self.dns_duration_seconds
            .with_label_values(&[site])
            .observe(seconds);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
