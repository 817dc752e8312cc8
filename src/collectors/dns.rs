//! DNS Lookup Probe Collector
//!
//! Resolves every name in the host list.
//!
//! # Metrics Produced
//! - `dns_lookup_attempt_total` - Lookups attempted
//!   - Labels: site
//! - `dns_lookup_success_total` - Lookups that returned an address
//!   - Labels: site, ip (first address)
//! - `dns_lookup_duration_seconds` - Duration of the last lookup
//!   - Labels: site
//! - `dns_duration_seconds` - Lookup duration histogram
//!   - Labels: site

use super::{any_success, collect_with_handler, CollectionContext, CollectionResult};
use crate::error::Result;
use std::io;
use std::time::Instant;
use tokio::net::lookup_host;

/// Resolve one name, returning its first address and elapsed seconds
pub async fn resolve(host: &str) -> Result<(String, f64)> {
    let start = Instant::now();
    let mut addrs = lookup_host((host, 0)).await?;
    let elapsed = start.elapsed().as_secs_f64();

    let first = addrs.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("no addresses for {}", host))
    })?;
    Ok((first.ip().to_string(), elapsed))
}

/// Resolves every configured host
///
/// # Returns
///
/// * `Ok(CollectionStatus::Success)` - At least one name resolved
/// * `Ok(CollectionStatus::Failed)` - No name resolved (non-fatal, logged as warning)
pub async fn collect_dns_metrics(ctx: &CollectionContext<'_>) -> CollectionResult {
    let mut statuses = Vec::with_capacity(ctx.targets.hosts.len());

    for host in &ctx.targets.hosts {
        ctx.metrics
            .dns_lookup_attempt_total
            .with_label_values(&[host])
            .inc();

        let status = collect_with_handler(host, resolve(host), |(ip, seconds)| {
            ctx.metrics.observe_dns(host, &ip, seconds)
        })
        .await;
        statuses.push(status);
    }

    Ok(any_success(statuses))
}
