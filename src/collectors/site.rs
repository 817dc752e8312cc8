//! HTTP Site Probe Collector
//!
//! Sends one request to every site in the site list.
//!
//! # Metrics Produced
//! - `http_request_attempt_total` - Requests attempted
//!   - Labels: site
//! - `http_request_success_total` - Requests that got a response
//!   - Labels: site, code
//! - `http_request_duration_seconds` - Duration of the last request
//!   - Labels: site
//! - `http_request_latency_seconds` - Request duration histogram
//!   - Labels: site

use super::{any_success, collect_with_handler, CollectionContext, CollectionResult};
use crate::error::{ExporterError, Result};
use crate::targets::Site;
use reqwest::header::ACCEPT;
use reqwest::Method;
use secrecy::ExposeSecret;
use std::time::Instant;

/// Probe one site, returning the status code and elapsed seconds
pub async fn probe_site(http: &reqwest::Client, site: &Site) -> Result<(u16, f64)> {
    let method = Method::from_bytes(site.method.as_bytes())
        .map_err(|_| ExporterError::TargetList(format!("invalid method {:?}", site.method)))?;

    let mut request = http.request(method, site.endpoint.clone());
    if !site.accept.is_empty() {
        request = request.header(ACCEPT, &site.accept);
    }
    if site.uses_basic_auth() {
        request = request.basic_auth(&site.user, Some(site.password.expose_secret()));
    }
    if !site.payload.is_empty() {
        request = request.body(site.payload.clone());
    }

    let start = Instant::now();
    let response = request.send().await?;
    let elapsed = start.elapsed().as_secs_f64();

    Ok((response.status().as_u16(), elapsed))
}

/// Probes every configured site
///
/// # Returns
///
/// * `Ok(CollectionStatus::Success)` - At least one site answered
/// * `Ok(CollectionStatus::Failed)` - No site answered (non-fatal, logged as warning)
pub async fn collect_site_metrics(ctx: &CollectionContext<'_>) -> CollectionResult {
    let mut statuses = Vec::with_capacity(ctx.targets.sites.len());

    for site in &ctx.targets.sites {
        ctx.metrics
            .http_request_attempt_total
            .with_label_values(&[&site.host])
            .inc();

        let status = collect_with_handler(
            site.endpoint.as_str(),
            probe_site(ctx.http, site),
            |(code, seconds)| ctx.metrics.observe_http(&site.host, code, seconds),
        )
        .await;
        statuses.push(status);
    }

    Ok(any_success(statuses))
}
