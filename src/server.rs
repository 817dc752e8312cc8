//! HTTP Server and Probe Loop
//!
//! This module implements the exporter HTTP server and the background probe loop.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **Scrape Path**: every `/metrics` request queries the syslog-ng control socket
//!   directly; nothing about the socket is cached between requests
//! - **Probe Loop**: background task that probes HTTP sites and DNS names on an
//!   interval and updates the Prometheus registry
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with a link to metrics
//! - `GET /metrics` - syslog-ng stats followed by probe metrics, always 200
//! - `GET /health` - 200 if the control socket accepts connections, 503 otherwise
//!
//! Any other path gets a 404 page. Every request is written to the access log.
//!
//! # Reloading
//!
//! The probe loop owns the receiving end of a [`ReloadRequest`] channel. Pending
//! requests are drained at the start of each tick, so a reload takes effect on
//! the next collection.

use crate::collectors::{self, CollectionContext, CollectionStatus, StatsCollector};
use crate::config::{Config, ProbeConfig};
use crate::metrics::MetricsCollector;
use crate::targets::{ReloadRequest, TargetSet};
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const ROOT_PAGE: &str = r#"<html>
<head><title>Syslog-NG Exporter</title></head>
<body>
<h1>Syslog-NG Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>"#;

const NOT_FOUND_PAGE: &str = r#"<html>
<head><title>Syslog-NG Exporter</title></head>
<body>
<h1>404 Not Found</h1>
</body>
</html>"#;

#[derive(Clone)]
struct AppState {
    stats: Option<Arc<StatsCollector>>,
    metrics: Option<MetricsCollector>,
}

pub async fn start(
    config: Config,
    reload: mpsc::Receiver<ReloadRequest>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let stats = config
        .syslog_ng
        .enabled
        .then(|| Arc::new(StatsCollector::from_config(&config.syslog_ng)));

    let metrics = if config.probes.has_targets() {
        let metrics = MetricsCollector::new()?;
        let targets = TargetSet::load(&config.probes)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probes.request_timeout_seconds))
            .build()?;

        // Start background probe collection
        let probe_metrics = metrics.clone();
        let probe_config = config.probes.clone();
        tokio::spawn(async move {
            collect_probes_loop(probe_config, http, probe_metrics, targets, reload).await;
        });
        Some(metrics)
    } else {
        None
    };

    let state = AppState { stats, metrics };

    // Build the router
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        loop {
            if shutdown.changed().await.is_err() {
                // Sender gone without a shutdown request: serve until killed
                std::future::pending::<()>().await;
            }
            if *shutdown.borrow() {
                break;
            }
        }
        info!("HTTP server shutting down");
    })
    .await?;

    Ok(())
}

async fn collect_probes_loop(
    config: ProbeConfig,
    http: reqwest::Client,
    metrics: MetricsCollector,
    mut targets: TargetSet,
    mut reload: mpsc::Receiver<ReloadRequest>,
) {
    let mut ticker = interval(Duration::from_secs(config.scrape_interval_seconds));

    loop {
        ticker.tick().await;

        let mut reload_requested = false;
        while reload.try_recv().is_ok() {
            reload_requested = true;
        }
        if reload_requested {
            targets.reload(&config);
        }

        let ctx = CollectionContext {
            http: &http,
            metrics: &metrics,
            targets: &targets,
        };
        collect_probes(&ctx).await;
    }
}

/// Run every probe collector once
pub async fn collect_probes(ctx: &CollectionContext<'_>) {
    if ctx.targets.is_empty() {
        debug!("No probe targets loaded, skipping this round");
        return;
    }

    info!(
        "Probing {} sites and {} hosts",
        ctx.targets.sites.len(),
        ctx.targets.hosts.len()
    );

    if !ctx.targets.sites.is_empty() {
        match collectors::collect_site_metrics(ctx).await {
            Ok(CollectionStatus::Success) => {}
            Ok(CollectionStatus::Failed) => warn!("No site answered this round"),
            Err(e) => warn!("Site collection failed: {}", e),
        }
    }
    if !ctx.targets.hosts.is_empty() {
        match collectors::collect_dns_metrics(ctx).await {
            Ok(CollectionStatus::Success) => {}
            Ok(CollectionStatus::Failed) => warn!("No host resolved this round"),
            Err(e) => warn!("DNS collection failed: {}", e),
        }
    }
}

/// Produce the `/metrics` body: syslog-ng stats first, probe registry after
pub async fn render_scrape(
    stats: Option<&StatsCollector>,
    metrics: Option<&MetricsCollector>,
) -> anyhow::Result<String> {
    let mut body = match stats {
        Some(stats) => stats.scrape().await.text,
        None => String::new(),
    };
    if let Some(metrics) = metrics {
        body.push_str(&metrics.render()?);
    }
    Ok(body)
}

/// Client address for the access log.
///
/// The first `X-Forwarded-For` entry wins, then `X-Real-Ip`, then the peer IP.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(forwarded) = header_value("x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return first.to_string();
        }
    }
    if let Some(real_ip) = header_value("x-real-ip") {
        return real_ip.to_string();
    }
    peer.ip().to_string()
}

/// One access log line: `ip "METHOD uri" bytes status "referer" user-agent`
pub fn access_line(
    headers: &HeaderMap,
    peer: SocketAddr,
    method: &Method,
    uri: &Uri,
    bytes: usize,
    status: StatusCode,
) -> String {
    let header_or = |name: header::HeaderName, default: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    format!(
        "{} \"{} {}\" {} {} \"{}\" {}",
        client_ip(headers, peer),
        method,
        uri,
        bytes,
        status.as_u16(),
        header_or(header::REFERER, "-"),
        header_or(header::USER_AGENT, ""),
    )
}

async fn root_handler(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    info!("{}", access_line(&headers, peer, &method, &uri, ROOT_PAGE.len(), StatusCode::OK));
    Html(ROOT_PAGE)
}

async fn not_found_handler(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    info!(
        "{}",
        access_line(&headers, peer, &method, &uri, NOT_FOUND_PAGE.len(), StatusCode::NOT_FOUND)
    );
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE))
}

async fn metrics_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match render_scrape(state.stats.as_deref(), state.metrics.as_ref()).await {
        Ok(body) => {
            info!("{}", access_line(&headers, peer, &method, &uri, body.len(), StatusCode::OK));
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
                body,
            )
                .into_response()
        }
        Err(e) => {
            warn!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let Some(stats) = state.stats else {
        return (StatusCode::OK, "OK");
    };

    match stats.client().probe().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "syslog-ng control socket unreachable",
            )
        }
    }
}
