//! Control socket tests
//!
//! Runs the client and the stats collector against a fake syslog-ng control
//! socket bound in a temporary directory.

use sng_exporter::collectors::StatsCollector;
use sng_exporter::error::ExporterError;
use sng_exporter::exposition::IdentityBuilder;
use sng_exporter::syslog_ng::{StatsClient, PROMETHEUS_QUERY};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;
use tokio::sync::oneshot;

const HEADER: &str = "SourceName;SourceId;SourceInstance;State;Type;Number\n";

/// Bind a fake control socket that answers one connection with `reply`.
/// The receiver yields the query the client sent.
fn fake_syslog_ng(reply: String) -> (tempfile::TempDir, String, oneshot::Receiver<String>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("syslog-ng.ctl");
    let listener = UnixListener::bind(&path).expect("Failed to bind fake socket");
    let (query_tx, query_rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = vec![0u8; 128];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            let _ = query_tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
            let _ = stream.write_all(reply.as_bytes()).await;
        }
    });

    (dir, path.to_string_lossy().into_owned(), query_rx)
}

fn client(path: &str) -> StatsClient {
    StatsClient::new(path, "STATS", Duration::from_secs(5))
}

fn collector(path: &str) -> StatsCollector {
    StatsCollector::new(client(path), IdentityBuilder::new("testhost"), false)
}

#[tokio::test]
async fn test_fetch_returns_lines_between_banner_and_terminator() {
    // Given: A socket that answers with a header, two lines and a terminator
    let reply = format!(
        "{}global;msg_clones;;a;processed;0\nsrc.tcp;s_net#0;tcp,10.0.0.1;a;processed;34\n.\nignored;after;;a;processed;1\n",
        HEADER
    );
    let (_dir, path, query) = fake_syslog_ng(reply);

    // When: Fetching stats
    let lines = client(&path).fetch().await.expect("fetch failed");

    // Then: Only the data lines come back and the query was STATS
    assert_eq!(
        lines,
        vec![
            "global;msg_clones;;a;processed;0\n".to_string(),
            "src.tcp;s_net#0;tcp,10.0.0.1;a;processed;34\n".to_string(),
        ]
    );
    assert_eq!(query.await.unwrap(), "STATS\n");
}

#[tokio::test]
async fn test_fetch_stops_at_end_of_stream_without_terminator() {
    let reply = format!("{}global;msg_clones;;a;processed;0\n", HEADER);
    let (_dir, path, _query) = fake_syslog_ng(reply);

    let lines = client(&path).fetch().await.expect("fetch failed");

    assert_eq!(lines.len(), 1);
}

#[tokio::test]
async fn test_fetch_reports_dial_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.ctl");

    let result = client(&path.to_string_lossy()).fetch().await;

    assert!(matches!(result, Err(ExporterError::Dial(_))));
}

#[tokio::test]
async fn test_fetch_reports_read_failure_when_banner_missing() {
    // Given: A socket that closes without answering
    let (_dir, path, _query) = fake_syslog_ng(String::new());

    // When: Fetching stats
    let result = client(&path).fetch().await;

    // Then: The first read is the failing stage
    assert!(matches!(result, Err(ExporterError::Read(_))));
}

fn passthrough_collector(path: &str) -> StatsCollector {
    StatsCollector::new(
        StatsClient::new(path, PROMETHEUS_QUERY, Duration::from_secs(5)),
        IdentityBuilder::new("testhost"),
        true,
    )
}

#[tokio::test]
async fn test_passthrough_keeps_first_line() {
    // Given: A native exposition reply, which has no CSV header
    let reply =
        "# TYPE syslogng_events_total counter\nsyslogng_events_total{id=\"s\"} 3\n.\n".to_string();
    let (_dir, path, query) = fake_syslog_ng(reply);

    // When: Scraping in passthrough mode
    let out = passthrough_collector(&path).scrape().await.text;

    // Then: Every reply line follows the health gauges verbatim
    assert_eq!(query.await.unwrap(), "STATS PROMETHEUS\n");
    assert_eq!(
        out,
        "# TYPE sng_net_dial gauge\nsng_net_dial{id=\"status_metric\"} 1\n\
         # TYPE sng_socket_write gauge\nsng_socket_write{id=\"status_metric\"} 1\n\
         # TYPE sng_buffer_read gauge\nsng_buffer_read{id=\"status_metric\"} 1\n\
         # TYPE syslogng_events_total counter\nsyslogng_events_total{id=\"s\"} 3\n"
    );
}

#[tokio::test]
async fn test_prometheus_fetch_returns_first_line() {
    let reply = "syslogng_a 1\nsyslogng_b 2\n".to_string();
    let (_dir, path, _query) = fake_syslog_ng(reply);

    let lines = StatsClient::new(path.as_str(), PROMETHEUS_QUERY, Duration::from_secs(5))
        .fetch()
        .await
        .expect("fetch failed");

    assert_eq!(lines, vec!["syslogng_a 1\n".to_string(), "syslogng_b 2\n".to_string()]);
}

#[tokio::test]
async fn test_prometheus_fetch_of_empty_reply_is_healthy() {
    // Given: A reply that is only the terminator
    let (_dir, path, _query) = fake_syslog_ng(".\n".to_string());

    // When: Scraping in passthrough mode
    let out = passthrough_collector(&path).scrape().await.text;

    // Then: The first line was read, so all stages succeeded and nothing follows
    assert!(out.ends_with("sng_buffer_read{id=\"status_metric\"} 1\n"));
}

#[tokio::test]
async fn test_prometheus_fetch_reports_read_failure_on_silent_close() {
    let (_dir, path, _query) = fake_syslog_ng(String::new());

    let result = StatsClient::new(path.as_str(), PROMETHEUS_QUERY, Duration::from_secs(5))
        .fetch()
        .await;

    assert!(matches!(result, Err(ExporterError::Read(_))));
}

#[tokio::test]
async fn test_scrape_end_to_end() {
    // Given: The reply from the documented scenario
    let reply = format!(
        "{}global;msg_clones;;a;processed;0\ndst.file;d_host#0;/mnt/data/log/x.log;o;written;1\n.\n",
        HEADER
    );
    let (_dir, path, _query) = fake_syslog_ng(reply);

    // When: Scraping
    let exposition = collector(&path).scrape().await;

    // Then: One data metric, the orphan is absent
    assert_eq!(
        exposition.text.matches("# TYPE sng_global_processed_total counter").count(),
        1
    );
    assert!(exposition
        .text
        .contains("sng_global_processed_total{id=\"msg_clones\",instance=\"testhost\",state=\"a\"} 0\n"));
    assert!(!exposition.text.contains("d_host#0"));
    assert_eq!(exposition.bytes, exposition.text.len());
}

#[tokio::test]
async fn test_scrape_of_missing_socket_is_health_only() {
    // Given: A socket path nothing listens on
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("syslog-ng.ctl");

    // When: Scraping
    let out = collector(&path.to_string_lossy()).scrape().await.text;

    // Then: Only the failed dial gauge is reported
    assert_eq!(
        out,
        "# TYPE sng_net_dial gauge\nsng_net_dial{id=\"status_metric\"} 0\n"
    );
}

#[tokio::test]
async fn test_scrapes_are_byte_identical_for_same_reply() {
    let reply = format!(
        "{}src.tcp;s_net#0;tcp,192.168.1.150;a;processed;34\ndst.network;d_net#0;tcp,10.0.0.2:514;a;queued;4\n.\n",
        HEADER
    );
    let (_dir_a, path_a, _qa) = fake_syslog_ng(reply.clone());
    let (_dir_b, path_b, _qb) = fake_syslog_ng(reply);

    let first = collector(&path_a).scrape().await;
    let second = collector(&path_b).scrape().await;

    assert_eq!(first.text, second.text);
}

#[tokio::test]
async fn test_probe_checks_connectivity_only() {
    let (_dir, path, _query) = fake_syslog_ng(String::new());
    assert!(client(&path).probe().await.is_ok());

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("none.ctl");
    assert!(matches!(
        client(&missing.to_string_lossy()).probe().await,
        Err(ExporterError::Dial(_))
    ));
}
