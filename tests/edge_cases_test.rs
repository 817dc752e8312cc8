//! Edge case tests
//!
//! Tests for unusual but valid stats replies.

use sng_exporter::collectors::stats::{parse_lines, translate};
use sng_exporter::exposition::{IdentityBuilder, MetricKind};
use sng_exporter::syslog_ng::{HealthStatus, StatusRecord};

fn identities() -> IdentityBuilder {
    IdentityBuilder::new("testhost")
}

fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|l| l.to_string()).collect()
}

const HEALTH_ONLY: &str = concat!(
    "# TYPE sng_net_dial gauge\n",
    "sng_net_dial{id=\"status_metric\"} 1\n",
    "# TYPE sng_socket_write gauge\n",
    "sng_socket_write{id=\"status_metric\"} 1\n",
    "# TYPE sng_buffer_read gauge\n",
    "sng_buffer_read{id=\"status_metric\"} 1\n",
);

#[test]
fn test_empty_reply_renders_health_only() {
    // Given: A daemon with no stats configured
    // When: Translating an empty reply
    let out = translate(&[], &HealthStatus::healthy(), &identities());

    // Then: All three health gauges report success and nothing else is written
    assert_eq!(out.text, HEALTH_ONLY);
}

#[test]
fn test_crlf_line_endings() {
    let record = StatusRecord::parse("src.udp;s_udp#0;udp,0.0.0.0:514;a;processed;17\r\n").unwrap();

    assert_eq!(record.instance, "udp,0.0.0.0:514");
    assert_eq!(record.value, 17.0);
}

#[test]
fn test_blank_lines_are_skipped() {
    let records = parse_lines(&lines(&["\n", "   \n", "global;sum;;a;processed;3\n"]));

    assert_eq!(records.len(), 1);
}

#[test]
fn test_all_records_transient() {
    let reply = lines(&[
        "dst.file;d_host#0;/var/log/a.log;o;written;1\n",
        "dst.file;d_host#0;/var/log/b.log;d;written;4\n",
    ]);

    let out = translate(&reply, &HealthStatus::healthy(), &identities());

    assert_eq!(out.text, HEALTH_ONLY);
}

#[test]
fn test_many_records_one_declaration() {
    // Given: A thousand file destinations with the same family
    let reply: Vec<String> = (0..1000)
        .map(|i| format!("dst.file;d_host#0;/var/log/host-{}.log;a;written;{}\n", i, i))
        .collect();

    // When: Translating them
    let out = translate(&reply, &HealthStatus::healthy(), &identities()).text;

    // Then: One declaration, a thousand samples
    assert_eq!(out.matches("# TYPE sng_dst_file_written_total counter").count(), 1);
    assert_eq!(out.matches("sng_dst_file_written_total{").count(), 1000);
}

#[test]
fn test_counter_and_gauge_of_same_object_get_distinct_names() {
    let reply = lines(&[
        "dst.network;d_net#0;tcp,10.0.0.2:514;a;processed;100\n",
        "dst.network;d_net#0;tcp,10.0.0.2:514;a;queued;7\n",
    ]);

    let out = translate(&reply, &HealthStatus::healthy(), &identities()).text;

    assert!(out.contains("# TYPE sng_dst_network_processed_total counter\n"));
    assert!(out.contains("# TYPE sng_dst_network_queued gauge\n"));
}

#[test]
fn test_nan_value_is_rendered_in_exposition_spelling() {
    let reply = lines(&["center;queued;;a;queued;NaN\n"]);

    let out = translate(&reply, &HealthStatus::healthy(), &identities()).text;

    assert!(out.contains("sng_center_queued{id=\"queued\",instance=\"testhost\",state=\"a\"} NaN\n"));
}

#[test]
fn test_instance_that_only_has_whitespace_is_kept() {
    // Only an empty instance triggers the host name fallback
    let record = StatusRecord::parse("global;sum;  ;a;processed;1").unwrap();
    let identity = identities().identify(&record, MetricKind::Counter);

    assert_eq!(identity.labels[1], ("instance", "  ".to_string()));
}

#[test]
fn test_terminator_like_content_inside_field_is_not_special() {
    // A leading dot only terminates the stream when it starts the line
    let record = StatusRecord::parse("dst.file;d_dot#0;./relative.log;a;written;2").unwrap();

    assert_eq!(record.instance, "./relative.log");
}
