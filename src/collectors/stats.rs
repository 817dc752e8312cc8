//! syslog-ng Stats Collector
//!
//! Runs once per `/metrics` request: queries the control socket, parses the
//! reply and writes exposition text.
//!
//! # Metrics Produced
//! - `sng_net_dial` - 1 if the control socket accepted the connection
//! - `sng_socket_write` - 1 if the query was written (omitted if the dial failed)
//! - `sng_buffer_read` - 1 if the banner was read (omitted if the write failed)
//! - `sng_<object_type>_<stat_type>_total` - counters such as `processed`, `dropped`
//! - `sng_<object_type>_<stat_type>` - gauges such as `queued`, `memory_usage`
//!   - Labels: id, instance, state

use crate::config::SyslogNgConfig;
use crate::exposition::{emit, Exposition, ExpositionWriter, IdentityBuilder};
use crate::syslog_ng::{HealthStatus, StatsClient, StatusRecord};
use tracing::{debug, warn};

/// Per-scrape translator for one control socket
#[derive(Debug, Clone)]
pub struct StatsCollector {
    client: StatsClient,
    identities: IdentityBuilder,
    passthrough: bool,
}

impl StatsCollector {
    pub fn new(client: StatsClient, identities: IdentityBuilder, passthrough: bool) -> Self {
        Self {
            client,
            identities,
            passthrough,
        }
    }

    /// Build from configuration; the host name fallback is resolved here, once
    pub fn from_config(config: &SyslogNgConfig) -> Self {
        Self::new(
            StatsClient::from_config(config),
            IdentityBuilder::new(config.resolve_hostname()),
            config.prometheus_passthrough,
        )
    }

    pub fn client(&self) -> &StatsClient {
        &self.client
    }

    /// Query the control socket and render this scrape's exposition.
    ///
    /// Never fails: an unreachable socket yields the health gauges alone.
    pub async fn scrape(&self) -> Exposition {
        let result = self.client.fetch().await;
        let health = HealthStatus::from_fetch(&result);

        let lines = match result {
            Ok(lines) => lines,
            Err(e) => {
                warn!("{} ({})", e, self.client.socket_path());
                Vec::new()
            }
        };

        if self.passthrough {
            let mut writer = ExpositionWriter::new();
            writer.health(&health);
            writer.passthrough(&lines);
            writer.finish()
        } else {
            translate(&lines, &health, &self.identities)
        }
    }
}

/// Parse stats lines, skipping (and logging) malformed ones
pub fn parse_lines(lines: &[String]) -> Vec<StatusRecord> {
    lines
        .iter()
        .filter_map(|line| match StatusRecord::parse(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
        .collect()
}

/// Translate a captured `STATS` reply into exposition text
pub fn translate(lines: &[String], health: &HealthStatus, identities: &IdentityBuilder) -> Exposition {
    let records = parse_lines(lines);
    let exposition = emit(&records, health, identities);
    let tally = exposition.tally;

    debug!(
        "Translated {} of {} stats lines ({} transient, {} unknown state, {} unclassified)",
        tally.exported,
        lines.len(),
        tally.transient,
        tally.unknown_state,
        tally.unclassified
    );

    exposition
}
