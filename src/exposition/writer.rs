//! Exposition Text Writer
//!
//! Accumulates one scrape's worth of Prometheus text. The writer owns the set
//! of names whose `# TYPE` line has been written, so a declaration appears
//! once per scrape and always before the first sample of that name. A new
//! writer is built for every scrape and never shared.

use super::classify::{classify, MetricKind, SkipReason, Verdict};
use super::identity::IdentityBuilder;
use crate::syslog_ng::{HealthStatus, StageOutcome, StatusRecord};
use std::collections::HashSet;
use std::fmt::Write;
use tracing::debug;

/// Dial stage gauge
pub const DIAL_METRIC: &str = "sng_net_dial";
/// Write stage gauge
pub const WRITE_METRIC: &str = "sng_socket_write";
/// First read (banner) stage gauge
pub const READ_METRIC: &str = "sng_buffer_read";

const HEALTH_LABELS: &str = "{id=\"status_metric\"}";

/// Finished exposition text for one scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exposition {
    pub text: String,
    /// Length of `text`, for access logging
    pub bytes: usize,
    /// What happened to the records written into `text`
    pub tally: RecordTally,
}

/// Per-scrape record counts, logged by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordTally {
    pub exported: usize,
    pub transient: usize,
    pub unknown_state: usize,
    pub unclassified: usize,
}

#[derive(Debug, Default)]
pub struct ExpositionWriter {
    out: String,
    declared: HashSet<String>,
    tally: RecordTally,
}

impl ExpositionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `# TYPE` unless this scrape already declared the name
    fn declare(&mut self, name: &str, kind: MetricKind) {
        if self.declared.insert(name.to_string()) {
            writeln!(self.out, "# TYPE {} {}", name, kind.as_str()).ok();
        }
    }

    fn sample(&mut self, name: &str, labels: &str, value: &str) {
        writeln!(self.out, "{}{} {}", name, labels, value).ok();
    }

    /// Write one gauge per attempted socket stage, 1 on success and 0 on failure
    pub fn health(&mut self, health: &HealthStatus) {
        let stages = [
            (DIAL_METRIC, health.dial),
            (WRITE_METRIC, health.write),
            (READ_METRIC, health.first_read),
        ];

        for (name, outcome) in stages {
            if let Some(value) = StageOutcome::gauge_value(outcome) {
                self.declare(name, MetricKind::Gauge);
                self.sample(name, HEALTH_LABELS, &value.to_string());
            }
        }
    }

    /// Classify, name and write records in input order
    pub fn records(&mut self, records: &[StatusRecord], identities: &IdentityBuilder) -> RecordTally {
        let mut tally = RecordTally::default();

        for record in records {
            let kind = match classify(record) {
                Verdict::Export(kind) => kind,
                Verdict::Skip(SkipReason::Transient) => {
                    tally.transient += 1;
                    continue;
                }
                Verdict::Skip(SkipReason::UnknownState) => {
                    debug!("Skipping {} {}: unknown state {:?}", record.object_type, record.id, record.state);
                    tally.unknown_state += 1;
                    continue;
                }
                Verdict::Skip(SkipReason::Unclassified) => {
                    debug!("Skipping {} {}: no kind for stat type {:?}", record.object_type, record.id, record.stat_type);
                    tally.unclassified += 1;
                    continue;
                }
            };

            let identity = identities.identify(record, kind);
            self.declare(&identity.name, kind);
            self.sample(&identity.name, &identity.format_labels(), &format_value(record.value));
            tally.exported += 1;
        }

        self.tally.exported += tally.exported;
        self.tally.transient += tally.transient;
        self.tally.unknown_state += tally.unknown_state;
        self.tally.unclassified += tally.unclassified;
        tally
    }

    /// Append lines that are already in exposition format
    pub fn passthrough(&mut self, lines: &[String]) {
        for line in lines {
            self.out.push_str(line.trim_end_matches(['\r', '\n']));
            self.out.push('\n');
        }
    }

    pub fn finish(self) -> Exposition {
        let bytes = self.out.len();
        Exposition {
            text: self.out,
            bytes,
            tally: self.tally,
        }
    }
}

/// Health lines followed by the exported records, in input order
pub fn emit(records: &[StatusRecord], health: &HealthStatus, identities: &IdentityBuilder) -> Exposition {
    let mut writer = ExpositionWriter::new();
    writer.health(health);
    writer.records(records, identities);
    writer.finish()
}

/// Shortest representation that parses back to the same value (`34`, `0.5`)
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else {
        value.to_string()
    }
}
