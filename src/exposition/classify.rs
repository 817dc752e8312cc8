//! Record Classification
//!
//! Decides whether a stats record is exported and, if so, whether it is a
//! counter or a gauge. The vocabulary lives in [`KIND_RULES`]; extending it
//! for a new syslog-ng stat type means adding a row, not a branch.

use crate::syslog_ng::{ObjectState, StatusRecord};

/// Prometheus metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    /// Name used in `# TYPE` lines
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct KindRule {
    /// Prefix of `object_type`; empty matches every object
    pub object_prefix: &'static str,
    /// Prefix of `stat_type`
    pub stat_prefix: &'static str,
    pub kind: MetricKind,
}

const fn rule(object_prefix: &'static str, stat_prefix: &'static str, kind: MetricKind) -> KindRule {
    KindRule {
        object_prefix,
        stat_prefix,
        kind,
    }
}

/// Ordered classification table, first match wins
pub const KIND_RULES: &[KindRule] = &[
    // Resource levels
    rule("", "connections", MetricKind::Gauge),
    rule("", "memory_usage", MetricKind::Gauge),
    rule("", "queued", MetricKind::Gauge),
    // Monotonic message counts
    rule("", "dropped", MetricKind::Counter),
    rule("", "matched", MetricKind::Counter),
    rule("", "not_matched", MetricKind::Counter),
    rule("", "processed", MetricKind::Counter),
    rule("", "stamp", MetricKind::Counter),
    rule("", "value", MetricKind::Counter),
    rule("", "written", MetricKind::Counter),
    rule("", "suppressed", MetricKind::Counter),
    rule("", "discarded", MetricKind::Counter),
];

/// Why a record is left out of the exposition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Orphaned or dynamic entry
    Transient,
    /// State code outside `a`, `d`, `o`
    UnknownState,
    /// No row in [`KIND_RULES`] matches
    Unclassified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Export(MetricKind),
    Skip(SkipReason),
}

/// Look up the metric kind for an object/stat type pair
pub fn lookup_kind(object_type: &str, stat_type: &str) -> Option<MetricKind> {
    KIND_RULES
        .iter()
        .find(|r| object_type.starts_with(r.object_prefix) && stat_type.starts_with(r.stat_prefix))
        .map(|r| r.kind)
}

/// Classify a record. Only active records with a known stat type are exported.
pub fn classify(record: &StatusRecord) -> Verdict {
    match record.object_state() {
        Some(ObjectState::Active) => {}
        Some(ObjectState::Dynamic | ObjectState::Orphan) => {
            return Verdict::Skip(SkipReason::Transient)
        }
        None => return Verdict::Skip(SkipReason::UnknownState),
    }

    match lookup_kind(&record.object_type, &record.stat_type) {
        Some(kind) => Verdict::Export(kind),
        None => Verdict::Skip(SkipReason::Unclassified),
    }
}
