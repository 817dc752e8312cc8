//! Stats-to-Exposition Translation
//!
//! Turns parsed syslog-ng stats records into Prometheus text:
//!
//! - [`classify`] - decides counter vs gauge and drops transient entries
//! - [`identity`] - metric name and `id`/`instance`/`state` labels
//! - [`writer`] - `# TYPE` deduplication, health gauges and sample lines

pub mod classify;
pub mod identity;
pub mod writer;

pub use classify::{classify, lookup_kind, MetricKind, SkipReason, Verdict, KIND_RULES};
pub use identity::{IdentityBuilder, MetricIdentity};
pub use writer::{emit, format_value, Exposition, ExpositionWriter, RecordTally};
