//! Metric Names and Labels
//!
//! Builds the exposition identity of a stats record:
//!
//! ```text
//! src.tcp;s_net#0;tcp,192.168.1.150;a;processed;34
//!   -> sng_src_tcp_processed_total{id="s_net#0",instance="tcp,192.168.1.150",state="a"}
//! ```
//!
//! The name depends only on the object type, stat type and kind, so every
//! record of the same series family shares one `# TYPE` line.

use super::classify::MetricKind;
use crate::syslog_ng::StatusRecord;
use std::fmt::Write;

/// Namespace prefix of every translated metric
pub const NAMESPACE: &str = "sng";

/// Name and ordered label set of one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricIdentity {
    pub name: String,
    pub labels: Vec<(&'static str, String)>,
}

impl MetricIdentity {
    /// Render the `{k="v",...}` label block with escaped values
    pub fn format_labels(&self) -> String {
        let mut out = String::from("{");
        for (i, (key, value)) in self.labels.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write!(out, "{}=\"{}\"", key, escape_label_value(value)).ok();
        }
        out.push('}');
        out
    }
}

/// Derives identities; carries the host name used for empty instances
#[derive(Debug, Clone)]
pub struct IdentityBuilder {
    hostname: String,
}

impl IdentityBuilder {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    pub fn identify(&self, record: &StatusRecord, kind: MetricKind) -> MetricIdentity {
        let instance = if record.instance.is_empty() {
            self.hostname.clone()
        } else {
            record.instance.clone()
        };

        MetricIdentity {
            name: metric_name(&record.object_type, &record.stat_type, kind),
            labels: vec![
                ("id", record.id.clone()),
                ("instance", instance),
                ("state", record.state.clone()),
            ],
        }
    }
}

/// `sng_<object_type>_<stat_type>[_total]` with every non `[a-zA-Z0-9_]` byte
/// (mostly the dots of `dst.file` style object types) turned into `_`
pub fn metric_name(object_type: &str, stat_type: &str, kind: MetricKind) -> String {
    let mut name = format!("{}_{}_{}", NAMESPACE, object_type, stat_type);
    if kind == MetricKind::Counter {
        name.push_str("_total");
    }
    sanitize_metric_name(&name)
}

pub fn sanitize_metric_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Escape a label value for a double-quoted exposition string
pub fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}
