//! syslog-ng Stats Type Definitions
//!
//! Types for the `STATS` response of the syslog-ng control socket and for the
//! per-scrape health of the socket conversation.
//!
//! # Wire Format
//!
//! Each data line carries six semicolon-separated fields:
//!
//! ```text
//! objectType;id;instance;state;statType;value
//! dst.file;d_host#0;/mnt/data/log/192.168.1.15/20211211-systemd.log;o;written;1
//! global;msg_clones;;a;processed;0
//! src.tcp;s_net#0;tcp,192.168.1.150;a;processed;34
//! ```
//!
//! The `instance` field may be a file path and can contain `;` itself. The
//! parser anchors `objectType` and `id` on the left and `state`, `statType` and
//! `value` on the right; whatever lies between is the instance, verbatim.

use crate::error::{ExporterError, Result};

/// One record of the `STATS` response
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    /// Source or destination driver, e.g. `src.tcp`, `dst.file`, `global`
    pub object_type: String,
    pub id: String,
    /// Driver instance, often empty
    pub instance: String,
    /// Raw state code (`a`, `d`, `o`)
    pub state: String,
    /// Counter name, e.g. `processed`, `dropped`, `queued`
    pub stat_type: String,
    pub value: f64,
}

impl StatusRecord {
    /// Parse one line of the `STATS` response.
    ///
    /// Surrounding whitespace (including the trailing newline) is ignored.
    /// Lines with fewer than six fields or a non-numeric value are rejected;
    /// the caller is expected to skip them and keep reading.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();

        let mut head = line.splitn(3, ';');
        let (Some(object_type), Some(id), Some(rest)) = (head.next(), head.next(), head.next())
        else {
            return Err(malformed(line, "expected 6 fields"));
        };

        let mut tail = rest.rsplitn(4, ';');
        let (Some(value), Some(stat_type), Some(state), Some(instance)) =
            (tail.next(), tail.next(), tail.next(), tail.next())
        else {
            return Err(malformed(line, "expected 6 fields"));
        };

        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| malformed(line, "value is not a number"))?;

        Ok(Self {
            object_type: object_type.to_string(),
            id: id.to_string(),
            instance: instance.to_string(),
            state: state.to_string(),
            stat_type: stat_type.to_string(),
            value,
        })
    }

    /// Decoded state, `None` for codes syslog-ng does not document
    pub fn object_state(&self) -> Option<ObjectState> {
        ObjectState::from_code(&self.state)
    }
}

fn malformed(line: &str, reason: &str) -> ExporterError {
    ExporterError::Parse(format!("{} in {:?}", reason, line))
}

/// Lifecycle state of a stats entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    Active,
    Dynamic,
    Orphan,
}

impl ObjectState {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Self::Active),
            "d" => Some(Self::Dynamic),
            "o" => Some(Self::Orphan),
            _ => None,
        }
    }
}

/// Outcome of one stage of the control socket conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Failed,
    /// An earlier stage failed, so this one never ran
    NotAttempted,
}

impl StageOutcome {
    /// Gauge value for an attempted stage
    pub fn gauge_value(self) -> Option<u8> {
        match self {
            Self::Succeeded => Some(1),
            Self::Failed => Some(0),
            Self::NotAttempted => None,
        }
    }
}

/// Health of the control socket link for a single scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    pub dial: StageOutcome,
    pub write: StageOutcome,
    pub first_read: StageOutcome,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            dial: StageOutcome::Succeeded,
            write: StageOutcome::Succeeded,
            first_read: StageOutcome::Succeeded,
        }
    }

    /// Derive the stage outcomes from a fetch result.
    ///
    /// Errors other than the three socket stages leave every stage successful,
    /// since they can only arise after the conversation completed.
    pub fn from_fetch<T>(result: &Result<T>) -> Self {
        use StageOutcome::*;

        match result {
            Err(ExporterError::Dial(_)) => Self {
                dial: Failed,
                write: NotAttempted,
                first_read: NotAttempted,
            },
            Err(ExporterError::Write(_)) => Self {
                dial: Succeeded,
                write: Failed,
                first_read: NotAttempted,
            },
            Err(ExporterError::Read(_)) => Self {
                dial: Succeeded,
                write: Succeeded,
                first_read: Failed,
            },
            _ => Self::healthy(),
        }
    }
}
