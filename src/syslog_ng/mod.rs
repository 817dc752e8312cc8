pub mod client;
pub mod types;

pub use client::{StatsClient, PROMETHEUS_QUERY, STATS_QUERY};
pub use types::{HealthStatus, ObjectState, StageOutcome, StatusRecord};
