//! syslog-ng Prometheus Exporter
//!
//! Translates the statistics of a local syslog-ng daemon into the Prometheus
//! text exposition format, and optionally probes HTTP sites and DNS names.
//!
//! # Overview
//!
//! On every scrape the exporter opens the syslog-ng control socket, sends
//! `STATS`, and turns the semicolon-delimited reply into metrics. Three gauges
//! describe the socket conversation itself, so an unreachable daemon still
//! produces a valid (health-only) scrape.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   unix socket   ┌──────────────────────────┐
//! │  syslog-ng  │ ◄─────────────► │        Exporter          │
//! │   daemon    │  STATS / lines  │                          │
//! └─────────────┘                 │  ┌────────┐ ┌──────────┐ │    HTTP     ┌────────────┐
//!                                 │  │ Client │→│Exposition│ │ ◄─────────► │ Prometheus │
//!                                 │  └────────┘ └──────────┘ │  /metrics   └────────────┘
//!  HTTP sites / DNS names ◄────── │  probe loop → registry   │
//!                                 └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`syslog_ng`] - control socket client and stats record parsing
//! - [`exposition`] - classification, naming and exposition text writing
//! - [`collectors`] - stats translator plus HTTP and DNS probes
//! - [`metrics`] - Prometheus registry for probe metrics
//! - [`targets`] - site and host list loading
//! - [`server`] - HTTP server and probe loop
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use sng_exporter::{config::Config, server};
//! use tokio::sync::{mpsc, watch};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     let (_reload_tx, reload_rx) = mpsc::channel(1);
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     server::start(config, reload_rx, shutdown_rx).await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod exposition;
pub mod metrics;
pub mod server;
pub mod syslog_ng;
pub mod targets;
