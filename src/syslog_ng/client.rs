//! syslog-ng Control Socket Client
//!
//! Talks to the syslog-ng control socket (`syslog-ng.ctl`), the same endpoint
//! `syslog-ng-ctl stats` uses.
//!
//! # Protocol
//!
//! 1. Connect to the Unix domain socket
//! 2. Send the query command terminated by a newline (`STATS\n`)
//! 3. Read the first line. For `STATS` it is the CSV header and is discarded;
//!    the `STATS PROMETHEUS` reply has no header, so it is kept
//! 4. Read data lines until a line starting with `.`
//!
//! Each stage maps to its own error variant so the caller can report which
//! part of the conversation broke. There are no retries: a scrape is a single
//! best-effort attempt, and the socket is dropped (closed) on every path out of
//! [`StatsClient::fetch`].

use crate::config::SyslogNgConfig;
use crate::error::{ExporterError, Result};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::debug;

/// Query for the semicolon-delimited stats table
pub const STATS_QUERY: &str = "STATS";
/// Query for syslog-ng's native Prometheus exposition (syslog-ng 4 and later)
pub const PROMETHEUS_QUERY: &str = "STATS PROMETHEUS";

/// Client for one syslog-ng control socket
///
/// Holds only configuration, so a single instance can serve concurrent
/// scrapes; every call opens its own connection.
#[derive(Debug, Clone)]
pub struct StatsClient {
    socket_path: String,
    query: String,
    io_timeout: Duration,
    skip_banner: bool,
}

impl StatsClient {
    /// The reply banner is skipped for every query except [`PROMETHEUS_QUERY`]
    pub fn new(socket_path: impl Into<String>, query: impl Into<String>, io_timeout: Duration) -> Self {
        let query = query.into();
        Self {
            socket_path: socket_path.into(),
            skip_banner: query != PROMETHEUS_QUERY,
            query,
            io_timeout,
        }
    }

    pub fn from_config(config: &SyslogNgConfig) -> Self {
        Self::new(
            config.socket_path.clone(),
            config.query(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Check that the control socket accepts connections, without querying it
    pub async fn probe(&self) -> Result<()> {
        timeout(self.io_timeout, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| ExporterError::Dial(timed_out("connect")))?
            .map_err(ExporterError::Dial)?;
        Ok(())
    }

    /// Run one query and return the data lines, without the banner or terminator.
    ///
    /// The first read must return a line; read errors after it end the stream
    /// early but are not reported, and whatever arrived so far is returned.
    pub async fn fetch(&self) -> Result<Vec<String>> {
        let stream = timeout(self.io_timeout, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| ExporterError::Dial(timed_out("connect")))?
            .map_err(ExporterError::Dial)?;
        debug!("Connected to {}", self.socket_path);

        let mut reader = BufReader::new(stream);

        let command = format!("{}\n", self.query);
        timeout(self.io_timeout, reader.get_mut().write_all(command.as_bytes()))
            .await
            .map_err(|_| ExporterError::Write(timed_out("write")))?
            .map_err(ExporterError::Write)?;

        // The first line decides the read stage, whether or not it is kept
        let mut first = Vec::new();
        match timeout(self.io_timeout, reader.read_until(b'\n', &mut first)).await {
            Err(_) => return Err(ExporterError::Read(timed_out("read"))),
            Ok(Err(e)) => return Err(ExporterError::Read(e)),
            Ok(Ok(0)) => {
                return Err(ExporterError::Read(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before first line",
                )))
            }
            Ok(Ok(_)) => {}
        }

        let mut lines = Vec::new();
        if !self.skip_banner {
            if first.first() == Some(&b'.') {
                return Ok(lines);
            }
            lines.push(String::from_utf8_lossy(&first).into_owned());
        }

        let mut buf = Vec::new();
        loop {
            buf.clear();
            match timeout(self.io_timeout, reader.read_until(b'\n', &mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    debug!("Stats stream ended by read error: {}", e);
                    break;
                }
                Err(_) => {
                    debug!("Stats stream ended by read timeout");
                    break;
                }
            }

            if buf.first() == Some(&b'.') {
                break;
            }
            lines.push(String::from_utf8_lossy(&buf).into_owned());
        }

        debug!("Read {} stats lines from {}", lines.len(), self.socket_path);
        Ok(lines)
    }
}

fn timed_out(stage: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{} timed out", stage))
}
