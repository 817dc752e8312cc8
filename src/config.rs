use crate::error::ExporterError;
use crate::syslog_ng::client::{PROMETHEUS_QUERY, STATS_QUERY};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::IpAddr;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub syslog_ng: SyslogNgConfig,
    #[serde(default)]
    pub probes: ProbeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyslogNgConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_socket_path")]
    pub socket_path: String,
    /// Value for an empty `instance` label; `auto` resolves the local host name
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Relay syslog-ng's own `STATS PROMETHEUS` output instead of translating `STATS`
    #[serde(default)]
    pub prometheus_passthrough: bool,
    #[serde(default = "default_socket_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    #[serde(default)]
    pub site_list: Option<String>,
    #[serde(default)]
    pub dns_list: Option<String>,
    #[serde(default = "default_scrape_interval")]
    pub scrape_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9500
}

fn default_socket_path() -> String {
    "/var/lib/syslog-ng/syslog-ng.ctl".to_string()
}

fn default_hostname() -> String {
    "auto".to_string()
}

fn default_socket_timeout() -> u64 {
    10
}

fn default_scrape_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for SyslogNgConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            socket_path: default_socket_path(),
            hostname: default_hostname(),
            prometheus_passthrough: false,
            timeout_seconds: default_socket_timeout(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            site_list: None,
            dns_list: None,
            scrape_interval_seconds: default_scrape_interval(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl SyslogNgConfig {
    /// Query command sent on the control socket
    pub fn query(&self) -> &'static str {
        if self.prometheus_passthrough {
            PROMETHEUS_QUERY
        } else {
            STATS_QUERY
        }
    }

    /// Resolve the `instance` label fallback, reading the OS host name for `auto`
    pub fn resolve_hostname(&self) -> String {
        if self.hostname == "auto" {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "localhost".to_string())
        } else {
            self.hostname.clone()
        }
    }
}

impl ProbeConfig {
    pub fn has_targets(&self) -> bool {
        self.site_list.is_some() || self.dns_list.is_some()
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("SNG_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        self.server.addr.parse::<IpAddr>().map_err(|e| {
            ExporterError::Config(format!("invalid bind IP address: {}: {}", self.server.addr, e))
        })?;

        if self.probes.scrape_interval_seconds == 0 {
            return Err(ExporterError::Config(
                "probes.scrape_interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.syslog_ng.enabled && self.syslog_ng.socket_path.is_empty() {
            return Err(ExporterError::Config(
                "syslog_ng.socket_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
