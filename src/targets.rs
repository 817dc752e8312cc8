//! Probe Target Lists
//!
//! Loads the tab-separated site and DNS host lists.
//!
//! # Site List Format
//!
//! The first row is a header and is skipped. Rows whose first field starts
//! with `#` are comments.
//!
//! ```text
//! ENDPOINT	METHOD	AUTHTYPE	USER	PASSWORD	ACCEPT	PAYLOAD
//! https://www.example.com:5000/api/v2/status	GET	basic	monitor	s3cret	application/json
//! ```
//!
//! # Host List Format
//!
//! One DNS name per row in the first column, no header, `#` comments.
//!
//! # Reloading
//!
//! A [`ReloadRequest`] sent on the channel given to the probe loop makes the
//! loop re-read both lists before its next collection. A list that fails to
//! load leaves the previous one in place.

use crate::config::ProbeConfig;
use crate::error::{ExporterError, Result};
use reqwest::Url;
use secrecy::SecretString;
use std::fs;
use tracing::{info, warn};

/// Request to re-read the target lists before the next collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadRequest;

/// One HTTP endpoint to probe
#[derive(Debug, Clone)]
pub struct Site {
    pub endpoint: Url,
    /// `host[:port]` of the endpoint, used as the `site` label
    pub host: String,
    pub method: String,
    pub auth_type: String,
    pub user: String,
    pub password: SecretString,
    pub accept: String,
    pub payload: String,
}

impl Site {
    pub fn uses_basic_auth(&self) -> bool {
        self.auth_type.eq_ignore_ascii_case("basic")
    }
}

/// Everything the probe loop works on
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    pub sites: Vec<Site>,
    pub hosts: Vec<String>,
}

impl TargetSet {
    /// Load the configured lists; a missing path means an empty list
    pub fn load(config: &ProbeConfig) -> Result<Self> {
        let sites = match &config.site_list {
            Some(path) => load_sites(path)?,
            None => Vec::new(),
        };
        let hosts = match &config.dns_list {
            Some(path) => load_hosts(path)?,
            None => Vec::new(),
        };
        Ok(Self { sites, hosts })
    }

    /// Replace the lists with freshly loaded ones, keeping the old ones on failure
    pub fn reload(&mut self, config: &ProbeConfig) {
        match Self::load(config) {
            Ok(fresh) => {
                info!(
                    "Reloaded targets: {} sites, {} hosts",
                    fresh.sites.len(),
                    fresh.hosts.len()
                );
                *self = fresh;
            }
            Err(e) => warn!("Target reload failed, keeping previous lists: {}", e),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty() && self.hosts.is_empty()
    }
}

fn read_list(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ExporterError::TargetList(format!("{}: {}", path, e)))
}

fn is_comment(field: &str) -> bool {
    field.trim_start().starts_with('#')
}

/// Read a site list file
pub fn load_sites(path: &str) -> Result<Vec<Site>> {
    let content = read_list(path)?;
    let sites = parse_sites(&content);
    info!("Loaded {} sites from {}", sites.len(), path);
    Ok(sites)
}

/// Parse site list content; rows with an unparsable endpoint are skipped
pub fn parse_sites(content: &str) -> Vec<Site> {
    let mut sites = Vec::new();

    for (index, row) in content.lines().enumerate().skip(1) {
        if row.trim().is_empty() {
            continue;
        }

        let mut fields = row.split('\t');
        let endpoint = fields.next().unwrap_or_default().trim();
        if is_comment(endpoint) {
            continue;
        }
        let mut next = || fields.next().unwrap_or_default().trim().to_string();

        let url = match Url::parse(endpoint) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping site list line {}: {}", index + 1, e);
                continue;
            }
        };
        let Some(host_name) = url.host_str() else {
            warn!("Skipping site list line {}: no host in {}", index + 1, endpoint);
            continue;
        };
        let host = match url.port() {
            Some(port) => format!("{}:{}", host_name, port),
            None => host_name.to_string(),
        };

        let method = next();
        sites.push(Site {
            host,
            method: if method.is_empty() { "GET".to_string() } else { method },
            auth_type: next(),
            user: next(),
            password: SecretString::new(next().into_boxed_str()),
            accept: next(),
            payload: next(),
            endpoint: url,
        });
    }

    sites
}

/// Read a DNS host list file
pub fn load_hosts(path: &str) -> Result<Vec<String>> {
    let content = read_list(path)?;
    let hosts = parse_hosts(&content);
    info!("Loaded {} hosts from {}", hosts.len(), path);
    Ok(hosts)
}

pub fn parse_hosts(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|row| row.split('\t').next())
        .map(str::trim)
        .filter(|host| !host.is_empty() && !is_comment(host))
        .map(str::to_string)
        .collect()
}
