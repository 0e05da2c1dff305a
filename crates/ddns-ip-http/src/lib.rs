// # HTTP IP Source
//
// This crate provides an HTTP-based public-IP source for the DDNS system.
//
// ## Architecture
//
// Each call to `current()` issues a single GET to an external service
// (ipify by default) asking for a JSON reply:
//
// ```http
// GET /?format=json
//
// {"ip": "203.0.113.7"}
// ```
//
// Anything other than HTTP 200 with an IPv4 `ip` field is a network error.
// There is no retry and no caching here; the engine calls this once per
// iteration and the poll interval paces retries.

use ddns_core::config::IpSourceConfig;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use reqwest::StatusCode;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Body returned by the IP service
#[derive(Debug, Deserialize)]
struct IpReply {
    ip: String,
}

/// HTTP-based public-IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Service URL (e.g., "https://api.ipify.org")
    /// - `timeout`: Bound on the whole request
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create from the IP source section of the configuration
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        config.validate()?;

        let IpSourceConfig::Http { url, timeout_secs } = config;
        Self::new(url.clone(), Duration::from_secs(*timeout_secs))
    }

    /// The service URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("format", "json")])
            .send()
            .await
            .map_err(|e| Error::network(format!("Request to {} failed: {}", self.url, e)))?;

        check_status(response.status())?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        parse_body(&body)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Fetching public IP from {}", self.url);
        self.fetch_ip().await
    }

    fn source_name(&self) -> &'static str {
        "ipify"
    }
}

/// Only a plain 200 counts as success
fn check_status(status: StatusCode) -> Result<()> {
    if status != StatusCode::OK {
        return Err(Error::network(format!("HTTP error: {}", status)));
    }
    Ok(())
}

/// Extract the IPv4 address from a `{"ip": "..."}` body
fn parse_body(body: &str) -> Result<Ipv4Addr> {
    let reply: IpReply = serde_json::from_str(body)
        .map_err(|e| Error::network(format!("Malformed response body: {}", e)))?;

    let ip_text = reply.ip.trim();
    ip_text
        .parse()
        .map_err(|_| Error::network(format!("Expected IPv4 address, got: {}", ip_text)))
}
