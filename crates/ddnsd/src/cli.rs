//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use ddns_core::config::{
    Credentials, DdnsConfig, IpSourceConfig, DEFAULT_INTERVAL_SECS, DEFAULT_IP_SOURCE_TIMEOUT_SECS,
    DEFAULT_IP_SOURCE_URL, DEFAULT_TTL_SECS,
};
use tracing::Level;

/// ddnsd: keep a Route53 A record pointed at this network's public IP
///
/// Credentials are read from AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY.
#[derive(Debug, Parser)]
#[command(name = "ddnsd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Domain name whose A record is managed
    #[arg(long)]
    pub domain: String,

    /// Route53 hosted zone ID
    #[arg(long = "zoneid", alias = "zone-id")]
    pub zone_id: String,

    /// Time to live (TTL) in seconds for the DNS record
    #[arg(long, default_value_t = DEFAULT_TTL_SECS)]
    pub ttl: u32,

    /// Update the record on every poll, even when it already matches
    #[arg(long)]
    pub force: bool,

    /// Seconds between polls
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// Public IP service answering `?format=json`
    #[arg(long = "ip-url", default_value = DEFAULT_IP_SOURCE_URL)]
    pub ip_url: String,

    /// Look up records but only log the changes that would be made
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Log level
    #[arg(long = "log-level", env = "DDNS_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

/// Log level argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl Cli {
    /// Effective max log level; `--debug` raises anything quieter to DEBUG
    pub fn max_level(&self) -> Level {
        match (self.debug, self.log_level) {
            (true, LogLevel::Trace) => Level::TRACE,
            (true, _) => Level::DEBUG,
            (false, level) => level.into(),
        }
    }

    /// Build the daemon configuration from the parsed flags
    pub fn into_config(self, credentials: Credentials) -> DdnsConfig {
        let mut config = DdnsConfig::new(self.domain, self.zone_id, credentials);

        config.record = config.record.with_ttl(self.ttl);
        config.ip_source = IpSourceConfig::Http {
            url: self.ip_url,
            timeout_secs: DEFAULT_IP_SOURCE_TIMEOUT_SECS,
        };
        config.provider = config.provider.with_dry_run(self.dry_run);
        config.engine.interval_secs = self.interval;
        config.engine.force = self.force;

        config
    }
}
