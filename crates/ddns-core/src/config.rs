//! Configuration types for the DDNS system
//!
//! Configuration is built once at startup (by `ddnsd` from CLI flags and the
//! two credential environment variables), validated, and then handed to the
//! components by value. Nothing reads the environment after that point.

use serde::Deserialize;
use std::fmt;

/// Default time-to-live for the managed record (seconds)
pub const DEFAULT_TTL_SECS: u32 = 300;

/// Default delay between reconciliation iterations (seconds)
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Default public-IP discovery endpoint
pub const DEFAULT_IP_SOURCE_URL: &str = "https://api.ipify.org";

/// Default timeout for the public-IP request (seconds)
pub const DEFAULT_IP_SOURCE_TIMEOUT_SECS: u64 = 10;

/// Default operation timeout for provider API calls (seconds)
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the access key ID
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable holding the secret access key
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Largest TTL Route53 accepts
const MAX_TTL_SECS: u32 = i32::MAX as u32;

/// Main DDNS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DdnsConfig {
    /// The single A record to manage
    pub record: RecordConfig,

    /// Public-IP source configuration
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Loop settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration for `domain` in `zone_id` with defaults
    /// for everything else
    pub fn new(
        domain: impl Into<String>,
        zone_id: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            record: RecordConfig::new(domain),
            ip_source: IpSourceConfig::default(),
            provider: ProviderConfig::Route53 {
                zone_id: zone_id.into(),
                credentials,
                dry_run: false,
                timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            },
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.record.validate()?;
        self.ip_source.validate()?;
        self.provider.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// DNS record configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordConfig {
    /// Record name (e.g. "home.example.com")
    pub name: String,

    /// Time-to-live written with every upsert
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl RecordConfig {
    /// Create a new record configuration with the default TTL
    ///
    /// A trailing dot is accepted and stripped.
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.trim_end_matches('.').to_string(),
            ttl: DEFAULT_TTL_SECS,
        }
    }

    /// Set the record TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(&self.name)?;

        if self.ttl > MAX_TTL_SECS {
            return Err(crate::Error::config(format!(
                "TTL must be at most {} seconds. Got: {}",
                MAX_TTL_SECS, self.ttl
            )));
        }

        Ok(())
    }
}

fn default_ttl() -> u32 {
    DEFAULT_TTL_SECS
}

/// Public-IP source configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// HTTP endpoint answering `{"ip": "..."}` to `?format=json`
    Http {
        /// URL to fetch the IP from
        #[serde(default = "default_ip_source_url")]
        url: String,
        /// Request timeout in seconds
        #[serde(default = "default_ip_source_timeout_secs")]
        timeout_secs: u64,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let IpSourceConfig::Http { url, timeout_secs } = self;

        if url.is_empty() {
            return Err(crate::Error::config("HTTP IP source URL cannot be empty"));
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "HTTP IP source URL must use HTTP or HTTPS scheme. Got: {}",
                url
            )));
        }
        if *timeout_secs == 0 {
            return Err(crate::Error::config("HTTP IP source timeout must be > 0"));
        }

        Ok(())
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http {
            url: default_ip_source_url(),
            timeout_secs: default_ip_source_timeout_secs(),
        }
    }
}

fn default_ip_source_url() -> String {
    DEFAULT_IP_SOURCE_URL.to_string()
}

fn default_ip_source_timeout_secs() -> u64 {
    DEFAULT_IP_SOURCE_TIMEOUT_SECS
}

/// DNS provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// AWS Route53
    Route53 {
        /// Hosted zone ID
        zone_id: String,
        /// Static access key pair
        credentials: Credentials,
        /// Perform reads but only log the intended change
        #[serde(default)]
        dry_run: bool,
        /// Operation timeout in seconds
        #[serde(default = "default_provider_timeout_secs")]
        timeout_secs: u64,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let ProviderConfig::Route53 {
            zone_id,
            credentials,
            timeout_secs,
            ..
        } = self;

        if zone_id.trim().is_empty() {
            return Err(crate::Error::config("Route53 hosted zone ID cannot be empty"));
        }
        credentials.validate()?;
        if *timeout_secs == 0 {
            return Err(crate::Error::config("Route53 timeout must be > 0"));
        }

        Ok(())
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Route53 { .. } => "route53",
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        let ProviderConfig::Route53 { dry_run, .. } = &mut self;
        *dry_run = enabled;
        self
    }
}

fn default_provider_timeout_secs() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}

/// Provider access key pair
///
/// Read once at startup. The `Debug` implementation never prints either value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    /// Create credentials from an explicit key pair
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Read the key pair from the process environment
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the key pair through `lookup`, failing if either variable is
    /// absent or empty
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    crate::Error::config(format!(
                        "{} is required. Set it via: export {}=...",
                        name, name
                    ))
                })
        };

        Ok(Self {
            access_key_id: read(ACCESS_KEY_ID_VAR)?,
            secret_access_key: read(SECRET_ACCESS_KEY_VAR)?,
        })
    }

    /// Access key ID
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return Err(crate::Error::config("Provider credentials cannot be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &"<REDACTED>")
            .field("secret_access_key", &"<REDACTED>")
            .finish()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Seconds to sleep between iterations
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Upsert on every iteration, even when the record already matches
    #[serde(default)]
    pub force: bool,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Poll interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            force: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_event_channel_capacity() -> usize {
    100
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: overall length, label length, label characters.
/// A single trailing dot is tolerated.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}
