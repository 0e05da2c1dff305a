// # Route53 DNS Provider
//
// This crate provides an AWS Route53 DNS provider implementation for the
// DDNS system.
//
// ## Behavior
//
// - Reads the A record with one `ListResourceRecordSets` call
// - Writes it with one `ChangeResourceRecordSets` UPSERT call
// - Explicit operation timeout (30 seconds by default)
// - Dry-run mode for safe testing
// - No retry, no backoff, no caching: the engine's poll interval paces
//   everything
//
// ## Security Requirements
//
// - The access key pair NEVER appears in logs
// - Credentials come from an explicit `Credentials` value, never from an
//   ambient AWS profile or config file
//
// ## API Reference
//
// - List records: GET `/2013-04-01/hostedzone/{Id}/rrset?name=...&type=A`
// - Change records: POST `/2013-04-01/hostedzone/{Id}/rrset/`

use async_trait::async_trait;
use aws_credential_types::Credentials as AwsCredentials;
use aws_sdk_route53::config::retry::RetryConfig;
use aws_sdk_route53::config::timeout::TimeoutConfig;
use aws_sdk_route53::config::{BehaviorVersion, Region};
use aws_sdk_route53::error::{DisplayErrorContext, SdkError};
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use ddns_core::config::{Credentials, ProviderConfig};
use ddns_core::traits::{DnsProvider, RecordMetadata};
use ddns_core::{Error, Result};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Provider name used in logs and errors
const PROVIDER: &str = "route53";

/// Route53 is a global service signed against us-east-1
const ROUTE53_REGION: &str = "us-east-1";

/// Comment attached to every change batch
const CHANGE_COMMENT: &str = "Dynamic DNS update";

/// Route53 DNS provider
///
/// Stateless and single-shot: each trait method maps to exactly one API call.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform the record lookup
/// - Log the intended UPSERT
/// - **NOT** actually modify DNS records
pub struct Route53Provider {
    /// Route53 API client
    client: aws_sdk_route53::Client,

    /// Hosted zone ID, without the `/hostedzone/` prefix
    zone_id: String,

    /// Dry-run mode: if true, skip the change call
    dry_run: bool,
}

// Custom Debug implementation that never touches the credentials
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("credentials", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Provider {
    /// Create a new Route53 provider
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Hosted zone ID (`Z...` or `/hostedzone/Z...`)
    /// - `credentials`: Static access key pair
    /// - `dry_run`: If true, perform lookups but skip changes
    /// - `timeout`: Operation timeout for every API call
    pub fn new(
        zone_id: impl Into<String>,
        credentials: &Credentials,
        dry_run: bool,
        timeout: Duration,
    ) -> Self {
        Self::build(zone_id.into(), credentials, dry_run, timeout, None)
    }

    /// Same as [`Route53Provider::new`] but talking to `endpoint_url`
    #[cfg(test)]
    fn with_endpoint(endpoint_url: &str, dry_run: bool, timeout: Duration) -> Self {
        Self::build(
            "/hostedzone/ZTESTZONE".to_string(),
            &Credentials::new("AKIATESTKEYID", "test-secret-value"),
            dry_run,
            timeout,
            Some(endpoint_url.to_string()),
        )
    }

    fn build(
        zone_id: String,
        credentials: &Credentials,
        dry_run: bool,
        timeout: Duration,
        endpoint_url: Option<String>,
    ) -> Self {
        let aws_credentials = AwsCredentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            None,
            None,
            "ddns-static",
        );

        let mut sdk_builder = aws_sdk_route53::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(ROUTE53_REGION))
            .credentials_provider(aws_credentials);
        sdk_builder.set_endpoint_url(endpoint_url);
        let sdk_config = sdk_builder
            // One attempt per call; the engine's poll interval is the retry
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            )
            .build();

        Self {
            client: aws_sdk_route53::Client::from_conf(sdk_config),
            zone_id: normalize_zone_id(&zone_id).to_string(),
            dry_run,
        }
    }

    /// Create a provider from the provider section of the configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let ProviderConfig::Route53 {
            zone_id,
            credentials,
            dry_run,
            timeout_secs,
        } = config;

        if *dry_run {
            tracing::warn!("Route53 provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self::new(
            zone_id.clone(),
            credentials,
            *dry_run,
            Duration::from_secs(*timeout_secs),
        ))
    }

    /// The hosted zone this provider writes to
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn get_record(&self, record_name: &str) -> Result<RecordMetadata> {
        tracing::debug!(
            "Listing A records in zone {} starting at {}",
            self.zone_id,
            record_name
        );

        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(&self.zone_id)
            .start_record_name(record_name)
            .start_record_type(RrType::A)
            .send()
            .await
            .map_err(|e| sdk_error("ListResourceRecordSets", e))?;

        select_record(output.resource_record_sets(), record_name)
    }

    async fn upsert_record(&self, record_name: &str, ip: Ipv4Addr, ttl: u32) -> Result<()> {
        let batch = upsert_batch(record_name, ip, ttl)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would UPSERT A record {} -> {} (ttl={}) in zone {}",
                record_name,
                ip,
                ttl,
                self.zone_id
            );
            return Ok(());
        }

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(&self.zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| sdk_error("ChangeResourceRecordSets", e))?;

        tracing::debug!("Route53 accepted UPSERT for {} -> {}", record_name, ip);
        Ok(())
    }

    fn supports_record(&self, record_name: &str) -> bool {
        !record_name.is_empty() && record_name.contains('.') && record_name.len() <= 253
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Strip the `/hostedzone/` prefix the console and some APIs include
fn normalize_zone_id(zone_id: &str) -> &str {
    let zone_id = zone_id.trim();
    zone_id.strip_prefix("/hostedzone/").unwrap_or(zone_id)
}

/// Route53 answers with fully-qualified names; compare without the trailing
/// dot and without case
fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// Pick the A record named `record_name` out of a listing
///
/// The listing starts at the requested name but runs on into following
/// names and types, so both are checked.
fn select_record(sets: &[ResourceRecordSet], record_name: &str) -> Result<RecordMetadata> {
    let wanted = normalize_name(record_name);

    let set = sets
        .iter()
        .find(|set| *set.r#type() == RrType::A && normalize_name(set.name()) == wanted)
        .ok_or_else(|| Error::not_found(format!("A record {} not found", record_name)))?;

    let values = set.resource_records();
    let first = values.first().ok_or_else(|| {
        Error::provider(
            PROVIDER,
            format!("A record {} has no values (alias records are not supported)", record_name),
        )
    })?;

    if values.len() > 1 {
        tracing::warn!(
            "A record {} holds {} values; only the first ({}) is compared and the rest are replaced on update",
            record_name,
            values.len(),
            first.value()
        );
    }

    let ip = first.value().trim().parse::<Ipv4Addr>().map_err(|_| {
        Error::provider(
            PROVIDER,
            format!("A record {} has non-IPv4 value: {}", record_name, first.value()),
        )
    })?;

    Ok(RecordMetadata {
        name: wanted,
        ip,
        ttl: set.ttl().and_then(|ttl| u32::try_from(ttl).ok()),
        value_count: values.len(),
    })
}

/// Build a change batch with a single UPSERT of a one-value A record
fn upsert_batch(record_name: &str, ip: Ipv4Addr, ttl: u32) -> Result<ChangeBatch> {
    let value = ResourceRecord::builder()
        .value(ip.to_string())
        .build()
        .map_err(invalid_request)?;

    let record_set = ResourceRecordSet::builder()
        .name(record_name)
        .r#type(RrType::A)
        .ttl(i64::from(ttl))
        .resource_records(value)
        .build()
        .map_err(invalid_request)?;

    let change = Change::builder()
        .action(ChangeAction::Upsert)
        .resource_record_set(record_set)
        .build()
        .map_err(invalid_request)?;

    ChangeBatch::builder()
        .comment(CHANGE_COMMENT)
        .changes(change)
        .build()
        .map_err(invalid_request)
}

fn invalid_request(err: impl std::fmt::Display) -> Error {
    Error::provider(PROVIDER, format!("Invalid change request: {}", err))
}

/// Map an SDK failure onto the DDNS error taxonomy
///
/// Timeouts and transport failures are network errors; everything the
/// service answered (throttling, bad zone, rejected change) is a provider
/// error.
fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> Error
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let detail = format!("{} failed: {}", operation, DisplayErrorContext(&err));

    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => Error::network(detail),
        _ => Error::provider(PROVIDER, detail),
    }
}
