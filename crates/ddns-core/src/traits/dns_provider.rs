// # DNS Provider Trait
//
// Defines the interface for reading and upserting the managed A record via a
// provider API.
//
// ## Implementations
//
// - Route53: `ddns-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     match provider.get_record("home.example.com").await {
//         Ok(record) => println!("Recorded IP: {}", record.ip),
//         Err(e) if e.is_not_found() => println!("No record yet"),
//         Err(e) => return Err(e.into()),
//     }
//
//     provider
//         .upsert_record("home.example.com", "5.6.7.8".parse()?, 300)
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Current state of an A record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    /// The record name, without the trailing dot
    pub name: String,
    /// First value of the record
    pub ip: Ipv4Addr,
    /// Time-to-live for the record
    pub ttl: Option<u32>,
    /// Number of values the record holds; only the first one is used
    pub value_count: usize,
}

/// Trait for DNS provider implementations
///
/// Providers are stateless and single-shot: one API call per method call,
/// no retries, no caching, no background tasks. Whether an update is needed
/// is decided by `DdnsEngine`, never by the provider.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up the A record for `record_name`
    ///
    /// # Returns
    ///
    /// - `Ok(RecordMetadata)`: The record's current value
    /// - `Err(Error::NotFound)`: No A record with that name exists
    /// - `Err(Error)`: The request failed
    async fn get_record(&self, record_name: &str) -> Result<RecordMetadata, crate::Error>;

    /// Create or replace the A record for `record_name` with a single value
    ///
    /// Calling this twice with the same IP is safe.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider acknowledged the change
    /// - `Err(Error)`: The change was rejected or the request failed
    async fn upsert_record(
        &self,
        record_name: &str,
        ip: Ipv4Addr,
        ttl: u32,
    ) -> Result<(), crate::Error>;

    /// Check if this provider can manage the given record name
    fn supports_record(&self, record_name: &str) -> bool;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
