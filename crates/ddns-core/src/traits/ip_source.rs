// # IP Source Trait
//
// Defines the interface for discovering the caller's current public IPv4
// address.
//
// ## Implementations
//
// - HTTP JSON endpoint (ipify): `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("Public IP: {}", current_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for public-IP source implementations
///
/// Each call to [`IpSource::current`] is a single, fresh lookup. The engine
/// calls it once per reconciliation iteration and never caches the result.
///
/// ## Rules for implementations
///
/// - One request per call, no retry loop (the poll interval paces retries)
/// - No caching between calls
/// - Every request must be bounded by a timeout
/// - No spawned tasks
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address reported by the source
    /// - `Err(Error::Network)`: Transport failure, non-200 status or a
    ///   response that does not carry an IPv4 address
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the source name (for logging)
    fn source_name(&self) -> &'static str;
}
