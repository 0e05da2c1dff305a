//! Minimal embedding example for ddns-core
//!
//! Runs the engine inside a host application with its own IP source and
//! provider, then stops it through a shutdown channel.

use ddns_core::traits::{DnsProvider, IpSource, RecordMetadata};
use ddns_core::{Credentials, DdnsConfig, DdnsEngine, Error, Reconciliation, Result};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// IP source the application can steer
#[derive(Clone)]
struct EmbeddedIpSource {
    current_ip: Arc<Mutex<Ipv4Addr>>,
}

impl EmbeddedIpSource {
    fn new(ip: Ipv4Addr) -> Self {
        Self {
            current_ip: Arc::new(Mutex::new(ip)),
        }
    }

    /// Simulate the ISP handing out a new address
    fn set(&self, ip: Ipv4Addr) {
        if let Ok(mut current) = self.current_ip.lock() {
            *current = ip;
        }
    }
}

#[async_trait::async_trait]
impl IpSource for EmbeddedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.current_ip
            .lock()
            .map(|ip| *ip)
            .map_err(|_| Error::Other("IP lock poisoned".to_string()))
    }

    fn source_name(&self) -> &'static str {
        "embedded"
    }
}

/// In-memory zone holding one record
#[derive(Clone, Default)]
struct EmbeddedProvider {
    record: Arc<Mutex<Option<(Ipv4Addr, u32)>>>,
}

#[async_trait::async_trait]
impl DnsProvider for EmbeddedProvider {
    async fn get_record(&self, record_name: &str) -> Result<RecordMetadata> {
        let record = *self
            .record
            .lock()
            .map_err(|_| Error::Other("Zone lock poisoned".to_string()))?;

        match record {
            Some((ip, ttl)) => Ok(RecordMetadata {
                name: record_name.to_string(),
                ip,
                ttl: Some(ttl),
                value_count: 1,
            }),
            None => Err(Error::not_found(record_name)),
        }
    }

    async fn upsert_record(&self, record_name: &str, ip: Ipv4Addr, ttl: u32) -> Result<()> {
        println!("[Embedded] UPSERT {} A {} (ttl {})", record_name, ip, ttl);
        let mut record = self
            .record
            .lock()
            .map_err(|_| Error::Other("Zone lock poisoned".to_string()))?;
        *record = Some((ip, ttl));
        Ok(())
    }

    fn supports_record(&self, record_name: &str) -> bool {
        record_name.contains('.')
    }

    fn provider_name(&self) -> &'static str {
        "embedded"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded ddns-core Example ===\n");

    let ip_source = EmbeddedIpSource::new(Ipv4Addr::new(203, 0, 113, 10));
    let provider = EmbeddedProvider::default();

    let mut config = DdnsConfig::new(
        "home.example.com",
        "ZEMBEDDED",
        Credentials::new("embedded", "embedded"),
    );
    config.engine.interval_secs = 1;

    println!("1. Creating engine...");
    let (engine, mut event_rx) =
        DdnsEngine::new(Box::new(ip_source.clone()), Box::new(provider), config)?;

    let event_listener = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            println!("[Event] {:?}", event);
        }
    });

    println!("2. Running a single iteration by hand...");
    match engine.reconcile_once().await {
        Reconciliation::Updated { previous_ip, new_ip } => {
            println!("   Created record: {:?} -> {}", previous_ip, new_ip)
        }
        other => println!("   Unexpected outcome: {:?}", other),
    }

    println!("3. Starting the loop in the background...");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let engine_handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("4. Address changes; the next iteration picks it up");
    ip_source.set(Ipv4Addr::new(203, 0, 113, 11));
    tokio::time::sleep(Duration::from_millis(1500)).await;

    println!("5. Stopping engine...");
    let _ = shutdown_tx.send(());
    match engine_handle.await {
        Ok(result) => result?,
        Err(e) => return Err(Error::Other(format!("Engine task failed: {}", e))),
    }

    let _ = tokio::time::timeout(Duration::from_millis(100), event_listener).await;

    println!("\n=== Embedding Successful ===");
    Ok(())
}
