// # Route53 Provider Real Environment Validation Tool
//
// Exercises the Route53 provider against a real hosted zone: read the
// record, upsert a test address, read it back.
//
// ## Usage
//
// ```bash
// # Dry-run mode (default - safe)
// AWS_ACCESS_KEY_ID=AKIA... \
// AWS_SECRET_ACCESS_KEY=... \
// DDNS_ZONE_ID=Z0123456789ABC \
// DDNS_RECORD_NAME=ddns-test.example.com \
// DDNS_TEST_IP=192.0.2.1 \
// cargo run -p ddns-demos --bin route53_validation
//
// # Live mode (makes actual changes!)
// DDNS_MODE=live ... cargo run -p ddns-demos --bin route53_validation
// ```
//
// ## Environment Variables
//
// Required:
// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
// - `DDNS_ZONE_ID`: Hosted zone ID
// - `DDNS_RECORD_NAME`: Full record name (e.g., "ddns-test.example.com")
// - `DDNS_TEST_IP`: IPv4 address to write
//
// Optional:
// - `DDNS_TTL`: TTL in seconds (default: 300)
// - `DDNS_MODE`: "dry-run" or "live" (default: dry-run)

use ddns_core::config::{Credentials, DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_TTL_SECS};
use ddns_core::traits::DnsProvider;
use ddns_provider_route53::Route53Provider;
use std::env;
use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;

fn required(name: &str) -> Option<String> {
    let value = env::var(name).ok().filter(|v| !v.is_empty());
    if value.is_none() {
        tracing::error!("{} environment variable is required", name);
    }
    value
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("=== Route53 Provider Real Environment Validation ===");

    let (Some(zone_id), Some(record_name), Some(test_ip_str)) = (
        required("DDNS_ZONE_ID"),
        required("DDNS_RECORD_NAME"),
        required("DDNS_TEST_IP"),
    ) else {
        return ExitCode::FAILURE;
    };

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let test_ip: Ipv4Addr = match test_ip_str.parse() {
        Ok(ip) => ip,
        Err(_) => {
            tracing::error!("DDNS_TEST_IP must be an IPv4 address, got: {}", test_ip_str);
            return ExitCode::FAILURE;
        }
    };

    let ttl = env::var("DDNS_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TTL_SECS);

    let mode = env::var("DDNS_MODE").unwrap_or_else(|_| "dry-run".to_string());
    let dry_run = mode.to_lowercase() != "live";

    if dry_run {
        tracing::warn!("Running in DRY-RUN mode - no changes will be made");
    } else {
        tracing::warn!("Running in LIVE mode - will make actual DNS changes!");
    }

    tracing::info!("Configuration:");
    tracing::info!("  Zone ID: {}", zone_id);
    tracing::info!("  Record: {}", record_name);
    tracing::info!("  Test IP: {}", test_ip);
    tracing::info!("  TTL: {}", ttl);
    tracing::info!("  Mode: {}", mode);

    tracing::info!("--- Step 1: Creating Route53 Provider ---");
    let provider = Route53Provider::new(
        zone_id,
        &credentials,
        dry_run,
        Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
    );
    tracing::info!("Provider created for zone {}", provider.zone_id());

    if !provider.supports_record(&record_name) {
        tracing::error!("Provider does not support record: {}", record_name);
        return ExitCode::FAILURE;
    }

    tracing::info!("--- Step 2: Reading Current Record ---");
    match provider.get_record(&record_name).await {
        Ok(record) => tracing::info!("Current value: {} (ttl {:?})", record.ip, record.ttl),
        Err(e) if e.is_not_found() => tracing::info!("No A record yet for {}", record_name),
        Err(e) => {
            tracing::error!("Lookup failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    tracing::info!("--- Step 3: Upserting Test Address ---");
    if let Err(e) = provider.upsert_record(&record_name, test_ip, ttl).await {
        tracing::error!("Upsert failed: {}", e);
        return ExitCode::FAILURE;
    }

    if dry_run {
        tracing::info!("=== DRY-RUN COMPLETE ===");
        tracing::info!("To make actual changes, set DDNS_MODE=live");
        return ExitCode::SUCCESS;
    }

    tracing::info!("--- Step 4: Reading Back ---");
    match provider.get_record(&record_name).await {
        Ok(record) if record.ip == test_ip => {
            tracing::info!("Record now points at {}", record.ip);
        }
        Ok(record) => {
            // Route53 changes are eventually consistent
            tracing::warn!("Record still reads {}; change may be pending", record.ip);
        }
        Err(e) => {
            tracing::error!("Read-back failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    tracing::info!("=== LIVE MODE COMPLETE ===");
    ExitCode::SUCCESS
}
