//! Contract Test: Loop Lifecycle
//!
//! Verifies the repeat/sleep cadence and shutdown behavior of the engine.
//!
//! Constraints verified:
//! - One iteration per poll interval, starting immediately
//! - Failed iterations never stop the loop
//! - Shutdown interrupts the sleep and the engine exits cleanly
//! - A dropped shutdown sender also stops the engine

mod common;

use common::*;
use ddns_core::engine::EngineEvent;
use ddns_core::DdnsEngine;
use std::net::Ipv4Addr;
use std::time::Duration;

const IP_A: Ipv4Addr = Ipv4Addr::new(1, 2, 3, 4);
const IP_B: Ipv4Addr = Ipv4Addr::new(5, 6, 7, 8);

#[tokio::test(start_paused = true)]
async fn iterates_once_per_interval() {
    let source = ScriptedIpSource::fixed(IP_A);
    let provider = MockDnsProvider::new(RecordState::Missing);
    let (engine, _events) = DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");

    let (_shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    // Iterations at t=0, 60, 120, 180
    let run = tokio::time::timeout(
        Duration::from_secs(181),
        engine.run_with_shutdown(Some(shutdown_rx)),
    )
    .await;

    assert!(run.is_err(), "engine keeps running until shutdown");
    assert_eq!(provider.get_call_count(), 4);
    assert_eq!(source.call_count(), 4);

    // First iteration creates the record, the rest find it up to date
    assert_eq!(provider.upserts().len(), 1);
    assert_eq!(provider.record(), RecordState::Present(IP_A));
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_stop_the_loop() {
    // 503, 503, then a new address
    let source = ScriptedIpSource::new(vec![None, None, Some(IP_B)]);
    let provider = MockDnsProvider::with_record(IP_A);
    let (engine, _events) = DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");

    let (_shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let _ = tokio::time::timeout(
        Duration::from_secs(121),
        engine.run_with_shutdown(Some(shutdown_rx)),
    )
    .await;

    assert_eq!(source.call_count(), 3);
    let upserts = provider.upserts();
    assert_eq!(upserts.len(), 1, "only the successful resolution writes");
    assert_eq!(upserts[0].ip, IP_B);
}

#[tokio::test(start_paused = true)]
async fn rejected_upserts_are_retried_next_interval() {
    let source = ScriptedIpSource::fixed(IP_B);
    let provider = MockDnsProvider::with_record(IP_A).rejecting_upserts();
    let (engine, _events) = DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");

    let (_shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let _ = tokio::time::timeout(
        Duration::from_secs(61),
        engine.run_with_shutdown(Some(shutdown_rx)),
    )
    .await;

    // No backoff: one attempt per iteration
    assert_eq!(provider.upserts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_sleep() {
    let source = ScriptedIpSource::fixed(IP_A);
    let provider = MockDnsProvider::with_record(IP_A);
    let mut config = minimal_config("home.example.com");
    config.engine.interval_secs = 3600;

    let (engine, mut events) = DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        config,
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let engine_handle = tokio::spawn(async move {
        engine.run_with_shutdown(Some(shutdown_rx)).await
    });

    // Let the first iteration finish and the engine start sleeping
    tokio::time::sleep(Duration::from_secs(10)).await;
    shutdown_tx.send(()).expect("engine is still listening");

    let result = tokio::time::timeout(Duration::from_secs(5), engine_handle)
        .await
        .expect("engine terminates well before the interval ends")
        .expect("engine task does not panic");
    tokio_test::assert_ok!(result);

    assert_eq!(provider.get_call_count(), 1);

    let events = drain_events(&mut events);
    assert_eq!(
        events.first(),
        Some(&EngineEvent::Started {
            record_name: "home.example.com".to_string(),
            interval_secs: 3600,
        })
    );
    assert_eq!(
        events.last(),
        Some(&EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        })
    );
}

#[tokio::test]
async fn dropped_sender_stops_engine() {
    let source = ScriptedIpSource::fixed(IP_A);
    let provider = MockDnsProvider::with_record(IP_A);

    let (engine, _events) = DdnsEngine::new(
        Box::new(source),
        Box::new(provider),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    drop(shutdown_tx);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine.run_with_shutdown(Some(shutdown_rx)),
    )
    .await
    .expect("engine stops without waiting for the interval");

    tokio_test::assert_ok!(result);
}
