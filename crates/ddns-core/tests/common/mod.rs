//! Test doubles and common utilities for engine contract tests
//!
//! The doubles share their state through `Arc`s, so a test can clone one,
//! hand the clone to the engine, and keep inspecting the original.

#![allow(dead_code)]

use ddns_core::config::{Credentials, DdnsConfig};
use ddns_core::engine::EngineEvent;
use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, IpSource, RecordMetadata};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// An IpSource that replays a fixed script of replies
///
/// `None` entries simulate the endpoint answering HTTP 503. Once the script
/// is exhausted the last entry repeats.
#[derive(Clone)]
pub struct ScriptedIpSource {
    replies: Arc<Vec<Option<Ipv4Addr>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(replies: Vec<Option<Ipv4Addr>>) -> Self {
        assert!(!replies.is_empty(), "script needs at least one reply");
        Self {
            replies: Arc::new(replies),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answers with `ip`
    pub fn fixed(ip: Ipv4Addr) -> Self {
        Self::new(vec![Some(ip)])
    }

    /// Always answers HTTP 503
    pub fn unavailable() -> Self {
        Self::new(vec![None])
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies[call.min(self.replies.len() - 1)];

        reply.ok_or_else(|| Error::network("HTTP error: 503 Service Unavailable"))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// What the mock provider currently holds for the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Present(Ipv4Addr),
    Missing,
    Unreachable,
}

/// A single upsert call seen by the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertCall {
    pub record_name: String,
    pub ip: Ipv4Addr,
    pub ttl: u32,
}

/// A mock DnsProvider that tracks calls
///
/// Successful upserts overwrite the stored record, like the real provider.
#[derive(Clone)]
pub struct MockDnsProvider {
    record: Arc<Mutex<RecordState>>,
    reject_upserts: bool,
    get_call_count: Arc<AtomicUsize>,
    upserts: Arc<Mutex<Vec<UpsertCall>>>,
}

impl MockDnsProvider {
    pub fn new(record: RecordState) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
            reject_upserts: false,
            get_call_count: Arc::new(AtomicUsize::new(0)),
            upserts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider that already holds `ip`
    pub fn with_record(ip: Ipv4Addr) -> Self {
        Self::new(RecordState::Present(ip))
    }

    /// Make every upsert fail with a provider error
    pub fn rejecting_upserts(mut self) -> Self {
        self.reject_upserts = true;
        self
    }

    /// Get the number of times get_record() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get every upsert call made so far
    pub fn upserts(&self) -> Vec<UpsertCall> {
        self.upserts.lock().unwrap().clone()
    }

    /// Get the record as currently stored
    pub fn record(&self) -> RecordState {
        *self.record.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn get_record(&self, record_name: &str) -> Result<RecordMetadata> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);

        match *self.record.lock().unwrap() {
            RecordState::Present(ip) => Ok(RecordMetadata {
                name: record_name.to_string(),
                ip,
                ttl: Some(300),
                value_count: 1,
            }),
            RecordState::Missing => Err(Error::not_found(record_name)),
            RecordState::Unreachable => Err(Error::network("connection refused")),
        }
    }

    async fn upsert_record(&self, record_name: &str, ip: Ipv4Addr, ttl: u32) -> Result<()> {
        self.upserts.lock().unwrap().push(UpsertCall {
            record_name: record_name.to_string(),
            ip,
            ttl,
        });

        if self.reject_upserts {
            return Err(Error::provider("mock", "InvalidChangeBatch"));
        }

        *self.record.lock().unwrap() = RecordState::Present(ip);
        Ok(())
    }

    fn supports_record(&self, record_name: &str) -> bool {
        record_name.contains('.')
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(record_name: &str) -> DdnsConfig {
    let mut config = DdnsConfig::new(
        record_name,
        "ZTESTZONE",
        Credentials::new("test-key-id", "test-secret"),
    );
    config.engine.interval_secs = 60;
    config
}

/// Drain every event currently buffered in the channel
pub fn drain_events(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
