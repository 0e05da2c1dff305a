//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Reading the managed A record from the DnsProvider
//! - Resolving the current public IP via the IpSource
//! - Comparing the two and upserting the record when they differ
//! - Sleeping for the configured interval and repeating until shutdown
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────┐
//!                      │  DdnsEngine  │
//!                      └──────────────┘
//!                             │
//!         ┌───────────────────┼───────────────────┐
//!         │                   │                   │
//!         ▼                   ▼                   ▼
//! ┌──────────────┐    ┌──────────────┐    ┌─────────────┐
//! │ DnsProvider  │    │  IpSource    │    │   Events    │
//! │ (read/upsert)│    │  (resolve)   │    │  (notify)   │
//! └──────────────┘    └──────────────┘    └─────────────┘
//! ```
//!
//! ## Iteration Flow
//!
//! 1. Read the current record (missing or failed reads are logged, not fatal)
//! 2. Resolve the public IP (failure skips straight to sleeping)
//! 3. If the record already holds that IP and `force` is off, do nothing
//! 4. Otherwise upsert the record with the configured TTL
//! 5. Sleep for the poll interval

use crate::config::{DdnsConfig, RecordConfig};
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpSource};
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, trace, warn};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        record_name: String,
        interval_secs: u64,
    },

    /// Existing record read from the provider
    RecordFound {
        record_name: String,
        ip: Ipv4Addr,
    },

    /// Provider has no record with this name yet
    RecordMissing {
        record_name: String,
    },

    /// Reading the record failed
    RecordLookupFailed {
        record_name: String,
        error: String,
    },

    /// Public IP resolved
    IpResolved {
        ip: Ipv4Addr,
    },

    /// Public IP could not be resolved; the iteration is skipped
    IpResolveFailed {
        error: String,
    },

    /// DNS update skipped (no change needed)
    UpdateSkipped {
        record_name: String,
        current_ip: Ipv4Addr,
    },

    /// DNS update started
    UpdateStarted {
        record_name: String,
        new_ip: Ipv4Addr,
        ttl: u32,
    },

    /// DNS update succeeded
    UpdateSucceeded {
        record_name: String,
        new_ip: Ipv4Addr,
        previous_ip: Option<Ipv4Addr>,
    },

    /// DNS update failed
    UpdateFailed {
        record_name: String,
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Outcome of a single reconciliation iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Record already matched the public IP
    Unchanged {
        ip: Ipv4Addr,
    },

    /// Record was upserted
    Updated {
        previous_ip: Option<Ipv4Addr>,
        new_ip: Ipv4Addr,
    },

    /// The upsert was attempted and failed
    UpdateFailed {
        new_ip: Ipv4Addr,
        error: String,
    },

    /// The public IP could not be resolved; nothing was written
    ResolveFailed {
        error: String,
    },
}

/// Core DDNS engine
///
/// The engine runs the read → resolve → compare → upsert → sleep cycle for a
/// single A record until a shutdown signal arrives.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`] or [`DdnsEngine::run_with_shutdown()`]
/// 3. Engine runs until shutdown signal received
///
/// ## Failure Handling
///
/// Every provider or IP source failure is logged and swallowed. A failed
/// iteration never stops the loop; the poll interval is the only pacing.
pub struct DdnsEngine {
    /// IP source for the public address
    ip_source: Box<dyn IpSource>,

    /// DNS provider holding the record
    provider: Box<dyn DnsProvider>,

    /// The record to manage
    record: RecordConfig,

    /// Delay between iterations
    interval: Duration,

    /// Upsert even when the record already matches
    force: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: DDNS configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        if !provider.supports_record(&config.record.name) {
            return Err(Error::config(format!(
                "Provider {} does not support record {}",
                provider.provider_name(),
                config.record.name
            )));
        }

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            ip_source,
            provider,
            record: config.record,
            interval: Duration::from_secs(config.engine.interval_secs),
            force: config.engine.force,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine until Ctrl-C
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: The signal handler could not be installed
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the engine until `shutdown_rx` fires (or is dropped)
    ///
    /// With `None`, falls back to waiting for Ctrl-C like [`DdnsEngine::run()`].
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            record_name: self.record.name.clone(),
            interval_secs: self.interval.as_secs(),
        });

        info!(
            "Managing A record {} via {} (ttl={}s, interval={:?}, force={})",
            self.record.name,
            self.provider.provider_name(),
            self.record.ttl,
            self.interval,
            self.force
        );

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    // A dropped sender also counts as shutdown
                    let _ = rx.await;
                    Ok(())
                }
                None => tokio::signal::ctrl_c()
                    .await
                    .map_err(|e| Error::Other(format!("Failed to listen for Ctrl-C: {}", e))),
            }
        };
        tokio::pin!(shutdown);

        loop {
            // Both the iteration and the sleep are cancelled by shutdown.
            // An interrupted upsert is harmless: UPSERT is idempotent.
            tokio::select! {
                biased;
                result = &mut shutdown => {
                    result?;
                    break;
                }
                outcome = self.reconcile_once() => {
                    debug!("Iteration finished: {:?}", outcome);
                }
            }

            debug!("Sleeping for {:?}", self.interval);

            tokio::select! {
                biased;
                result = &mut shutdown => {
                    result?;
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Shutdown signal received, engine stopped");
        self.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });

        Ok(())
    }

    /// Run a single reconciliation iteration
    ///
    /// Never fails: every error is logged, reported as an event, and folded
    /// into the returned [`Reconciliation`].
    pub async fn reconcile_once(&self) -> Reconciliation {
        let record_name = self.record.name.as_str();

        let recorded_ip = self.read_record().await;

        let observed_ip = match self.ip_source.current().await {
            Ok(ip) => {
                info!(
                    "Current IP is {} according to {}",
                    ip,
                    self.ip_source.source_name()
                );
                self.emit_event(EngineEvent::IpResolved { ip });
                ip
            }
            Err(e) => {
                error!(
                    "Error getting current IP from {}: {}",
                    self.ip_source.source_name(),
                    e
                );
                self.emit_event(EngineEvent::IpResolveFailed {
                    error: e.to_string(),
                });
                return Reconciliation::ResolveFailed {
                    error: e.to_string(),
                };
            }
        };

        if recorded_ip == Some(observed_ip) {
            if !self.force {
                info!(
                    "Current IP matches the {} record for {}. No change needed",
                    self.provider.provider_name(),
                    record_name
                );
                self.emit_event(EngineEvent::UpdateSkipped {
                    record_name: record_name.to_string(),
                    current_ip: observed_ip,
                });
                return Reconciliation::Unchanged { ip: observed_ip };
            }

            info!("Record {} already matches, forcing update", record_name);
        }

        self.update_record(recorded_ip, observed_ip).await
    }

    /// Read the managed record, folding every failure into `None`
    async fn read_record(&self) -> Option<Ipv4Addr> {
        let record_name = self.record.name.as_str();

        match self.provider.get_record(record_name).await {
            Ok(record) => {
                info!(
                    "Found {} record for {} with IP {}",
                    self.provider.provider_name(),
                    record_name,
                    record.ip
                );
                self.emit_event(EngineEvent::RecordFound {
                    record_name: record_name.to_string(),
                    ip: record.ip,
                });
                Some(record.ip)
            }
            Err(e) if e.is_not_found() => {
                warn!(
                    "Record {} not found in {}, continuing",
                    record_name,
                    self.provider.provider_name()
                );
                self.emit_event(EngineEvent::RecordMissing {
                    record_name: record_name.to_string(),
                });
                None
            }
            Err(e) => {
                error!("Failed to read record {}: {}", record_name, e);
                self.emit_event(EngineEvent::RecordLookupFailed {
                    record_name: record_name.to_string(),
                    error: e.to_string(),
                });
                None
            }
        }
    }

    /// Upsert the record to `new_ip`, single attempt
    async fn update_record(
        &self,
        previous_ip: Option<Ipv4Addr>,
        new_ip: Ipv4Addr,
    ) -> Reconciliation {
        let record_name = self.record.name.as_str();
        let ttl = self.record.ttl;

        warn!(
            "Attempting to update {} record for {} to resolve to {} with TTL {}",
            self.provider.provider_name(),
            record_name,
            new_ip,
            ttl
        );
        self.emit_event(EngineEvent::UpdateStarted {
            record_name: record_name.to_string(),
            new_ip,
            ttl,
        });

        match self.provider.upsert_record(record_name, new_ip, ttl).await {
            Ok(()) => {
                info!("Updated {} record for {} to {}", self.provider.provider_name(), record_name, new_ip);
                self.emit_event(EngineEvent::UpdateSucceeded {
                    record_name: record_name.to_string(),
                    new_ip,
                    previous_ip,
                });
                Reconciliation::Updated {
                    previous_ip,
                    new_ip,
                }
            }
            Err(e) => {
                error!("Unable to update record {}: {}", record_name, e);
                self.emit_event(EngineEvent::UpdateFailed {
                    record_name: record_name.to_string(),
                    error: e.to_string(),
                });
                Reconciliation::UpdateFailed {
                    new_ip,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(
                    "Event channel full, dropping event {:?}. Consider increasing event_channel_capacity.",
                    event
                );
            }
            Err(TrySendError::Closed(_)) => {
                trace!("Event receiver dropped");
            }
        }
    }
}
