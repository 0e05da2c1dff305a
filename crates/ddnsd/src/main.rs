// # ddnsd - Route53 DDNS Daemon
//
// Thin integration layer: parse flags, read credentials, wire the HTTP IP
// source and the Route53 provider into the engine, and run until SIGTERM or
// SIGINT. All reconciliation logic lives in ddns-core.
//
// ## Configuration
//
// Flags (see `ddnsd --help`):
// - `--domain`, `--zoneid`: the managed A record and its hosted zone (required)
// - `--ttl`, `--interval`, `--force`, `--ip-url`, `--dry-run`
// - `--debug`, `--log-level` (or `DDNS_LOG_LEVEL`)
//
// Credentials come from the environment only:
// - `AWS_ACCESS_KEY_ID`
// - `AWS_SECRET_ACCESS_KEY`
//
// ## Example
//
// ```bash
// export AWS_ACCESS_KEY_ID=AKIA...
// export AWS_SECRET_ACCESS_KEY=...
//
// ddnsd --domain home.example.com --zoneid Z0123456789ABC --interval 300
// ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::{Credentials, DdnsConfig, DdnsEngine, EngineEvent};
use ddns_ip_http::HttpIpSource;
use ddns_provider_route53::Route53Provider;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::time::ChronoLocal;

use crate::cli::Cli;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Timestamp layout for log lines
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How long the engine gets to stop after a signal
#[cfg(unix)]
const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.max_level()) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let config = cli.into_config(credentials);
    if let Err(e) = config.validate() {
        error!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let (engine, events) = match build_engine(config) {
            Ok(parts) => parts,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        spawn_event_logger(events);

        if let Err(e) = run_daemon(engine).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Install the global fmt subscriber with local wall-clock timestamps
fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Build the IP source and provider from config and hand them to the engine
fn build_engine(config: DdnsConfig) -> Result<(DdnsEngine, mpsc::Receiver<EngineEvent>)> {
    let ip_source =
        HttpIpSource::from_config(&config.ip_source).context("Failed to create IP source")?;
    let provider =
        Route53Provider::from_config(&config.provider).context("Failed to create Route53 client")?;

    info!(
        "Managing record {} in zone {} (provider: {})",
        config.record.name,
        provider.zone_id(),
        config.provider.type_name()
    );

    let parts = DdnsEngine::new(Box::new(ip_source), Box::new(provider), config)
        .context("Failed to create engine")?;
    Ok(parts)
}

/// Drain engine events into the debug log
fn spawn_event_logger(mut events: mpsc::Receiver<EngineEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });
}

/// Run the engine until SIGTERM or SIGINT
#[cfg(unix)]
async fn run_daemon(engine: DdnsEngine) -> Result<()> {
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut engine_task =
        tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::select! {
        received = wait_for_shutdown() => {
            info!("Received shutdown signal: {}", received?);
        }
        finished = &mut engine_task => {
            // The engine only stops on its own when it fails
            finished.context("Engine task panicked")??;
            return Ok(());
        }
    }

    info!("Shutting down daemon");
    let _ = shutdown_tx.send(());

    match timeout(SHUTDOWN_GRACE, engine_task).await {
        Ok(finished) => {
            finished.context("Engine task panicked")??;
            Ok(())
        }
        Err(_) => Err(anyhow::anyhow!("Shutdown timeout after {:?}", SHUTDOWN_GRACE)),
    }
}

/// Run the engine until Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn run_daemon(engine: DdnsEngine) -> Result<()> {
    engine.run().await?;
    info!("Shutting down daemon");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}
