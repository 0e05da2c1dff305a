// # ddns-core
//
// Core library for the Route53 dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for reading and upserting the managed A record
// - **DdnsEngine**: Reconciliation loop that compares the two and upserts
//   on divergence
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Explicit Configuration**: Config and credentials are built once and
//    passed in; nothing reads the environment after startup
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Swallow and Continue**: One failed iteration never stops the loop

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, RecordMetadata};
pub use engine::{DdnsEngine, EngineEvent, Reconciliation};
pub use config::{Credentials, DdnsConfig, EngineConfig, IpSourceConfig, ProviderConfig, RecordConfig};
pub use error::{Error, Result};
