//! netsnap - Network Device Health Snapshots
//!
//! Collects a point-in-time health snapshot of a network device by combining
//! ICMP reachability and quality metrics with SNMP system and interface
//! state. It can be used as a library, or run as a standalone binary with the
//! `netsnap` executable (HTTP API or one-off CLI report).
//!
//! # Architecture
//!
//! - **Collector**: runs `ping` / `snmpwalk`, parses their output, merges interface tables
//! - **Report**: text report and LLM troubleshooting prompt
//! - **Server**: JSON API over the collector
//! - **Config**: YAML configuration with environment variable expansion
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use netsnap::{DiagnosticCollector, DiagnosticConfig, ProbeTarget, SystemRunner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let collector =
//!         DiagnosticCollector::new(DiagnosticConfig::default(), Arc::new(SystemRunner::new()));
//!     let snapshot = collector
//!         .collect_diagnostics(&ProbeTarget::new("192.0.2.1", "public"))
//!         .await;
//!     print!("{}", netsnap::report::render_text(&snapshot));
//! }
//! ```

pub mod collector;
pub mod config;
pub mod report;
pub mod server;

pub use collector::{
    DiagnosticCollector, DiagnosticConfig, DiagnosticSnapshot, ProbeTarget, ProcessRunner,
    SystemRunner,
};
pub use config::AppConfig;
