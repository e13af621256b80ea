//! Collector Layer
//!
//! Runs the external probe programs and turns their output into structured
//! device state.
//!
//! # Architecture
//!
//! - [`ProcessRunner`]: seam for executing `ping` / `snmpwalk` ([`SystemRunner`] in production)
//! - [`ping`]: ICMP probe and output parser
//! - [`snmp`]: SNMP v2c queries and interface table merge
//! - [`DiagnosticCollector`]: sequences the probes into a [`DiagnosticSnapshot`]
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use netsnap::collector::{DiagnosticCollector, DiagnosticConfig, ProbeTarget, SystemRunner};
//!
//! # async fn run() {
//! let runner = Arc::new(SystemRunner::new());
//! let collector = DiagnosticCollector::new(DiagnosticConfig::default(), runner);
//! let snapshot = collector
//!     .collect_diagnostics(&ProbeTarget::new("192.0.2.1", "public"))
//!     .await;
//! println!("{}", snapshot.overall_status);
//! # }
//! ```

mod diagnostic;
pub mod ping;
mod runner;
pub mod snmp;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use diagnostic::{
    DEFAULT_INTERFACE_LIMIT, DiagnosticCollector, DiagnosticConfig, ICMP_UNREACHABLE_ERROR,
    SNMP_NO_RESPONSE_ERROR,
};
pub use ping::{PingConfig, PingMetrics, PingStatus};
pub use runner::SystemRunner;
pub use snmp::{InterfaceIndex, InterfaceRecord, InterfaceStatus, SnmpConfig, SnmpSystemInfo};
pub use traits::{
    CommandOutput, ProcessRunner, RunnerError, TargetValidationError, validate_community,
    validate_target_address,
};
pub use types::{
    DEFAULT_COMMUNITY, DiagnosticIssue, DiagnosticSnapshot, DiagnosticStage, OverallStatus,
    ProbeTarget, SnmpReport,
};
