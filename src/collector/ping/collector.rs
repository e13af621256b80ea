//! ICMP ping probe.
//!
//! Runs the system `ping` utility with a fixed echo count and parses its
//! summary lines.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::parser::{ParseAnomaly, PingMetrics, PingOutcome, parse_ping_output};
use crate::collector::traits::{ProcessRunner, RunnerError};

/// Default number of echo requests per probe.
pub const DEFAULT_COUNT: u32 = 4;

/// Default deadline for the whole probe (all echo requests).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Message reported when `ping` exits non-zero.
pub const UNREACHABLE_MESSAGE: &str = "Ping command failed (Host Unreachable)";

fn default_program() -> String {
    "ping".to_string()
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Configuration for the ICMP probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingConfig {
    /// Program to execute (default: "ping").
    #[serde(default = "default_program")]
    pub program: String,
    /// Echo requests per probe (default: 4).
    #[serde(default = "default_count")]
    pub count: u32,
    /// Deadline for the whole probe (default: 20s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            count: DEFAULT_COUNT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PingConfig {
    /// Set the echo count.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Set the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the program to execute.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Platform count flag: `-n` on Windows, `-c` elsewhere.
    pub fn count_flag() -> &'static str {
        if cfg!(windows) { "-n" } else { "-c" }
    }

    /// Command-line arguments for probing `address`.
    pub fn args(&self, address: &str) -> Vec<String> {
        vec![
            Self::count_flag().to_string(),
            self.count.to_string(),
            address.to_string(),
        ]
    }
}

/// ICMP reachability and quality probe.
pub struct PingProbe {
    config: PingConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl PingProbe {
    pub fn new(config: PingConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Probe `address` once.
    ///
    /// Command failures are terminal for this call and are folded into the
    /// returned metrics; nothing is retried.
    pub async fn probe(&self, address: &str) -> PingOutcome {
        let args = self.config.args(address);
        let result = self
            .runner
            .run(&self.config.program, &args, self.config.timeout)
            .await;

        match result {
            Ok(output) if output.is_success() => match output.combined_text() {
                Ok(text) => {
                    let outcome = parse_ping_output(&text);
                    tracing::debug!(
                        target_addr = %address,
                        status = %outcome.metrics.status,
                        loss_pct = outcome.metrics.packet_loss_pct,
                        avg_ms = outcome.metrics.latency_avg_ms,
                        anomalies = outcome.anomalies.len(),
                        "Ping probe parsed"
                    );
                    outcome
                }
                Err(e) => {
                    tracing::warn!(target_addr = %address, error = %e, "Ping output is not UTF-8");
                    PingOutcome {
                        metrics: PingMetrics::unknown(format!("Ping parsing error: {e}")),
                        anomalies: vec![ParseAnomaly::OutputNotText(e.to_string())],
                    }
                }
            },
            Ok(output) => {
                tracing::warn!(
                    target_addr = %address,
                    exit_code = ?output.exit_code,
                    "Ping probe failed"
                );
                PingMetrics::unreachable(UNREACHABLE_MESSAGE).into()
            }
            Err(RunnerError::Timeout { timeout, .. }) => {
                tracing::warn!(
                    target_addr = %address,
                    timeout_ms = timeout.as_millis(),
                    "Ping probe timed out"
                );
                PingMetrics::unreachable(format!(
                    "Ping command timed out after {}",
                    humantime::format_duration(timeout)
                ))
                .into()
            }
            Err(e) => {
                tracing::error!(target_addr = %address, error = %e, "Ping probe could not run");
                PingMetrics::unknown(format!("Ping command could not be executed: {e}")).into()
            }
        }
    }
}

impl std::fmt::Debug for PingProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PingProbe")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
