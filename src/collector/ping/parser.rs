//! Parser for the textual summary printed by the system `ping` utility.
//!
//! Only the two summary lines are consumed:
//!
//! ```text
//! 4 packets transmitted, 4 received, 0% packet loss, time 3004ms
//! rtt min/avg/max/mdev = 0.048/0.142/0.245/0.100 ms
//! ```

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Marker that terminates the packet loss percentage token.
pub const LOSS_MARKER: &str = "% packet loss";

/// Marker identifying the round-trip statistics line.
pub const RTT_MARKER: &str = "min/avg/max";

/// Reachability verdict of an ICMP probe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PingStatus {
    Up,
    Down,
    Unknown,
}

/// Structured ICMP quality metrics.
///
/// When `packet_loss_pct` is 100 the status is always [`PingStatus::Down`]
/// and the latency fields carry no measurement (they stay at zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingMetrics {
    pub status: PingStatus,
    pub packet_loss_pct: f64,
    pub latency_min_ms: f64,
    pub latency_avg_ms: f64,
    pub latency_max_ms: f64,
    /// Mean deviation of the round-trip samples.
    pub jitter_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Default for PingMetrics {
    fn default() -> Self {
        Self {
            status: PingStatus::Up,
            packet_loss_pct: 0.0,
            latency_min_ms: 0.0,
            latency_avg_ms: 0.0,
            latency_max_ms: 0.0,
            jitter_ms: 0.0,
            error_message: None,
        }
    }
}

impl PingMetrics {
    /// Metrics for a probe whose command reported the host as unreachable.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            status: PingStatus::Down,
            packet_loss_pct: 100.0,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Metrics for a probe whose outcome could not be determined.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            status: PingStatus::Unknown,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_down(&self) -> bool {
        self.status == PingStatus::Down
    }
}

/// Output that did not match the expected summary format.
///
/// Anomalies never fail a probe; the affected fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAnomaly {
    #[error("packet loss marker not found; loss assumed 0%")]
    LossMarkerMissing,

    #[error("packet loss value '{0}' is not a percentage")]
    LossValueInvalid(String),

    #[error("round-trip statistics line not found; latency and jitter unavailable")]
    RttLineMissing,

    #[error("round-trip statistics line malformed: '{0}'")]
    RttLineMalformed(String),

    /// Output bytes were not valid UTF-8; nothing was parsed.
    #[error("output is not valid UTF-8: {0}")]
    OutputNotText(String),
}

/// Result of one ICMP probe: the metrics plus whatever did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct PingOutcome {
    pub metrics: PingMetrics,
    pub anomalies: Vec<ParseAnomaly>,
}

impl From<PingMetrics> for PingOutcome {
    fn from(metrics: PingMetrics) -> Self {
        Self {
            metrics,
            anomalies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RoundTrip {
    min: f64,
    avg: f64,
    max: f64,
    jitter: f64,
}

/// Parse raw `ping` output into metrics.
///
/// Never fails: anything unrecognised is reported as a [`ParseAnomaly`]
/// and the corresponding fields stay at their defaults.
pub fn parse_ping_output(output: &str) -> PingOutcome {
    let mut metrics = PingMetrics::default();
    let mut anomalies = Vec::new();

    match extract_packet_loss(output) {
        Ok(loss) => metrics.packet_loss_pct = loss,
        Err(anomaly) => anomalies.push(anomaly),
    }

    // No replies means no round-trip samples to read.
    if metrics.packet_loss_pct == 100.0 {
        metrics.status = PingStatus::Down;
        return PingOutcome { metrics, anomalies };
    }

    match extract_round_trip(output) {
        Ok(rtt) => {
            metrics.latency_min_ms = rtt.min;
            metrics.latency_avg_ms = rtt.avg;
            metrics.latency_max_ms = rtt.max;
            metrics.jitter_ms = rtt.jitter;
        }
        Err(anomaly) => anomalies.push(anomaly),
    }

    PingOutcome { metrics, anomalies }
}

fn extract_packet_loss(output: &str) -> Result<f64, ParseAnomaly> {
    let marker = output
        .find(LOSS_MARKER)
        .ok_or(ParseAnomaly::LossMarkerMissing)?;
    let head = &output[..marker];
    let start = head.rfind(' ').map_or(0, |i| i + 1);
    let token = &head[start..];

    match token.parse::<f64>() {
        Ok(loss) if (0.0..=100.0).contains(&loss) => Ok(loss),
        _ => Err(ParseAnomaly::LossValueInvalid(token.to_string())),
    }
}

fn extract_round_trip(output: &str) -> Result<RoundTrip, ParseAnomaly> {
    let line = output
        .lines()
        .find(|line| line.contains(RTT_MARKER))
        .ok_or(ParseAnomaly::RttLineMissing)?;
    let malformed = || ParseAnomaly::RttLineMalformed(line.trim().to_string());

    let (_, values) = line.split_once(" = ").ok_or_else(malformed)?;
    let values = values.split(' ').next().unwrap_or_default();
    let parsed = values
        .split('/')
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed())?;

    match parsed.as_slice() {
        &[min, avg, max, jitter]
            if [min, avg, max, jitter]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0) =>
        {
            Ok(RoundTrip {
                min,
                avg,
                max,
                jitter,
            })
        }
        _ => Err(malformed()),
    }
}
