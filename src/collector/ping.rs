//! ICMP probing via the system `ping` utility.
//!
//! - [`PingProbe`]: runs the probe command
//! - [`parse_ping_output`]: turns its summary into [`PingMetrics`]

mod collector;
mod parser;

pub use collector::{DEFAULT_COUNT, PingConfig, PingProbe, UNREACHABLE_MESSAGE};
pub use parser::{
    LOSS_MARKER, ParseAnomaly, PingMetrics, PingOutcome, PingStatus, RTT_MARKER,
    parse_ping_output,
};
