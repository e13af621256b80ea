//! Data types produced by a diagnostic run.
//!
//! - [`ProbeTarget`]: what to probe
//! - [`DiagnosticSnapshot`]: the assembled result of a full run
//! - [`SnmpReport`]: the result of an SNMP-only run
//! - [`DiagnosticIssue`]: recovered or terminal failures observed during a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::collector::ping::PingMetrics;
use crate::collector::snmp::{InterfaceRecord, SnmpSystemInfo};
use crate::collector::traits::{
    TargetValidationError, validate_community, validate_target_address,
};

/// Community used when a request does not name one.
pub const DEFAULT_COMMUNITY: &str = "public";

fn default_community() -> String {
    DEFAULT_COMMUNITY.to_string()
}

/// Device to probe.
///
/// The community string is a credential and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeTarget {
    pub address: String,
    #[serde(skip_serializing, default = "default_community")]
    pub snmp_community: String,
}

impl ProbeTarget {
    pub fn new(address: impl Into<String>, snmp_community: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            snmp_community: snmp_community.into(),
        }
    }

    /// Check that neither field can be mistaken for a command-line flag.
    pub fn validate(&self) -> Result<(), TargetValidationError> {
        validate_target_address(&self.address)?;
        validate_community(&self.snmp_community)
    }
}

/// Final state reached by a diagnostic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiagnosticStage {
    Init,
    IcmpProbed,
    /// ICMP reported the device down; SNMP was not attempted.
    Unreachable,
    SnmpSystemQueried,
    /// Device answers ICMP but not SNMP.
    SnmpUnreachable,
    InterfacesCollected,
}

impl DiagnosticStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Unreachable | Self::SnmpUnreachable | Self::InterfacesCollected
        )
    }

    /// Whether a run may move from `self` to `next`.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::IcmpProbed)
                | (Self::IcmpProbed, Self::Unreachable | Self::SnmpSystemQueried)
                | (
                    Self::SnmpSystemQueried,
                    Self::SnmpUnreachable | Self::InterfacesCollected
                )
        )
    }
}

/// Overall device verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum OverallStatus {
    Up,
    Down,
    /// ICMP produced no usable result; SNMP still ran.
    Unknown,
}

/// Failure observed during a run.
///
/// Only [`DiagnosticIssue::ProbeUnreachable`] ends a run early; every other
/// kind is recovered from and the run continues with partial data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DiagnosticIssue {
    /// 100% packet loss or the probe command failed.
    ProbeUnreachable { detail: String },
    /// Probe output did not match the expected format; defaults were used.
    ProbeParseAnomaly { detail: String },
    /// The `ping` command could not be started.
    PingUnavailable { detail: String },
    /// No answer to the SNMP system query.
    SnmpUnreachable { detail: String },
    /// A table walk failed; the merge used whatever data was available.
    SnmpTableIncomplete {
        table: String,
        oid: String,
        detail: String,
    },
}

impl DiagnosticIssue {
    pub fn detail(&self) -> &str {
        match self {
            Self::ProbeUnreachable { detail }
            | Self::ProbeParseAnomaly { detail }
            | Self::PingUnavailable { detail }
            | Self::SnmpUnreachable { detail }
            | Self::SnmpTableIncomplete { detail, .. } => detail,
        }
    }
}

/// Point-in-time health snapshot of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSnapshot {
    pub target: ProbeTarget,
    pub overall_status: OverallStatus,
    pub stage: DiagnosticStage,
    pub ping_metrics: PingMetrics,
    pub snmp_reachable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_info: Option<SnmpSystemInfo>,
    /// First interfaces in walk order, capped for downstream payload size.
    pub interfaces: Vec<InterfaceRecord>,
    /// Number of interfaces before capping.
    pub interface_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
    pub collected_at: DateTime<Utc>,
}

impl DiagnosticSnapshot {
    /// Interfaces that are administratively up but operationally down.
    pub fn link_faults(&self) -> impl Iterator<Item = &InterfaceRecord> {
        self.interfaces.iter().filter(|i| i.is_link_fault())
    }
}

/// Result of an SNMP-only collection (no ICMP, no capping).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnmpReport {
    pub snmp_reachable: bool,
    pub system_info: SnmpSystemInfo,
    pub interfaces: Vec<InterfaceRecord>,
    pub interface_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}
