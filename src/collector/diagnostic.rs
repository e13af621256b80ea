//! Diagnostic collector: ICMP probe, SNMP system query and interface table
//! merge, sequenced into a single snapshot.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::collector::ping::{PingConfig, PingMetrics, PingOutcome, PingProbe, PingStatus};
use crate::collector::snmp::{
    IndexedValues, InterfaceRecord, OID_IF_ADMIN_STATUS, OID_IF_DESCR, OID_IF_OPER_STATUS,
    OID_SYS_DESCR, OID_SYS_UPTIME, SnmpClient, SnmpConfig, SnmpSystemInfo, index_values,
    merge_interfaces,
};
use crate::collector::traits::ProcessRunner;
use crate::collector::types::{
    DiagnosticIssue, DiagnosticSnapshot, DiagnosticStage, OverallStatus, ProbeTarget, SnmpReport,
};

/// Default cap on interfaces carried in a snapshot.
pub const DEFAULT_INTERFACE_LIMIT: usize = 10;

/// Snapshot error when ICMP reports the device down.
pub const ICMP_UNREACHABLE_ERROR: &str = "Device completely unreachable via ICMP.";

/// Error when the agent does not answer the system query.
pub const SNMP_NO_RESPONSE_ERROR: &str = "No SNMP response";

fn default_interface_limit() -> usize {
    DEFAULT_INTERFACE_LIMIT
}

/// Probe settings for a diagnostic run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticConfig {
    #[serde(default)]
    pub ping: PingConfig,
    #[serde(default)]
    pub snmp: SnmpConfig,
    /// Maximum interfaces listed in a snapshot (default: 10).
    #[serde(default = "default_interface_limit")]
    pub interface_limit: usize,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            ping: PingConfig::default(),
            snmp: SnmpConfig::default(),
            interface_limit: DEFAULT_INTERFACE_LIMIT,
        }
    }
}

/// Interface table walks, in query order.
const INTERFACE_TABLES: [(&str, &str); 3] = [
    ("ifDescr", OID_IF_DESCR),
    ("ifAdminStatus", OID_IF_ADMIN_STATUS),
    ("ifOperStatus", OID_IF_OPER_STATUS),
];

/// Collects device health snapshots.
///
/// Holds no per-run state; one instance can serve concurrent runs against
/// different targets.
pub struct DiagnosticCollector {
    ping: PingProbe,
    snmp: SnmpClient,
    interface_limit: usize,
}

impl DiagnosticCollector {
    pub fn new(config: DiagnosticConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            ping: PingProbe::new(config.ping, Arc::clone(&runner)),
            snmp: SnmpClient::new(config.snmp, runner),
            interface_limit: config.interface_limit,
        }
    }

    /// Community applied when a request does not supply one.
    pub fn default_community(&self) -> &str {
        &self.snmp.config().community
    }

    pub fn interface_limit(&self) -> usize {
        self.interface_limit
    }

    /// ICMP probe only.
    pub async fn ping(&self, target: &ProbeTarget) -> PingMetrics {
        self.ping.probe(&target.address).await.metrics
    }

    /// SNMP system query and full interface table, without ICMP or capping.
    pub async fn collect_snmp(&self, target: &ProbeTarget) -> SnmpReport {
        let mut issues = Vec::new();
        let system_info = self.query_system(target, &mut issues).await;
        let interfaces = if system_info.reachable {
            self.collect_interfaces(target, &mut issues).await
        } else {
            Vec::new()
        };
        let reachable = system_info.reachable;

        SnmpReport {
            snmp_reachable: reachable,
            system_info,
            interface_count: interfaces.len(),
            interfaces,
            error: (!reachable).then(|| SNMP_NO_RESPONSE_ERROR.to_string()),
            issues,
        }
    }

    /// Full diagnostic run.
    ///
    /// Never fails: every failure mode is folded into the snapshot's stage,
    /// `error` and `issues`.
    pub async fn collect_diagnostics(&self, target: &ProbeTarget) -> DiagnosticSnapshot {
        tracing::info!(target_addr = %target.address, "Collecting diagnostics");

        let PingOutcome { metrics, anomalies } = self.ping.probe(&target.address).await;
        let mut snapshot = DiagnosticSnapshot {
            target: target.clone(),
            overall_status: OverallStatus::Up,
            stage: DiagnosticStage::Init,
            ping_metrics: metrics,
            snmp_reachable: false,
            system_info: None,
            interfaces: Vec::new(),
            interface_count: 0,
            note: None,
            error: None,
            issues: anomalies
                .iter()
                .map(|a| DiagnosticIssue::ProbeParseAnomaly {
                    detail: a.to_string(),
                })
                .collect(),
            collected_at: Utc::now(),
        };
        advance(&mut snapshot, DiagnosticStage::IcmpProbed);

        let ping_error = snapshot.ping_metrics.error_message.clone();
        match snapshot.ping_metrics.status {
            PingStatus::Down => {
                let detail = ping_error.unwrap_or_else(|| "100% packet loss".to_string());
                snapshot.issues.push(DiagnosticIssue::ProbeUnreachable { detail });

                tracing::warn!(target_addr = %target.address, "Device unreachable, skipping SNMP");
                snapshot.overall_status = OverallStatus::Down;
                snapshot.error = Some(ICMP_UNREACHABLE_ERROR.to_string());
                advance(&mut snapshot, DiagnosticStage::Unreachable);
                return snapshot;
            }
            PingStatus::Unknown => {
                // Undecodable output already left an anomaly behind.
                if anomalies.is_empty() {
                    let detail = ping_error.unwrap_or_else(|| "ping did not run".to_string());
                    snapshot.issues.push(DiagnosticIssue::PingUnavailable { detail });
                }
                snapshot.overall_status = OverallStatus::Unknown;
            }
            PingStatus::Up => {}
        }

        let mut issues = std::mem::take(&mut snapshot.issues);
        let system_info = self.query_system(target, &mut issues).await;
        snapshot.snmp_reachable = system_info.reachable;
        snapshot.system_info = Some(system_info);
        advance(&mut snapshot, DiagnosticStage::SnmpSystemQueried);
        if !snapshot.snmp_reachable {
            snapshot.issues = issues;
            advance(&mut snapshot, DiagnosticStage::SnmpUnreachable);
            return snapshot;
        }

        let interfaces = self.collect_interfaces(target, &mut issues).await;
        snapshot.interface_count = interfaces.len();
        snapshot.interfaces = interfaces;
        if snapshot.interface_count > self.interface_limit {
            snapshot.interfaces.truncate(self.interface_limit);
            snapshot.note = Some(format!(
                "Showing first {} of {} interfaces",
                self.interface_limit, snapshot.interface_count
            ));
        }
        snapshot.issues = issues;
        advance(&mut snapshot, DiagnosticStage::InterfacesCollected);
        snapshot
    }

    /// sysDescr and sysUpTime. An empty or failed sysDescr means the agent
    /// is unreachable and no further SNMP queries are worth issuing.
    async fn query_system(
        &self,
        target: &ProbeTarget,
        issues: &mut Vec<DiagnosticIssue>,
    ) -> SnmpSystemInfo {
        let Some(sys_descr) = self.system_value(target, "sysDescr", OID_SYS_DESCR).await else {
            tracing::warn!(target_addr = %target.address, "No SNMP response");
            issues.push(DiagnosticIssue::SnmpUnreachable {
                detail: SNMP_NO_RESPONSE_ERROR.to_string(),
            });
            return SnmpSystemInfo::default();
        };

        SnmpSystemInfo {
            reachable: true,
            sys_descr: Some(sys_descr),
            sys_uptime_raw: self.system_value(target, "sysUpTime", OID_SYS_UPTIME).await,
        }
    }

    async fn system_value(&self, target: &ProbeTarget, name: &str, oid: &str) -> Option<String> {
        match self.snmp.get_value(target, oid).await {
            Ok(value) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(
                    target_addr = %target.address,
                    object = name,
                    error = %e,
                    "System query failed"
                );
                None
            }
        }
    }

    /// Walk the three interface tables and merge them. A failed walk
    /// contributes an empty mapping and an issue.
    async fn collect_interfaces(
        &self,
        target: &ProbeTarget,
        issues: &mut Vec<DiagnosticIssue>,
    ) -> Vec<InterfaceRecord> {
        let mut tables: Vec<IndexedValues> = Vec::with_capacity(INTERFACE_TABLES.len());
        for (table, oid) in INTERFACE_TABLES {
            let values = match self.snmp.walk_table(target, oid).await {
                Ok(raw) => index_values(&raw),
                Err(e) => {
                    tracing::warn!(
                        target_addr = %target.address,
                        table,
                        error = %e,
                        "Interface table walk failed"
                    );
                    issues.push(DiagnosticIssue::SnmpTableIncomplete {
                        table: table.to_string(),
                        oid: oid.to_string(),
                        detail: e.to_string(),
                    });
                    IndexedValues::new()
                }
            };
            tables.push(values);
        }
        merge_interfaces(&tables[0], &tables[1], &tables[2])
    }
}

fn advance(snapshot: &mut DiagnosticSnapshot, next: DiagnosticStage) {
    debug_assert!(
        snapshot.stage.can_advance_to(next),
        "invalid stage transition {} -> {next}",
        snapshot.stage
    );
    tracing::debug!(
        target_addr = %snapshot.target.address,
        from = %snapshot.stage,
        to = %next,
        "Diagnostic stage advanced"
    );
    snapshot.stage = next;

    if next.is_terminal() {
        tracing::info!(
            target_addr = %snapshot.target.address,
            stage = %next,
            interfaces = snapshot.interface_count,
            issues = snapshot.issues.len(),
            "Diagnostics collected"
        );
    }
}

impl std::fmt::Debug for DiagnosticCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticCollector")
            .field("ping", &self.ping)
            .field("snmp", &self.snmp)
            .field("interface_limit", &self.interface_limit)
            .finish()
    }
}
