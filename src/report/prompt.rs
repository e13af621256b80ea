//! Troubleshooting prompt for an LLM assistant.

use serde::Serialize;

use crate::collector::DiagnosticSnapshot;

const SYSTEM_PROMPT: &str = "\
You are a senior network support engineer working as an automated troubleshooting agent.
Analyze the device snapshot (ICMP metrics, SNMP system info and interface table) and \
write a concise, actionable summary.

Reading the data:
- Any packet loss above 0% is a problem.
- Jitter above 20 ms points to congestion or bad cabling.
- SNMP unreachable while ICMP is up points to SNMP configuration
  (community string or ACL).
- An interface that is admin UP but oper DOWN points to a physical layer
  fault (unplugged or failed link).

Rules:
1. Open with a health verdict: Healthy, Warning or Critical.
2. Assess ICMP quality (latency, jitter, loss).
3. List interfaces with problems.
4. Suggest 2-3 concrete next steps (CLI commands or physical checks).
5. Do not invent facts that are not in the snapshot.";

/// Messages for a chat-style LLM request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TroubleshootingPrompt {
    pub system: String,
    pub user: String,
    /// Short verdict for snapshots that need no analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_failure: Option<String>,
}

/// Summary for a device that could not be reached at all.
///
/// Returns `None` when the snapshot carries no terminal error.
pub fn critical_failure(snapshot: &DiagnosticSnapshot) -> Option<String> {
    snapshot.error.as_ref().filter(|_| snapshot.ping_metrics.is_down()).map(|error| {
        format!(
            "CRITICAL FAILURE: {error}\n\
             Suggestion: check physical power and the main uplink cabling."
        )
    })
}

/// Build the system and user messages for `snapshot`.
pub fn build_prompt(snapshot: &DiagnosticSnapshot) -> serde_json::Result<TroubleshootingPrompt> {
    let snapshot_json = serde_json::to_string_pretty(snapshot)?;
    Ok(TroubleshootingPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "Device snapshot for {}:\n\n{snapshot_json}",
            snapshot.target.address
        ),
        critical_failure: critical_failure(snapshot),
    })
}
