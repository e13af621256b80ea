//! Plain-text rendering of a snapshot for terminals.

use std::fmt::Write;

use crate::collector::{DiagnosticSnapshot, PingMetrics};

/// Render `snapshot` as a human-readable report.
pub fn render_text(snapshot: &DiagnosticSnapshot) -> String {
    let mut out = String::new();
    // Writing to a String never fails.
    let _ = write_report(&mut out, snapshot);
    out
}

fn write_report(out: &mut String, snapshot: &DiagnosticSnapshot) -> std::fmt::Result {
    writeln!(out, "Device:     {}", snapshot.target.address)?;
    writeln!(
        out,
        "Status:     {} ({})",
        snapshot.overall_status, snapshot.stage
    )?;
    writeln!(
        out,
        "Collected:  {}",
        snapshot.collected_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out)?;

    write_ping(out, &snapshot.ping_metrics)?;

    if let Some(error) = &snapshot.error {
        writeln!(out)?;
        writeln!(out, "Error: {error}")?;
    }

    if let Some(info) = &snapshot.system_info {
        writeln!(out)?;
        writeln!(out, "SNMP")?;
        writeln!(
            out,
            "  Reachable:    {}",
            if snapshot.snmp_reachable { "yes" } else { "no" }
        )?;
        writeln!(
            out,
            "  Description:  {}",
            info.sys_descr.as_deref().unwrap_or("N/A")
        )?;
        writeln!(
            out,
            "  Uptime:       {}",
            info.sys_uptime_raw.as_deref().unwrap_or("N/A")
        )?;
    }

    if snapshot.snmp_reachable {
        writeln!(out)?;
        writeln!(out, "Interfaces ({} total)", snapshot.interface_count)?;
        let width = snapshot
            .interfaces
            .iter()
            .map(|i| i.name.len())
            .max()
            .unwrap_or(0)
            .max(4);
        writeln!(out, "  {:>6}  {:<width$}  {:<12}  {:<12}", "INDEX", "NAME", "ADMIN", "OPER")?;
        for iface in &snapshot.interfaces {
            let flag = if iface.is_link_fault() { "  <- link down" } else { "" };
            writeln!(
                out,
                "  {:>6}  {:<width$}  {:<12}  {:<12}{flag}",
                iface.index.as_str(),
                iface.name,
                iface.admin_status.to_string(),
                iface.oper_status.to_string(),
            )?;
        }
        if let Some(note) = &snapshot.note {
            writeln!(out, "  ({note})")?;
        }
    }

    if !snapshot.issues.is_empty() {
        writeln!(out)?;
        writeln!(out, "Issues")?;
        for issue in &snapshot.issues {
            writeln!(out, "  - {}", issue.detail())?;
        }
    }

    Ok(())
}

fn write_ping(out: &mut String, metrics: &PingMetrics) -> std::fmt::Result {
    writeln!(out, "ICMP")?;
    writeln!(out, "  Status:       {}", metrics.status)?;
    writeln!(out, "  Packet loss:  {}%", metrics.packet_loss_pct)?;
    if !metrics.is_down() {
        writeln!(
            out,
            "  Latency:      min {} / avg {} / max {} ms",
            metrics.latency_min_ms, metrics.latency_avg_ms, metrics.latency_max_ms
        )?;
        writeln!(out, "  Jitter:       {} ms", metrics.jitter_ms)?;
    }
    if let Some(message) = &metrics.error_message {
        writeln!(out, "  Message:      {message}")?;
    }
    Ok(())
}
