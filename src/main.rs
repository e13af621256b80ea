//! netsnap Binary Entry Point
//!
//! Runs the HTTP diagnostic service or a one-off diagnosis from the shell.
//! Core functionality is provided by the `netsnap` library crate.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use netsnap::{
    collector::{DiagnosticCollector, ProbeTarget, SystemRunner},
    config::{AppConfig, parse_duration},
    report::{build_prompt, render_text},
    server::{AppState, create_router},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// netsnap - network device health snapshots over ICMP and SNMP
#[derive(Parser, Debug)]
#[command(name = "netsnap", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults are used when it does not exist)
    #[arg(
        short,
        long,
        default_value = "configs/config.yaml",
        env = "NETSNAP_CONFIG",
        global = true
    )]
    config: String,

    /// Per-command probe timeout, e.g. "5s" (overrides config file)
    #[arg(long, env = "NETSNAP_PROBE_TIMEOUT", global = true, value_parser = parse_duration)]
    probe_timeout: Option<Duration>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Server bind address (overrides config file)
        #[arg(long, env = "NETSNAP_SERVER_BIND")]
        bind: Option<String>,

        /// Server port (overrides config file)
        #[arg(long, env = "NETSNAP_SERVER_PORT")]
        port: Option<u16>,
    },

    /// Collect a snapshot of one device and print it
    Diagnose {
        /// Device IP address or hostname
        address: String,

        /// SNMP v2c community (overrides config file)
        #[arg(long, env = "NETSNAP_COMMUNITY")]
        community: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Prompt,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,netsnap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    tracing::debug!("Loading configuration from: {}", cli.config);
    let mut config = AppConfig::load_or_default(&cli.config)?;
    apply_overrides(&mut config, &cli);
    config.validate()?;

    match cli.command {
        Command::Serve { .. } => serve(config).await,
        Command::Diagnose { address, format, .. } => diagnose(config, address, format).await,
    }
}

/// Apply CLI/env overrides (CLI > ENV > config file).
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(timeout) = cli.probe_timeout {
        config.probe.ping.timeout = timeout;
        config.probe.snmp.timeout = timeout;
    }

    match &cli.command {
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
        Command::Diagnose { community, .. } => {
            if let Some(community) = community {
                config.probe.snmp.community = community.clone();
            }
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("netsnap - network device diagnostics");
    tracing::info!(
        "Server: {}:{}, auth: {}, interface limit: {}",
        config.server.bind,
        config.server.port,
        if config.auth.is_some() { "basic" } else { "disabled" },
        config.probe.interface_limit,
    );

    let app_state = AppState {
        collector: DiagnosticCollector::new(config.probe, Arc::new(SystemRunner::new())),
        auth: config.auth,
    };

    // Build Axum router
    let app = create_router(app_state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    tracing::info!("Web server listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn diagnose(
    config: AppConfig,
    address: String,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = ProbeTarget::new(address, config.probe.snmp.community.clone());
    target.validate()?;

    let collector = DiagnosticCollector::new(config.probe, Arc::new(SystemRunner::new()));
    let snapshot = collector.collect_diagnostics(&target).await;

    match format {
        OutputFormat::Text => print!("{}", render_text(&snapshot)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Prompt => {
            let prompt = build_prompt(&snapshot)?;
            match prompt.critical_failure {
                Some(summary) => println!("{summary}"),
                None => println!("{}\n\n{}", prompt.system, prompt.user),
            }
        }
    }
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("netsnap").chain(args.split_whitespace()))
    }

    #[test]
    fn test_timeout_flag_sets_both_commands() {
        let cli = parse("--probe-timeout 3s diagnose 192.0.2.1").unwrap();
        assert_eq!(cli.probe_timeout, Some(Duration::from_secs(3)));

        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.probe.ping.timeout, Duration::from_secs(3));
        assert_eq!(config.probe.snmp.timeout, Duration::from_secs(3));

        assert!(parse("--probe-timeout 0s serve").is_err());
    }

    #[test]
    fn test_port_override_repairs_file_value() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let cli = parse("serve --port 9000").unwrap();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.server.port, 9000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_community_override() {
        let cli = parse("diagnose 192.0.2.1 --community lab-ro").unwrap();
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.probe.snmp.community, "lab-ro");
    }
}
