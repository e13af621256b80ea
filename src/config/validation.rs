//! Configuration errors and value helpers.
//!
//! Credentials in the YAML file (`auth.*`, the SNMP community) may
//! reference the environment with `${VAR}` or `${VAR:-default}`; command
//! timeouts on the command line use humantime syntax (`500ms`, `5s`, `1m`).

use std::sync::OnceLock;
use std::time::Duration;

use regex::{Captures, Regex};
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field holds a value the collector cannot run with.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Parse a command timeout such as `5s` or `1500ms`.
///
/// A zero duration is rejected: every `ping` and `snmpwalk` run needs a deadline.
///
/// # Examples
///
/// ```
/// use netsnap::config::parse_duration;
///
/// assert_eq!(parse_duration("5s").unwrap().as_secs(), 5);
/// assert_eq!(parse_duration("1500ms").unwrap().as_millis(), 1500);
/// assert!(parse_duration("0s").is_err());
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("duration string is empty".to_string());
    }
    let duration = humantime::parse_duration(s).map_err(|e| e.to_string())?;
    if duration.is_zero() {
        return Err(format!("'{s}' is zero; a command timeout must be positive"));
    }
    Ok(duration)
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("placeholder pattern is valid")
    })
}

/// Substitute `${VAR}` / `${VAR:-default}` placeholders from the environment.
///
/// An unset variable without a default becomes the empty string, which the
/// credential checks in [`AppConfig::validate`](super::AppConfig::validate)
/// then reject.
pub fn expand_env_vars(input: &str) -> String {
    placeholder()
        .replace_all(input, |caps: &Captures| {
            let fallback = caps.get(2).map_or("", |m| m.as_str());
            std::env::var(&caps[1]).unwrap_or_else(|_| fallback.to_string())
        })
        .into_owned()
}
