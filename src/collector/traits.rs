//! Core collector traits and types.

use std::net::IpAddr;
use std::string::FromUtf8Error;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while running an external probe command.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The program could not be started (missing binary, permissions).
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program was started but waiting on it failed.
    #[error("failed to wait on '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program did not finish before the deadline and was killed.
    #[error("'{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Captured result of a finished external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Raw standard error.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Create a successful output carrying the given stdout text.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into().into_bytes(),
            stderr: Vec::new(),
        }
    }

    /// Create a failed output with the given exit code and stderr text.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: Vec::new(),
            stderr: stderr.into().into_bytes(),
        }
    }

    /// Whether the command exited with status zero.
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Standard output decoded as UTF-8.
    pub fn stdout_text(&self) -> Result<String, FromUtf8Error> {
        String::from_utf8(self.stdout.clone())
    }

    /// Standard output followed by standard error, decoded as UTF-8.
    pub fn combined_text(&self) -> Result<String, FromUtf8Error> {
        let mut bytes = Vec::with_capacity(self.stdout.len() + self.stderr.len());
        bytes.extend_from_slice(&self.stdout);
        bytes.extend_from_slice(&self.stderr);
        String::from_utf8(bytes)
    }

    /// Lossy, trimmed standard error for log and error messages.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Executes external probe programs (`ping`, `snmpwalk`).
///
/// Implementations must be independent per call: no shared child handles, so
/// concurrent diagnostic runs against different targets never interfere.
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync + 'static {
    /// Run `program` with `args`, waiting at most `timeout` for it to exit.
    ///
    /// A non-zero exit is not an error here; it is reported through
    /// [`CommandOutput::exit_code`] so callers can decide what it means.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RunnerError>;
}

/// Target address validation error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetValidationError {
    #[error("IP address required")]
    EmptyAddress,

    #[error("invalid target address '{0}': expected an IP address or hostname")]
    InvalidAddress(String),

    #[error("invalid SNMP community string")]
    InvalidCommunity,
}

/// Validate that an address is an IP literal or a plain hostname.
///
/// Rejects anything that could be interpreted as a command-line flag by the
/// probe programs.
pub fn validate_target_address(address: &str) -> Result<(), TargetValidationError> {
    if address.is_empty() {
        return Err(TargetValidationError::EmptyAddress);
    }

    if address.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let valid_hostname = !address.starts_with('-')
        && address.len() <= 253
        && address
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

    if valid_hostname {
        Ok(())
    } else {
        Err(TargetValidationError::InvalidAddress(address.to_string()))
    }
}

/// Validate an SNMP v2c community string.
pub fn validate_community(community: &str) -> Result<(), TargetValidationError> {
    if community.is_empty() || community.starts_with('-') || community.contains('\0') {
        return Err(TargetValidationError::InvalidCommunity);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_target_address_ip() {
        assert!(validate_target_address("192.168.1.1").is_ok());
        assert!(validate_target_address("::1").is_ok());
    }

    #[test]
    fn test_validate_target_address_hostname() {
        assert!(validate_target_address("core-sw01.example.net").is_ok());
    }

    #[test]
    fn test_validate_target_address_rejects_flags() {
        assert_eq!(
            validate_target_address("-f"),
            Err(TargetValidationError::InvalidAddress("-f".to_string()))
        );
        assert!(validate_target_address("10.0.0.1; reboot").is_err());
        assert_eq!(
            validate_target_address(""),
            Err(TargetValidationError::EmptyAddress)
        );
    }

    #[test]
    fn test_validate_community() {
        assert!(validate_community("public").is_ok());
        assert!(validate_community("").is_err());
        assert!(validate_community("-v3").is_err());
    }

    #[test]
    fn test_command_output_combined_text() {
        let output = CommandOutput {
            exit_code: Some(1),
            stdout: b"PING 10.0.0.1\n".to_vec(),
            stderr: b"ping: unknown host\n".to_vec(),
        };
        assert!(!output.is_success());
        assert_eq!(
            output.combined_text().unwrap(),
            "PING 10.0.0.1\nping: unknown host\n"
        );
        assert_eq!(output.stderr_lossy(), "ping: unknown host");
    }
}
