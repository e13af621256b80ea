//! Application configuration structures.

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collector::DiagnosticConfig;

use super::validation::{ConfigError, expand_env_vars};

// =============================================================================
// Server Configuration
// =============================================================================

/// Web server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 8080).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

// =============================================================================
// Auth Configuration
// =============================================================================

/// HTTP basic auth credentials for the probe endpoints.
///
/// Both fields support `${VAR}` and `${VAR:-default}` expansion.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Web server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Basic auth for probe endpoints; disabled when absent.
    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// Probe programs, timeouts and snapshot limits.
    #[serde(default)]
    pub probe: DiagnosticConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file and expand `${VAR}` credentials.
    ///
    /// The result is not validated: apply command-line overrides first, then
    /// call [`AppConfig::validate`].
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.expand_secrets();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    fn expand_secrets(&mut self) {
        if let Some(auth) = self.auth.as_mut() {
            auth.username = expand_env_vars(&auth.username);
            auth.password = expand_env_vars(&auth.password);
        }
        self.probe.snmp.community = expand_env_vars(&self.probe.snmp.community);
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::invalid(
                "server.bind",
                format!("'{}' is not an IP address", self.server.bind),
            )
        })?;
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be non-zero"));
        }

        if let Some(auth) = &self.auth {
            if auth.username.is_empty() {
                return Err(ConfigError::invalid("auth.username", "must be non-empty"));
            }
            if auth.password.is_empty() {
                return Err(ConfigError::invalid("auth.password", "must be non-empty"));
            }
        }

        let ping = &self.probe.ping;
        if ping.program.trim().is_empty() {
            return Err(ConfigError::invalid("probe.ping.program", "must be set"));
        }
        if ping.count == 0 {
            return Err(ConfigError::invalid("probe.ping.count", "must be positive"));
        }
        if ping.timeout.is_zero() {
            return Err(ConfigError::invalid("probe.ping.timeout", "must be non-zero"));
        }

        let snmp = &self.probe.snmp;
        if snmp.program.trim().is_empty() {
            return Err(ConfigError::invalid("probe.snmp.program", "must be set"));
        }
        if snmp.timeout.is_zero() {
            return Err(ConfigError::invalid("probe.snmp.timeout", "must be non-zero"));
        }
        crate::collector::validate_community(&snmp.community)
            .map_err(|e| ConfigError::invalid("probe.snmp.community", e.to_string()))?;

        if self.probe.interface_limit == 0 {
            return Err(ConfigError::invalid(
                "probe.interface_limit",
                "must be positive",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.auth.is_none());
        assert_eq!(config.probe.interface_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_port() {
        let config = AppConfig {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 0,
            },
            ..AppConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_bind_address() {
        let config = AppConfig {
            server: ServerConfig {
                bind: "not-an-ip".to_string(),
                port: 8080,
            },
            ..AppConfig::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("invalid server.bind")
        );
    }

    #[test]
    fn test_config_validation_probe_limits() {
        let mut config = AppConfig::default();
        config.probe.interface_limit = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.probe.ping.count = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.probe.snmp.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.probe.snmp.community = "-c".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_auth() {
        let config = AppConfig {
            auth: Some(AuthConfig::new("admin", "")),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_debug_redacts_password() {
        let auth = AuthConfig::new("admin", "hunter2");
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  bind: "127.0.0.1"
  port: 9000
auth:
  username: ops
  password: "${{NETSNAP_TEST_MISSING_PASSWORD:-fallback}}"
probe:
  ping:
    count: 2
    timeout: 5s
  snmp:
    community: lab
    timeout: 3s
  interface_limit: 24
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 9000);

        let auth = config.auth.unwrap();
        assert_eq!(auth.username, "ops");
        assert_eq!(auth.password, "fallback");

        assert_eq!(config.probe.ping.program, "ping");
        assert_eq!(config.probe.ping.count, 2);
        assert_eq!(config.probe.ping.timeout, Duration::from_secs(5));
        assert_eq!(config.probe.snmp.program, "snmpwalk");
        assert_eq!(config.probe.snmp.community, "lab");
        assert_eq!(config.probe.snmp.timeout, Duration::from_secs(3));
        assert_eq!(config.probe.interface_limit, 24);
    }

    #[test]
    fn test_load_empty_sections_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 8181").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 8181);
        assert_eq!(config.probe, DiagnosticConfig::default());
    }

    #[test]
    fn test_load_defers_validation_to_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 0").unwrap();

        let mut config = AppConfig::load(file.path()).unwrap();
        assert!(config.validate().is_err());

        config.server.port = 9000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_expands_community_and_password() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
auth:
  username: admin
  password: "${{NETSNAP_TEST_UNSET_PASSWORD}}"
probe:
  snmp:
    community: "${{NETSNAP_TEST_UNSET_COMMUNITY:-public}}"
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.probe.snmp.community, "public");
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid auth.password: must be non-empty");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map").unwrap();

        let result = AppConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
