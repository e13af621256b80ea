//! Configuration module for netsnap.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Server settings (port, bind address)
//! - Optional basic auth credentials
//! - Probe settings (ping/snmpwalk programs, timeouts, interface limit)

mod app;
mod validation;

pub use app::{AppConfig, AuthConfig, ServerConfig};
pub use validation::{ConfigError, expand_env_vars, parse_duration};
