//! SNMP v2c access through the net-snmp `snmpwalk` command.

use std::string::FromUtf8Error;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::traits::{ProcessRunner, RunnerError};
use crate::collector::types::{DEFAULT_COMMUNITY, ProbeTarget};

/// sysDescr.0
pub const OID_SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";
/// sysUpTime.0
pub const OID_SYS_UPTIME: &str = "1.3.6.1.2.1.1.3.0";
/// ifTable ifDescr column.
pub const OID_IF_DESCR: &str = "1.3.6.1.2.1.2.2.1.2";
/// ifTable ifAdminStatus column.
pub const OID_IF_ADMIN_STATUS: &str = "1.3.6.1.2.1.2.2.1.7";
/// ifTable ifOperStatus column.
pub const OID_IF_OPER_STATUS: &str = "1.3.6.1.2.1.2.2.1.8";

/// Output flags for single values: quick print, value only.
const OUTPUT_VALUE_ONLY: &str = "qv";
/// Output flags for table walks: quick print, numeric OIDs.
const OUTPUT_NUMERIC: &str = "qn";

/// Agent replies that mean "nothing at this OID" despite a zero exit code.
const EMPTY_REPLIES: [&str; 3] = ["No Such Object", "No Such Instance", "No more variables"];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn default_program() -> String {
    "snmpwalk".to_string()
}

fn default_community() -> String {
    DEFAULT_COMMUNITY.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Errors from a single SNMP query.
#[derive(Debug, Error)]
pub enum SnmpError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("{program} exited with code {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("response is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),
}

/// Configuration for SNMP queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpConfig {
    /// Program to execute (default: "snmpwalk").
    #[serde(default = "default_program")]
    pub program: String,
    /// Community used when a request does not name one (default: "public").
    #[serde(default = "default_community")]
    pub community: String,
    /// Deadline for each query (default: 10s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            community: default_community(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SnmpConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }
}

/// System group values of an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnmpSystemInfo {
    /// Whether the agent answered the sysDescr query.
    pub reachable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_descr: Option<String>,
    /// sysUpTime as printed by the agent (timeticks text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_uptime_raw: Option<String>,
}

/// SNMP v2c client driving an external `snmpwalk`.
pub struct SnmpClient {
    config: SnmpConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl SnmpClient {
    pub fn new(config: SnmpConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &SnmpConfig {
        &self.config
    }

    /// Fetch a single value (e.g. `sysDescr.0`).
    ///
    /// Returns an empty string when the agent has nothing at `oid`.
    pub async fn get_value(&self, target: &ProbeTarget, oid: &str) -> Result<String, SnmpError> {
        let value = self.execute(target, OUTPUT_VALUE_ONLY, oid).await?;
        if EMPTY_REPLIES.iter().any(|reply| value.starts_with(reply)) {
            return Ok(String::new());
        }
        Ok(value)
    }

    /// Bulk-walk the subtree under `oid`, returning `OID = value` lines.
    pub async fn walk_table(&self, target: &ProbeTarget, oid: &str) -> Result<String, SnmpError> {
        self.execute(target, OUTPUT_NUMERIC, oid).await
    }

    fn args(target: &ProbeTarget, output: &str, oid: &str) -> Vec<String> {
        vec![
            "-v2c".to_string(),
            "-c".to_string(),
            target.snmp_community.clone(),
            "-O".to_string(),
            output.to_string(),
            target.address.clone(),
            oid.to_string(),
        ]
    }

    async fn execute(
        &self,
        target: &ProbeTarget,
        output: &str,
        oid: &str,
    ) -> Result<String, SnmpError> {
        let args = Self::args(target, output, oid);
        let result = self
            .runner
            .run(&self.config.program, &args, self.config.timeout)
            .await?;

        if !result.is_success() {
            return Err(SnmpError::CommandFailed {
                program: self.config.program.clone(),
                code: result.exit_code,
                stderr: result.stderr_lossy(),
            });
        }

        Ok(result.stdout_text()?.trim().to_string())
    }
}

impl std::fmt::Debug for SnmpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnmpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::testing::{Reply, ScriptedRunner};
    use crate::collector::traits::CommandOutput;

    fn client(runner: ScriptedRunner) -> SnmpClient {
        SnmpClient::new(SnmpConfig::default(), Arc::new(runner))
    }

    #[test]
    fn test_snmp_config_defaults() {
        let config = SnmpConfig::default();
        assert_eq!(config.program, "snmpwalk");
        assert_eq!(config.community, "public");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_get_value_uses_value_only_output() {
        let runner = ScriptedRunner::new().stdout(OID_SYS_DESCR, "Linux router 5.15\n");
        let snmp = client(runner.clone());
        let target = ProbeTarget::new("10.0.0.1", "private");

        let value = snmp.get_value(&target, OID_SYS_DESCR).await.unwrap();
        assert_eq!(value, "Linux router 5.15");
        assert_eq!(
            runner.calls()[0],
            vec![
                "snmpwalk", "-v2c", "-c", "private", "-O", "qv", "10.0.0.1", OID_SYS_DESCR
            ]
        );
    }

    #[tokio::test]
    async fn test_get_value_no_such_object_is_empty() {
        let runner = ScriptedRunner::new().stdout(
            OID_SYS_DESCR,
            "No Such Object available on this agent at this OID\n",
        );
        let value = client(runner)
            .get_value(&ProbeTarget::new("10.0.0.1", "public"), OID_SYS_DESCR)
            .await
            .unwrap();
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_walk_table_uses_numeric_output() {
        let runner =
            ScriptedRunner::new().stdout(OID_IF_DESCR, ".1.3.6.1.2.1.2.2.1.2.1 = \"lo\"\n");
        let snmp = client(runner.clone());

        let raw = snmp
            .walk_table(&ProbeTarget::new("10.0.0.1", "public"), OID_IF_DESCR)
            .await
            .unwrap();
        assert_eq!(raw, ".1.3.6.1.2.1.2.2.1.2.1 = \"lo\"");
        assert_eq!(runner.calls()[0][5], "qn");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_command_failed() {
        let runner = ScriptedRunner::new().on(
            OID_SYS_DESCR,
            Reply::Output(CommandOutput::failure(1, "Timeout: No Response from 10.0.0.9\n")),
        );
        let err = client(runner)
            .get_value(&ProbeTarget::new("10.0.0.9", "public"), OID_SYS_DESCR)
            .await
            .unwrap_err();
        match err {
            SnmpError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "Timeout: No Response from 10.0.0.9");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_runner_error() {
        let runner = ScriptedRunner::new().on(OID_IF_DESCR, Reply::Timeout);
        let err = client(runner)
            .walk_table(&ProbeTarget::new("10.0.0.1", "public"), OID_IF_DESCR)
            .await
            .unwrap_err();
        assert!(matches!(err, SnmpError::Runner(RunnerError::Timeout { .. })));
    }

    #[test]
    fn test_system_info_serializes_camel_case() {
        let info = SnmpSystemInfo {
            reachable: true,
            sys_descr: Some("Cisco IOS".to_string()),
            sys_uptime_raw: Some("12345678".to_string()),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["sysDescr"], "Cisco IOS");
        assert_eq!(json["sysUptimeRaw"], "12345678");
    }
}
