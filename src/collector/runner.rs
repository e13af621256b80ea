//! Process runner backed by `tokio::process`.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::collector::traits::{CommandOutput, ProcessRunner, RunnerError};

/// Runs probe programs as child processes of this service.
///
/// The child is killed if the deadline elapses before it exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        deadline: Duration,
    ) -> Result<CommandOutput, RunnerError> {
        tracing::debug!(program, ?args, timeout_ms = deadline.as_millis(), "Spawning probe");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        match timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                exit_code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            Ok(Err(source)) => Err(RunnerError::Io {
                program: program.to_string(),
                source,
            }),
            Err(_) => Err(RunnerError::Timeout {
                program: program.to_string(),
                timeout: deadline,
            }),
        }
    }
}
