//! Scripted process runner for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::collector::traits::{CommandOutput, ProcessRunner, RunnerError};

/// Canned response for one command.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Output(CommandOutput),
    Timeout,
}

/// Answers commands by their last argument (the ping address or SNMP OID).
///
/// Unscripted commands fail as if the program were not installed.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedRunner {
    replies: HashMap<String, Reply>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, last_arg: impl Into<String>, reply: Reply) -> Self {
        self.replies.insert(last_arg.into(), reply);
        self
    }

    pub(crate) fn stdout(self, last_arg: impl Into<String>, text: impl Into<String>) -> Self {
        self.on(last_arg, Reply::Output(CommandOutput::success(text)))
    }

    /// Every invocation so far as `[program, args...]`.
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of invocations of `program`.
    pub(crate) fn count(&self, program: &str) -> usize {
        self.calls().iter().filter(|c| c[0] == program).count()
    }
}

#[async_trait::async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RunnerError> {
        if let Ok(mut calls) = self.calls.lock() {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().cloned());
            calls.push(call);
        }

        let key = args.last().cloned().unwrap_or_default();
        match self.replies.get(&key) {
            Some(Reply::Output(output)) => Ok(output.clone()),
            Some(Reply::Timeout) => Err(RunnerError::Timeout {
                program: program.to_string(),
                timeout,
            }),
            None => Err(RunnerError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not scripted"),
            }),
        }
    }
}
