use std::process::{ExitStatus, Stdio};
use async_trait::async_trait;
use tokio::process::Command;
use crate::command::ColmapCommand;
use crate::error::Result;
use crate::ReconstructionError;

/// Outcome of one finished external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl StepStatus {
    pub fn succeeded() -> Self {
        Self { success: true, code: Some(0) }
    }

    pub fn failed(code: Option<i32>) -> Self {
        Self { success: false, code }
    }
}

impl From<ExitStatus> for StepStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion. Only a failure to start the process is an error;
    /// an unsuccessful exit is reported through the returned status.
    async fn run(&self, command: &ColmapCommand) -> Result<StepStatus>;
}

/// Spawns COLMAP as a child process, inheriting stdio so its progress output stays visible.
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ColmapCommand) -> Result<StepStatus> {
        let status = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| ReconstructionError::Spawn {
                command: command.to_string(),
                source,
            })?;
        Ok(status.into())
    }
}

/// Reports every command as successful without spawning anything.
#[derive(Debug, Default, Clone)]
pub struct DryRunRunner;

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, _command: &ColmapCommand) -> Result<StepStatus> {
        Ok(StepStatus::succeeded())
    }
}
