//! [`CommandRunner`] implementation backed by [`std::process::Command`].
//!
//! Commands are spawned directly, without a shell, so arguments such as
//! the `i3-msg` payload (which contains `;`) reach the program verbatim.

use crate::command::CommandLine;
use crate::traits::CommandRunner;
use log::debug;
use std::process::{Command, Output, Stdio};

/// Runs commands as child processes of screenorder.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Errors from spawning or running a child process.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to execute `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited unsuccessfully ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("`{command}` printed non-UTF-8 output")]
    NotUtf8 {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

fn spawn(cmd: &CommandLine, capture_stdout: bool) -> Result<Output, RunnerError> {
    debug!("spawning {}", cmd);
    Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| RunnerError::Spawn {
            command: cmd.to_string(),
            source,
        })
}

fn check(cmd: &CommandLine, output: &Output) -> Result<(), RunnerError> {
    if output.status.success() {
        return Ok(());
    }
    Err(RunnerError::Failed {
        command: cmd.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

impl CommandRunner for SystemRunner {
    type Error = RunnerError;

    fn output(&self, cmd: &CommandLine) -> Result<String, Self::Error> {
        let output = spawn(cmd, true)?;
        check(cmd, &output)?;
        String::from_utf8(output.stdout).map_err(|source| RunnerError::NotUtf8 {
            command: cmd.to_string(),
            source,
        })
    }

    fn succeeds(&self, cmd: &CommandLine) -> Result<bool, Self::Error> {
        Ok(spawn(cmd, false)?.status.success())
    }

    fn run(&self, cmd: &CommandLine) -> Result<(), Self::Error> {
        let output = spawn(cmd, false)?;
        check(cmd, &output)
    }
}
