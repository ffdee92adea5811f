//! Command execution against a single target node.
//!
//! SSH sessions and connection pooling live outside this crate. The core
//! only sees a [`RemoteExecutor`] already bound to one node.

use std::path::Path;
use std::process::Command;

use crate::error::CertsError;

/// Captured result of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs shell commands on, and uploads files to, one node.
pub trait RemoteExecutor {
    /// Address of the node this executor is bound to.
    fn host(&self) -> &str;

    /// Run a command and report its exit status without treating a
    /// nonzero exit as an error. Errors only when the command could not
    /// be launched at all.
    fn execute_raw(&self, command: &str) -> Result<CommandOutput, CertsError>;

    /// Copy a file from the controlling machine to `remote` on the node.
    fn upload(&self, local: &Path, remote: &str) -> Result<(), CertsError>;

    /// Run a command, failing with `RemoteCommandFailed` on nonzero exit.
    fn execute(&self, command: &str) -> Result<CommandOutput, CertsError> {
        let output = self.execute_raw(command)?;
        if output.success() {
            Ok(output)
        } else {
            tracing::debug!(
                host = self.host(),
                command,
                exit_code = output.exit_code,
                "Remote command failed"
            );
            Err(CertsError::RemoteCommandFailed {
                host: self.host().to_string(),
                command: command.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// Quote a value for interpolation into a POSIX shell command.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Executor that runs commands on the controlling machine via `sh -c`.
///
/// `host` is the identity reported to the core (used for hostname
/// verification and per-node file names), not a connection target.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    host: String,
}

impl LocalExecutor {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl RemoteExecutor for LocalExecutor {
    fn host(&self) -> &str {
        &self.host
    }

    fn execute_raw(&self, command: &str) -> Result<CommandOutput, CertsError> {
        tracing::trace!(host = %self.host, command, "Executing");
        let output = Command::new("sh").args(["-c", command]).output()?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            // Killed by a signal: no code, report as generic failure
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<(), CertsError> {
        std::fs::copy(local, remote).map_err(|e| CertsError::UploadFailed {
            host: self.host.clone(),
            local: local.to_path_buf(),
            remote: remote.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(host = %self.host, local = %local.display(), remote, "Uploaded");
        Ok(())
    }
}
