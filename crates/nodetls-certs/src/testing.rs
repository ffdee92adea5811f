//! In-memory executor for unit tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::CertsError;
use crate::executor::{CommandOutput, RemoteExecutor};

/// Records every command and upload, answering commands from a script of
/// substring rules. Later rules take precedence; unmatched commands
/// succeed with empty output.
pub struct ScriptedExecutor {
    host: String,
    rules: RefCell<Vec<(String, CommandOutput)>>,
    commands: RefCell<Vec<String>>,
    uploads: RefCell<Vec<(PathBuf, String)>>,
}

impl ScriptedExecutor {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            rules: RefCell::new(Vec::new()),
            commands: RefCell::new(Vec::new()),
            uploads: RefCell::new(Vec::new()),
        }
    }

    pub fn respond(&self, pattern: &str, output: CommandOutput) {
        self.rules.borrow_mut().push((pattern.to_string(), output));
    }

    pub fn stdout_for(&self, pattern: &str, stdout: &str) {
        self.respond(
            pattern,
            CommandOutput {
                stdout: stdout.to_string(),
                ..CommandOutput::default()
            },
        );
    }

    pub fn fail_on(&self, pattern: &str, exit_code: i32) {
        self.respond(
            pattern,
            CommandOutput {
                exit_code,
                stderr: format!("scripted failure for {pattern}"),
                ..CommandOutput::default()
            },
        );
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        self.uploads.borrow().clone()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.commands.borrow().iter().any(|c| c.contains(needle))
    }
}

impl RemoteExecutor for ScriptedExecutor {
    fn host(&self) -> &str {
        &self.host
    }

    fn execute_raw(&self, command: &str) -> Result<CommandOutput, CertsError> {
        self.commands.borrow_mut().push(command.to_string());
        let rules = self.rules.borrow();
        Ok(rules
            .iter()
            .rev()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<(), CertsError> {
        self.uploads
            .borrow_mut()
            .push((local.to_path_buf(), remote.to_string()));
        Ok(())
    }
}
