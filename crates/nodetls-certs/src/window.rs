//! Scoped write access to a certificate directory on a node.
//!
//! Store files are read-only at rest. A mutation opens a
//! [`WritableWindow`], which widens the file modes, and the window
//! restores them when it is closed or dropped. The restore therefore runs
//! on every exit path, including early returns through `?`.

use crate::config::CertConfig;
use crate::error::CertsError;
use crate::executor::{shell_quote, RemoteExecutor};

pub struct WritableWindow<'a> {
    executor: &'a dyn RemoteExecutor,
    dir: String,
    locked_mode: String,
    closed: bool,
}

impl<'a> WritableWindow<'a> {
    /// Widen permissions on every file in `dir`.
    ///
    /// Best-effort: the store may already be writable, so a failure is
    /// logged and the window is still returned.
    pub fn open(executor: &'a dyn RemoteExecutor, dir: &str, config: &CertConfig) -> Self {
        let command = format!(
            "chmod -f {} {}/* || true",
            config.writable_mode,
            shell_quote(dir)
        );
        match executor.execute_raw(&command) {
            Ok(out) if out.success() => {
                tracing::debug!(host = executor.host(), dir, "Cert directory opened for writing");
            }
            Ok(out) => {
                tracing::warn!(
                    host = executor.host(),
                    dir,
                    exit_code = out.exit_code,
                    "Could not widen cert directory permissions, continuing"
                );
            }
            Err(e) => {
                tracing::warn!(
                    host = executor.host(),
                    dir,
                    error = %e,
                    "Could not widen cert directory permissions, continuing"
                );
            }
        }

        Self {
            executor,
            dir: dir.to_string(),
            locked_mode: config.locked_mode.clone(),
            closed: false,
        }
    }

    /// Restore read-only permissions, propagating a failure.
    pub fn close(mut self) -> Result<(), CertsError> {
        self.closed = true;
        self.restore()
    }

    fn restore(&self) -> Result<(), CertsError> {
        self.executor.execute(&format!(
            "chmod {} {}/*",
            self.locked_mode,
            shell_quote(&self.dir)
        ))?;
        tracing::debug!(host = self.executor.host(), dir = %self.dir, "Cert directory locked");
        Ok(())
    }
}

impl Drop for WritableWindow<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Unwinding from an earlier failure; that error is the one the
        // caller sees, so a restore failure here can only be logged.
        if let Err(e) = self.restore() {
            tracing::warn!(
                host = self.executor.host(),
                dir = %self.dir,
                error = %e,
                "Failed to restore cert directory permissions"
            );
        }
    }
}
