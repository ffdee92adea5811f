//! Two-phase root CA rotation on a node's cert store.
//!
//! Phase one stages the new root as `ca_new.crt` and appends it to
//! `ca.crt`, so the node trusts the old and new CA at once. Phase two
//! replaces `ca.crt` with the staged root, dropping the old CA.
//!
//! Phase one must finish on every node of a cluster before any server
//! certificate is reissued under the new CA, and phase two must not start
//! on any node until phase one has finished on all of them. Operations on
//! the same node must be serialized by the caller.

use serde::Serialize;

use crate::config::CertConfig;
use crate::error::CertsError;
use crate::executor::{shell_quote, RemoteExecutor};
use crate::store::{place_file, CertLocation, CertStore};
use crate::window::WritableWindow;

/// Result of [`RootCertRotator::remove_old_root`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootRemoval {
    /// The staged root replaced the active one.
    Finalized,
    /// No staged root on the node; nothing changed.
    NotStaged,
}

pub struct RootCertRotator<'a> {
    config: &'a CertConfig,
}

impl<'a> RootCertRotator<'a> {
    pub fn new(config: &'a CertConfig) -> Self {
        Self { config }
    }

    /// Stage `new_root_source` and append it to the active root.
    pub fn append_new_root(
        &self,
        executor: &dyn RemoteExecutor,
        new_root_source: &str,
        location: CertLocation,
        certs_dir: &str,
    ) -> Result<(), CertsError> {
        let store = CertStore::new(certs_dir, self.config)?;
        let window = WritableWindow::open(executor, &store.dir, self.config);

        place_file(executor, new_root_source, &store.staged_root_cert, location)?;
        tracing::info!(
            host = executor.host(),
            source = new_root_source,
            %location,
            staged = %store.staged_root_cert,
            "New root cert staged"
        );

        executor.execute(&format!(
            "cat {} >> {}",
            shell_quote(&store.staged_root_cert),
            shell_quote(&store.root_cert)
        ))?;
        tracing::info!(host = executor.host(), root = %store.root_cert, "New root cert appended to trust store");

        window.close()
    }

    /// Replace the active root with the staged one. A node with nothing
    /// staged is left untouched.
    pub fn remove_old_root(
        &self,
        executor: &dyn RemoteExecutor,
        certs_dir: &str,
    ) -> Result<RootRemoval, CertsError> {
        let store = CertStore::new(certs_dir, self.config)?;

        let probe = executor.execute_raw(&format!("test -f {}", shell_quote(&store.staged_root_cert)))?;
        if !probe.success() {
            tracing::debug!(
                host = executor.host(),
                staged = %store.staged_root_cert,
                "No staged root cert, nothing to remove"
            );
            return Ok(RootRemoval::NotStaged);
        }

        let window = WritableWindow::open(executor, &store.dir, self.config);
        executor.execute(&format!(
            "mv {} {}",
            shell_quote(&store.staged_root_cert),
            shell_quote(&store.root_cert)
        ))?;
        tracing::info!(host = executor.host(), root = %store.root_cert, "Old root cert removed from trust store");

        window.close()?;
        Ok(RootRemoval::Finalized)
    }
}
