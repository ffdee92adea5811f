//! Installs a node's root, server certificate and key into its cert store.

use std::path::Path;

use serde::Serialize;

use crate::compare::compare;
use crate::config::CertConfig;
use crate::error::CertsError;
use crate::executor::{shell_quote, RemoteExecutor};
use crate::provider::CloudProvider;
use crate::store::{ensure_dir, place_file, CertLocation, CertStore};
use crate::verify::{CertVerifier, VerifyOutcome};
use crate::window::WritableWindow;

/// Source paths for a server deploy, on the node or the controller per
/// the deploy's [`CertLocation`].
#[derive(Debug, Clone, Copy)]
pub struct ServerCertFiles<'f> {
    pub root_cert: &'f str,
    pub server_cert: &'f str,
    pub server_key: &'f str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerDeployReport {
    pub root_copied: bool,
    /// `None` when the sources were uploaded and not pre-verified.
    pub verification: Option<VerifyOutcome>,
    pub root_path: String,
    pub cert_path: String,
    pub key_path: String,
}

pub struct ServerCertDeployer<'a> {
    config: &'a CertConfig,
    provider: &'a dyn CloudProvider,
}

impl<'a> ServerCertDeployer<'a> {
    pub fn new(config: &'a CertConfig, provider: &'a dyn CloudProvider) -> Self {
        Self { config, provider }
    }

    /// Install the triple into `certs_dir`.
    ///
    /// With `rotate`, the root is only rewritten when the candidate adds
    /// trust beyond the store's current `ca.crt`. Node-local sources are
    /// verified, hostname included, before anything is written.
    pub fn deploy(
        &self,
        executor: &dyn RemoteExecutor,
        files: &ServerCertFiles<'_>,
        location: CertLocation,
        certs_dir: &str,
        rotate: bool,
    ) -> Result<ServerDeployReport, CertsError> {
        let store = CertStore::new(certs_dir, self.config)?;
        let node_address = self.provider.node_address(executor.host());

        let copy_root = if rotate {
            !self.candidate_already_trusted(executor, files.root_cert, location, &store)?
        } else {
            true
        };

        tracing::info!(
            host = executor.host(),
            root = files.root_cert,
            cert = files.server_cert,
            key = files.server_key,
            %location,
            "Moving server certs"
        );

        ensure_dir(executor, &store.dir)?;
        let window = WritableWindow::open(executor, &store.dir, self.config);

        let verification = match location {
            CertLocation::Node => Some(CertVerifier::new(self.config).verify(
                executor,
                files.root_cert,
                files.server_cert,
                true,
            )?),
            CertLocation::Platform => None,
        };

        if copy_root {
            place_file(executor, files.root_cert, &store.root_cert, location)?;
        } else {
            tracing::info!(
                host = executor.host(),
                root = %store.root_cert,
                "Existing root cert already trusts the candidate, not copying"
            );
        }

        let cert_path = store.node_cert(&node_address);
        let key_path = store.node_key(&node_address);
        place_file(executor, files.server_cert, &cert_path, location)?;
        place_file(executor, files.server_key, &key_path, location)?;

        window.close()?;
        tracing::info!(host = executor.host(), dir = %store.dir, root_copied = copy_root, "Server certs installed");

        Ok(ServerDeployReport {
            root_copied: copy_root,
            verification,
            root_path: store.root_cert,
            cert_path,
            key_path,
        })
    }

    /// True when the candidate root's trust set is equal to, or contained
    /// in, the store's current root.
    fn candidate_already_trusted(
        &self,
        executor: &dyn RemoteExecutor,
        candidate_path: &str,
        location: CertLocation,
        store: &CertStore,
    ) -> Result<bool, CertsError> {
        let existing = executor.execute_raw(&format!("cat {}", shell_quote(&store.root_cert)))?;
        if !existing.success() {
            return Err(CertsError::MissingRootCert {
                host: executor.host().to_string(),
                path: store.root_cert.clone(),
            });
        }

        let candidate = match location {
            CertLocation::Node => {
                executor
                    .execute(&format!("cat {}", shell_quote(candidate_path)))?
                    .stdout
            }
            CertLocation::Platform => {
                std::fs::read_to_string(candidate_path).map_err(|source| CertsError::LocalRead {
                    path: Path::new(candidate_path).to_path_buf(),
                    source,
                })?
            }
        };

        let relation = compare(&candidate, &existing.stdout)?;
        tracing::debug!(
            host = executor.host(),
            candidate = candidate_path,
            existing = %store.root_cert,
            %relation,
            "Compared candidate root with trust store"
        );
        Ok(relation.is_covered())
    }
}
