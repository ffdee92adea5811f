//! Installs the client-facing root, certificate and key.
//!
//! The client trust dir has its own lifecycle: always overwritten in full,
//! never verified, never rotated.

use crate::config::CertConfig;
use crate::error::CertsError;
use crate::executor::RemoteExecutor;
use crate::provider::CloudProvider;
use crate::store::{ensure_dir, place_file, CertLocation, ClientTrustDir};
use crate::window::WritableWindow;

#[derive(Debug, Clone, Copy)]
pub struct ClientCertFiles<'f> {
    pub root_cert: &'f str,
    pub client_cert: &'f str,
    pub client_key: &'f str,
}

pub struct ClientCertDeployer<'a> {
    config: &'a CertConfig,
    provider: &'a dyn CloudProvider,
}

impl<'a> ClientCertDeployer<'a> {
    pub fn new(config: &'a CertConfig, provider: &'a dyn CloudProvider) -> Self {
        Self { config, provider }
    }

    pub fn deploy(
        &self,
        executor: &dyn RemoteExecutor,
        files: &ClientCertFiles<'_>,
        location: CertLocation,
    ) -> Result<ClientTrustDir, CertsError> {
        let home = self.provider.client_home(self.config);
        let target = ClientTrustDir::new(&home, self.config)?;

        tracing::info!(
            host = executor.host(),
            root = files.root_cert,
            cert = files.client_cert,
            key = files.client_key,
            %location,
            "Moving client certs"
        );

        ensure_dir(executor, &target.dir)?;
        let window = WritableWindow::open(executor, &target.dir, self.config);

        place_file(executor, files.root_cert, &target.root_cert, location)?;
        place_file(executor, files.client_cert, &target.client_cert, location)?;
        place_file(executor, files.client_key, &target.client_key, location)?;

        window.close()?;
        tracing::info!(host = executor.host(), dir = %target.dir, "Client certs installed");
        Ok(target)
    }
}
