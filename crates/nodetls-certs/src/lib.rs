//! Certificate lifecycle for cluster nodes.
//!
//! Decides whether a node's root/server certificate set is valid and
//! rotates a cluster's trusted root CA without leaving any node unable to
//! verify its peers. Everything runs as shell commands through a
//! [`RemoteExecutor`] bound to one node; see [`rotation`] for the
//! two-phase protocol and its ordering contract.

pub mod client;
pub mod compare;
pub mod config;
pub mod error;
pub mod executor;
pub mod provider;
pub mod rotation;
pub mod server;
pub mod store;
pub mod verify;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientCertDeployer, ClientCertFiles};
pub use compare::{compare, CertBlock, CertBundle, TrustRelation};
pub use config::CertConfig;
pub use error::CertsError;
pub use executor::{CommandOutput, LocalExecutor, RemoteExecutor};
pub use provider::{CloudProvider, StandardProvider};
pub use rotation::{RootCertRotator, RootRemoval};
pub use server::{ServerCertDeployer, ServerCertFiles, ServerDeployReport};
pub use store::{CertLocation, CertStore, ClientTrustDir};
pub use verify::{CertNames, CertVerifier, VerifyOutcome};
