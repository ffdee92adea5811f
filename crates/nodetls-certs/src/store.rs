//! File layout of the node cert store and client trust dir, and the
//! copy-or-upload primitive shared by every mutating operation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use nodetls_common::paths::remote_join;

use crate::config::CertConfig;
use crate::error::CertsError;
use crate::executor::{shell_quote, RemoteExecutor};

/// Where a source certificate file lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertLocation {
    /// Already on the target node.
    Node,
    /// On the controlling machine; must be uploaded.
    Platform,
}

impl FromStr for CertLocation {
    type Err = CertsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "node" => Ok(Self::Node),
            "platform" => Ok(Self::Platform),
            other => Err(CertsError::InvalidLocation(other.to_string())),
        }
    }
}

impl fmt::Display for CertLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Platform => "platform",
        })
    }
}

/// Paths inside a node's cert store directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertStore {
    pub dir: String,
    pub root_cert: String,
    pub staged_root_cert: String,
}

impl CertStore {
    /// Rejects an empty or filesystem-root `dir`: every mutating operation
    /// chmods `dir/*`.
    pub fn new(dir: &str, config: &CertConfig) -> Result<Self, CertsError> {
        if dir.trim().trim_end_matches('/').is_empty() {
            return Err(CertsError::InvalidDirectory(dir.to_string()));
        }
        Ok(Self {
            dir: dir.to_string(),
            root_cert: remote_join(dir, &config.root_cert_name),
            staged_root_cert: remote_join(dir, &config.root_cert_new_name),
        })
    }

    pub fn node_cert(&self, node_address: &str) -> String {
        remote_join(&self.dir, &format!("node.{node_address}.crt"))
    }

    pub fn node_key(&self, node_address: &str) -> String {
        remote_join(&self.dir, &format!("node.{node_address}.key"))
    }
}

/// Paths inside the per-installation client trust directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTrustDir {
    pub dir: String,
    pub root_cert: String,
    pub client_cert: String,
    pub client_key: String,
}

impl ClientTrustDir {
    pub fn new(home: &str, config: &CertConfig) -> Result<Self, CertsError> {
        if home.trim().is_empty() {
            return Err(CertsError::InvalidDirectory(home.to_string()));
        }
        let dir = remote_join(home, &config.client_dir_name);
        Ok(Self {
            root_cert: remote_join(&dir, &config.client_root_name),
            client_cert: remote_join(&dir, &config.client_cert_name()),
            client_key: remote_join(&dir, &config.client_key_name()),
            dir,
        })
    }
}

/// Put `source` at `dest` on the node: a remote `cp` when the source is
/// already on the node, an upload otherwise.
pub fn place_file(
    executor: &dyn RemoteExecutor,
    source: &str,
    dest: &str,
    location: CertLocation,
) -> Result<(), CertsError> {
    match location {
        CertLocation::Node => {
            executor.execute(&format!("cp {} {}", shell_quote(source), shell_quote(dest)))?;
        }
        CertLocation::Platform => {
            executor.upload(Path::new(source), dest)?;
        }
    }
    Ok(())
}

/// `mkdir -p` on the node.
pub fn ensure_dir(executor: &dyn RemoteExecutor, dir: &str) -> Result<(), CertsError> {
    executor.execute(&format!("mkdir -p {}", shell_quote(dir)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedExecutor;

    #[test]
    fn location_parses_case_insensitively() {
        assert_eq!("node".parse::<CertLocation>().unwrap(), CertLocation::Node);
        assert_eq!(
            "Platform".parse::<CertLocation>().unwrap(),
            CertLocation::Platform
        );
        assert!(matches!(
            "disk".parse::<CertLocation>(),
            Err(CertsError::InvalidLocation(_))
        ));
    }

    #[test]
    fn store_layout_matches_deployed_names() {
        let store = CertStore::new("/opt/yugabyte/certs/", &CertConfig::default()).unwrap();
        assert_eq!(store.root_cert, "/opt/yugabyte/certs/ca.crt");
        assert_eq!(store.staged_root_cert, "/opt/yugabyte/certs/ca_new.crt");
        assert_eq!(store.node_cert("10.0.0.5"), "/opt/yugabyte/certs/node.10.0.0.5.crt");
        assert_eq!(store.node_key("10.0.0.5"), "/opt/yugabyte/certs/node.10.0.0.5.key");
    }

    #[test]
    fn client_dir_layout_matches_deployed_names() {
        let dir = ClientTrustDir::new("/home/yugabyte", &CertConfig::default()).unwrap();
        assert_eq!(dir.dir, "/home/yugabyte/.yugabytedb");
        assert_eq!(dir.root_cert, "/home/yugabyte/.yugabytedb/root.crt");
        assert_eq!(dir.client_cert, "/home/yugabyte/.yugabytedb/yugabytedb.crt");
        assert_eq!(dir.client_key, "/home/yugabyte/.yugabytedb/yugabytedb.key");
    }

    #[test]
    fn empty_or_root_store_dir_is_rejected() {
        let config = CertConfig::default();
        for dir in ["", "  ", "/", "//"] {
            assert!(
                matches!(CertStore::new(dir, &config), Err(CertsError::InvalidDirectory(_))),
                "{dir:?} should be rejected"
            );
        }
        assert!(matches!(
            ClientTrustDir::new("", &config),
            Err(CertsError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn place_file_copies_on_node() {
        let exec = ScriptedExecutor::new("10.0.0.1");
        place_file(&exec, "/tmp/new.crt", "/certs/ca.crt", CertLocation::Node).unwrap();
        assert_eq!(exec.commands(), vec!["cp '/tmp/new.crt' '/certs/ca.crt'"]);
        assert!(exec.uploads().is_empty());
    }

    #[test]
    fn place_file_uploads_from_platform() {
        let exec = ScriptedExecutor::new("10.0.0.1");
        place_file(&exec, "/local/new.crt", "/certs/ca.crt", CertLocation::Platform).unwrap();
        assert!(exec.commands().is_empty());
        assert_eq!(
            exec.uploads(),
            vec![(Path::new("/local/new.crt").to_path_buf(), "/certs/ca.crt".to_string())]
        );
    }
}
