//! Immutable certificate layout and policy configuration.
//!
//! Defaults match the layout already deployed on nodes. Overrides come from
//! the `[certs]` table of `config.toml`.

use std::path::Path;

use serde::Deserialize;

use crate::error::CertsError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertConfig {
    /// Active root in a cert store.
    pub root_cert_name: String,
    /// Staged root during an in-flight rotation.
    pub root_cert_new_name: String,
    /// Home directory on the node that holds the client trust dir.
    pub home_dir: String,
    pub client_dir_name: String,
    pub client_root_name: String,
    /// Client cert and key are `<product>.crt` and `<product>.key`.
    pub client_product: String,
    /// A node cert must stay valid for at least this long.
    pub expiry_window_secs: u64,
    /// `chmod` mode applied to store files outside a mutation.
    pub locked_mode: String,
    /// `chmod` mode applied while a mutation is in flight.
    pub writable_mode: String,
    /// External verification tool expected on the node.
    pub verify_tool: String,
    /// Provider code used to pick provider hooks.
    pub provider: String,
}

impl Default for CertConfig {
    fn default() -> Self {
        Self {
            root_cert_name: "ca.crt".to_string(),
            root_cert_new_name: "ca_new.crt".to_string(),
            home_dir: "/home/yugabyte".to_string(),
            client_dir_name: ".yugabytedb".to_string(),
            client_root_name: "root.crt".to_string(),
            client_product: "yugabytedb".to_string(),
            expiry_window_secs: 86_400,
            locked_mode: "400".to_string(),
            writable_mode: "666".to_string(),
            verify_tool: "openssl".to_string(),
            provider: "onprem".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    certs: Option<toml::Value>,
}

impl CertConfig {
    /// Load from a TOML file. A missing file or a missing `[certs]` table
    /// yields the defaults.
    pub fn load(path: &Path) -> Result<Self, CertsError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| CertsError::LocalRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CertsError> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| CertsError::Config(format!("Invalid config.toml: {e}")))?;
        match file.certs {
            None => Ok(Self::default()),
            Some(section) => section
                .try_into::<Self>()
                .map_err(|e| CertsError::Config(format!("Invalid certs section: {e}"))),
        }
    }

    pub fn client_cert_name(&self) -> String {
        format!("{}.crt", self.client_product)
    }

    pub fn client_key_name(&self) -> String {
        format!("{}.key", self.client_product)
    }
}
