//! Per-provider hooks consumed by the deployers.
//!
//! Every hook has a default, so a provider only overrides what differs.

use std::borrow::Cow;

use crate::config::CertConfig;

pub trait CloudProvider: Send + Sync {
    /// Provider code, e.g. `onprem`.
    fn name(&self) -> &str;

    /// Identity used in `node.<addr>.crt` / `node.<addr>.key`.
    fn node_address<'a>(&self, host: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(host)
    }

    /// Home directory holding the client trust dir.
    fn client_home<'a>(&self, config: &'a CertConfig) -> Cow<'a, str> {
        Cow::Borrowed(config.home_dir.as_str())
    }
}

/// Provider codes understood by [`StandardProvider`].
pub const KNOWN_PROVIDERS: &[&str] = &["onprem", "aws", "gcp", "azu", "kubernetes"];

/// A provider that keeps every default hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardProvider {
    code: String,
}

impl StandardProvider {
    /// Build the provider for `code`. Unknown codes fall back to the
    /// defaults with a warning.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        if !KNOWN_PROVIDERS.contains(&code.as_str()) {
            tracing::warn!(provider = %code, "Unknown provider code, using default hooks");
        }
        Self { code }
    }
}

impl Default for StandardProvider {
    fn default() -> Self {
        Self {
            code: "onprem".to_string(),
        }
    }
}

impl CloudProvider for StandardProvider {
    fn name(&self) -> &str {
        &self.code
    }
}
