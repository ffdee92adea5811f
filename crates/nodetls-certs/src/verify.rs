//! Remote validation of a node certificate.
//!
//! Runs the verification tool on the node itself: expiry window, chain to
//! the given root, and optionally the node's hostname against the
//! certificate's CN and SAN entries. A node without the tool is skipped,
//! not failed.

use std::fmt;
use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::CertConfig;
use crate::error::CertsError;
use crate::executor::{shell_quote, RemoteExecutor};

/// Subject CN, or one SAN entry, per match.
static NAME_ENTRIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m) Subject:.*CN ?= ?(\S*)$| (DNS|IP Address):(\S*?)(,|$)")
        .expect("invalid certificate name pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VerifyOutcome {
    Verified,
    /// Verification tool missing on the node.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanEntry {
    Dns(String),
    Ip(String),
}

impl fmt::Display for SanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dns(name) => write!(f, "DNS:{name}"),
            Self::Ip(addr) => write!(f, "IP Address:{addr}"),
        }
    }
}

/// Identities a certificate claims, as read from its text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertNames {
    pub common_name: Option<String>,
    pub sans: Vec<SanEntry>,
}

impl CertNames {
    pub fn from_text(text: &str) -> Self {
        let mut names = CertNames::default();
        for caps in NAME_ENTRIES.captures_iter(text) {
            if let Some(cn) = caps.get(1) {
                if names.common_name.is_none() {
                    names.common_name = Some(cn.as_str().to_string());
                }
                continue;
            }
            let (Some(kind), Some(value)) = (caps.get(2), caps.get(3)) else {
                continue;
            };
            let entry = match kind.as_str() {
                "DNS" => SanEntry::Dns(value.as_str().to_string()),
                _ => SanEntry::Ip(value.as_str().to_string()),
            };
            if !names.sans.contains(&entry) {
                names.sans.push(entry);
            }
        }
        names
    }

    /// Exact matching only: `*.example.com` does not cover
    /// `db1.example.com`.
    pub fn matches_cn(&self, host: &str) -> bool {
        self.common_name
            .as_deref()
            .is_some_and(|cn| dns_name_eq(cn, host))
    }

    /// DNS entries are checked for names, IP entries for addresses.
    pub fn matches_san(&self, host: &str) -> bool {
        match host.parse::<IpAddr>() {
            Ok(ip) => self.sans.iter().any(|entry| match entry {
                SanEntry::Ip(value) => value.parse::<IpAddr>().is_ok_and(|v| v == ip),
                SanEntry::Dns(_) => false,
            }),
            Err(_) => self.sans.iter().any(|entry| match entry {
                SanEntry::Dns(value) => dns_name_eq(value, host),
                SanEntry::Ip(_) => false,
            }),
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        self.matches_cn(host) || self.matches_san(host)
    }
}

fn dns_name_eq(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

pub struct CertVerifier<'a> {
    config: &'a CertConfig,
}

impl<'a> CertVerifier<'a> {
    pub fn new(config: &'a CertConfig) -> Self {
        Self { config }
    }

    /// Validate `node_cert_path` against `root_cert_path`, both paths on the
    /// node. With `verify_hostname`, the executor's host must also appear
    /// in the certificate's CN or SAN.
    pub fn verify(
        &self,
        executor: &dyn RemoteExecutor,
        root_cert_path: &str,
        node_cert_path: &str,
        verify_hostname: bool,
    ) -> Result<VerifyOutcome, CertsError> {
        let host = executor.host();
        let tool = &self.config.verify_tool;

        let probe = executor.execute_raw(&format!("command -v {}", shell_quote(tool)))?;
        if !probe.success() {
            tracing::debug!(host, tool = %tool, "Verification tool not found, skipping certificate verification");
            return Ok(VerifyOutcome::Skipped {
                reason: format!("{tool} not found on {host}"),
            });
        }

        let window = self.config.expiry_window_secs;
        let expiry = executor.execute_raw(&format!(
            "{} x509 -noout -checkend {window} -in {}",
            shell_quote(tool),
            shell_quote(node_cert_path)
        ))?;
        // -checkend also exits 1 when the certificate cannot be loaded
        if expiry.exit_code == 1 && expiry.stdout.contains("Certificate will expire") {
            return Err(CertsError::CertExpired {
                host: host.to_string(),
                cert_path: node_cert_path.to_string(),
                window_secs: window,
            });
        }
        if !expiry.success() {
            return Err(CertsError::RemoteCommandFailed {
                host: host.to_string(),
                command: format!("{tool} x509 -checkend"),
                exit_code: expiry.exit_code,
                stderr: expiry.stderr.trim().to_string(),
            });
        }

        let chain = executor.execute_raw(&format!(
            "{} verify -CAfile {} {}",
            shell_quote(tool),
            shell_quote(root_cert_path),
            shell_quote(node_cert_path)
        ))?;
        if !chain.success() || chain.stdout.lines().any(|line| line.starts_with("error ")) {
            tracing::debug!(host, stdout = %chain.stdout.trim(), stderr = %chain.stderr.trim(), "Chain verification failed");
            return Err(CertsError::CertSignatureInvalid {
                host: host.to_string(),
                cert_path: node_cert_path.to_string(),
                root_path: root_cert_path.to_string(),
            });
        }

        if verify_hostname {
            self.verify_hostname(executor, node_cert_path)?;
        }

        tracing::info!(host, cert = node_cert_path, root = root_cert_path, "Node certificate verified");
        Ok(VerifyOutcome::Verified)
    }

    fn verify_hostname(
        &self,
        executor: &dyn RemoteExecutor,
        node_cert_path: &str,
    ) -> Result<(), CertsError> {
        let host = executor.host();
        let text = executor.execute(&format!(
            "{} x509 -noout -text -in {}",
            shell_quote(&self.config.verify_tool),
            shell_quote(node_cert_path)
        ))?;
        if !text.stdout.contains("Certificate:") {
            return Err(CertsError::CertDecodeFailed {
                host: host.to_string(),
                cert_path: node_cert_path.to_string(),
            });
        }

        let names = CertNames::from_text(&text.stdout);
        if names.matches(host) {
            tracing::debug!(host, cn = ?names.common_name, "Hostname matches node certificate");
            return Ok(());
        }

        Err(CertsError::HostnameMismatch {
            host: host.to_string(),
            cert_path: node_cert_path.to_string(),
            common_name: names.common_name,
            sans: names.sans.iter().map(ToString::to_string).collect(),
        })
    }
}
