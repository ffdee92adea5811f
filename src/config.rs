use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use nodetls_certs::{CertConfig, CertLocation};

#[derive(Parser, Debug)]
#[command(
    name = "nodetls",
    version,
    about = "Verify, deploy and rotate TLS certificates on cluster nodes"
)]
pub struct Cli {
    /// Address of the node being operated on (names node.<addr>.crt and
    /// is checked against the certificate's CN/SAN)
    #[arg(long, env = "NODETLS_HOST", default_value = "127.0.0.1", global = true)]
    pub host: String,

    /// Config file (default: ~/.nodetls/config.toml)
    #[arg(long, env = "NODETLS_CONFIG", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "NODETLS_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare two local PEM bundles as trust sets
    Compare {
        /// Bundle A
        a: PathBuf,
        /// Bundle B
        b: PathBuf,
    },
    /// Verify a node certificate against a root certificate
    Verify {
        /// Root certificate path on the node
        #[arg(long)]
        root: String,
        /// Node certificate path on the node
        #[arg(long)]
        cert: String,
        /// Also check the host against the certificate's CN/SAN
        #[arg(long)]
        hostname: bool,
    },
    /// Stage a new root CA and trust it alongside the current one
    AppendRoot {
        /// New root certificate
        #[arg(long)]
        root: String,
        /// Where the new root lives: node or platform
        #[arg(long, default_value = "node")]
        location: CertLocation,
        /// Cert store directory on the node
        #[arg(long)]
        certs_dir: String,
    },
    /// Replace the active root CA with the staged one
    RemoveRoot {
        /// Cert store directory on the node
        #[arg(long)]
        certs_dir: String,
    },
    /// Install root, server certificate and key into the cert store
    DeployServer {
        #[arg(long)]
        root: String,
        #[arg(long)]
        cert: String,
        #[arg(long)]
        key: String,
        /// Where the source files live: node or platform
        #[arg(long, default_value = "node")]
        location: CertLocation,
        /// Cert store directory on the node
        #[arg(long)]
        certs_dir: String,
        /// Keep the existing root when it already trusts the new one
        #[arg(long)]
        rotate: bool,
    },
    /// Install root, client certificate and key into the client trust dir
    DeployClient {
        #[arg(long)]
        root: String,
        #[arg(long)]
        cert: String,
        #[arg(long)]
        key: String,
        /// Where the source files live: node or platform
        #[arg(long, default_value = "node")]
        location: CertLocation,
    },
}

impl Cli {
    /// Effective tracing filter: `-v` flags win over `--log-level`.
    pub fn log_filter(&self) -> &str {
        match self.verbose {
            0 => &self.log_level,
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn load_config(&self) -> anyhow::Result<CertConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(nodetls_common::paths::config_path);
        CertConfig::load(&path).with_context(|| format!("loading {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_overrides_log_level() {
        let cli = Cli::parse_from(["nodetls", "-vv", "remove-root", "--certs-dir", "/c"]);
        assert_eq!(cli.log_filter(), "trace");
        let cli = Cli::parse_from(["nodetls", "--log-level", "warn", "remove-root", "--certs-dir", "/c"]);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn location_parses_from_flag() {
        let cli = Cli::parse_from([
            "nodetls",
            "append-root",
            "--root",
            "/tmp/ca.crt",
            "--location",
            "platform",
            "--certs-dir",
            "/opt/certs",
        ]);
        match cli.command {
            Command::AppendRoot { location, .. } => assert_eq!(location, CertLocation::Platform),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_location_is_rejected() {
        let result = Cli::try_parse_from([
            "nodetls",
            "append-root",
            "--root",
            "/tmp/ca.crt",
            "--location",
            "disk",
            "--certs-dir",
            "/opt/certs",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodetls.toml");
        std::fs::write(&path, "[certs]\nhome_dir = \"/srv/db\"\n").unwrap();
        let cli = Cli::parse_from([
            "nodetls",
            "--config",
            path.to_str().unwrap(),
            "remove-root",
            "--certs-dir",
            "/c",
        ]);
        assert_eq!(cli.load_config().unwrap().home_dir, "/srv/db");
    }
}
