//! Certificate lifecycle error types.

use std::path::PathBuf;

use nodetls_common::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum CertsError {
    #[error("node cert {cert_path} on {host} is expired or will expire within {window_secs} seconds")]
    CertExpired {
        host: String,
        cert_path: String,
        window_secs: u64,
    },

    #[error("node cert {cert_path} on {host} is not signed by the provided root cert {root_path}")]
    CertSignatureInvalid {
        host: String,
        cert_path: String,
        root_path: String,
    },

    #[error(
        "'{host}' does not match with any entry in CN or SAN of the node cert {cert_path} \
         (cert CN: {common_name:?}, cert SAN: {sans:?})"
    )]
    HostnameMismatch {
        host: String,
        cert_path: String,
        common_name: Option<String>,
        sans: Vec<String>,
    },

    #[error("unable to decode the node cert {cert_path} on {host}")]
    CertDecodeFailed { host: String, cert_path: String },

    #[error("root cert rotation requested but {path} could not be read on {host}")]
    MissingRootCert { host: String, path: String },

    #[error("command on {host} exited with {exit_code}: {command}: {stderr}")]
    RemoteCommandFailed {
        host: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("upload of {} to {host}:{remote} failed: {reason}", .local.display())]
    UploadFailed {
        host: String,
        local: PathBuf,
        remote: String,
        reason: String,
    },

    #[error("unable to read {}: {source}", .path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PEM block {index} ({label}) is not valid base64: {reason}")]
    MalformedPem {
        index: usize,
        label: String,
        reason: String,
    },

    #[error("unknown certificate location '{0}' (expected 'node' or 'platform')")]
    InvalidLocation(String),

    #[error("refusing to manage certificates in directory '{0}'")]
    InvalidDirectory(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<&CertsError> for ErrorCode {
    fn from(e: &CertsError) -> Self {
        match e {
            CertsError::CertExpired { .. } => ErrorCode::CertExpired,
            CertsError::CertSignatureInvalid { .. } => ErrorCode::CertSignatureInvalid,
            CertsError::HostnameMismatch { .. } => ErrorCode::HostnameMismatch,
            CertsError::CertDecodeFailed { .. } => ErrorCode::CertDecodeFailed,
            CertsError::MissingRootCert { .. } => ErrorCode::MissingRootCert,
            CertsError::RemoteCommandFailed { .. } => ErrorCode::RemoteCommandFailed,
            CertsError::UploadFailed { .. } => ErrorCode::UploadFailed,
            CertsError::LocalRead { .. } | CertsError::Io(_) => ErrorCode::IoError,
            CertsError::MalformedPem { .. } => ErrorCode::ParseError,
            CertsError::InvalidLocation(_) | CertsError::InvalidDirectory(_) => {
                ErrorCode::InvalidArgument
            }
            CertsError::Config(_) => ErrorCode::ConfigError,
        }
    }
}
