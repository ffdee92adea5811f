use serde::{Deserialize, Serialize};

/// Machine-readable error codes for CLI and JSON output.
/// Shared by every domain crate in the workspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    ConfigError,
    IoError,
    ParseError,
    // Certificate verification
    CertExpired,
    CertSignatureInvalid,
    HostnameMismatch,
    CertDecodeFailed,
    // Certificate store
    MissingRootCert,
    RemoteCommandFailed,
    UploadFailed,
}

impl ErrorCode {
    /// Process exit status for this error.
    ///
    /// Verification failures share a band so wrappers can tell
    /// "bad certificate" apart from "broken node".
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument | Self::ParseError => 2,
            Self::ConfigError => 3,
            Self::IoError => 1,
            Self::CertExpired => 10,
            Self::CertSignatureInvalid => 11,
            Self::HostnameMismatch => 12,
            Self::CertDecodeFailed => 13,
            Self::MissingRootCert => 20,
            Self::RemoteCommandFailed => 21,
            Self::UploadFailed => 22,
        }
    }

    /// Whether the error came from certificate content rather than from
    /// the node or the controller.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::CertExpired
                | Self::CertSignatureInvalid
                | Self::HostnameMismatch
                | Self::CertDecodeFailed
        )
    }
}
