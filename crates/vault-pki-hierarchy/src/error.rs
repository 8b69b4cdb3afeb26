use thiserror::Error;
use vault_pki_core::VaultPkiError;

/// Result type alias for hierarchy resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Fatal failures of a hierarchy resolution.
///
/// Per-certificate and per-issuer problems never surface here; they are
/// reported as warnings next to the partial result.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Mount path is empty or malformed
    #[error("invalid mount path '{0}': use alphanumeric characters, underscores and hyphens")]
    InvalidMountPath(String),

    /// No PKI secrets engine is mounted at the path
    #[error("no PKI secrets engine mounted at '{mount}'{}", available_hint(.available))]
    MountNotFound {
        /// Requested mount path
        mount: String,
        /// PKI mounts visible to the caller
        available: Vec<String>,
    },

    /// The caller may not list certificates under the mount
    #[error("permission denied listing certificates on '{mount}': {message}")]
    ListForbidden {
        /// Requested mount path
        mount: String,
        /// Error message from the backend
        message: String,
    },

    /// The token is missing, invalid or expired
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The backend could not be reached
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// Any other backend failure while listing
    #[error(transparent)]
    Backend(VaultPkiError),
}

impl ResolveError {
    /// Classify a failure of the serial listing call
    pub(crate) fn from_list_error(mount: &str, err: VaultPkiError) -> Self {
        match err {
            VaultPkiError::NotFound { .. } => Self::MountNotFound {
                mount: mount.to_string(),
                available: Vec::new(),
            },
            VaultPkiError::PermissionDenied { message, .. } => Self::ListForbidden {
                mount: mount.to_string(),
                message,
            },
            other => other.into(),
        }
    }
}

impl From<VaultPkiError> for ResolveError {
    fn from(err: VaultPkiError) -> Self {
        match err {
            VaultPkiError::InvalidMountPath(path) => Self::InvalidMountPath(path),
            VaultPkiError::Unauthorized(msg) => Self::Unauthorized(msg),
            e if e.is_unreachable() => Self::Unreachable(e.to_string()),
            other => Self::Backend(other),
        }
    }
}

impl From<ResolveError> for VaultPkiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidMountPath(path) => Self::InvalidMountPath(path),
            ResolveError::MountNotFound { mount, .. } => Self::NotFound { resource: mount },
            ResolveError::ListForbidden { mount, message } => Self::PermissionDenied {
                path: format!("{mount}/certs"),
                message,
            },
            ResolveError::Unauthorized(msg) => Self::Unauthorized(msg),
            ResolveError::Unreachable(msg) => Self::Connection(msg),
            ResolveError::Backend(e) => e,
        }
    }
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" (available PKI mounts: {})", available.join(", "))
    }
}

/// Why certificate bytes could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The backend returned no certificate
    #[error("backend returned no certificate data")]
    Missing,

    /// PEM armour could not be parsed
    #[error("invalid PEM: {0}")]
    Pem(String),

    /// PEM parsed but held no CERTIFICATE block
    #[error("no CERTIFICATE block in PEM data")]
    NoCertificateBlock,

    /// DER structure could not be parsed as X.509
    #[error("invalid X.509 structure: {0}")]
    X509(String),
}
