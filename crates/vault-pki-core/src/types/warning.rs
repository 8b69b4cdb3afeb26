use serde::{Deserialize, Serialize};

/// Category of a recoverable anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// The token may not read a certificate or issuer
    PermissionDenied,
    /// Certificate bytes could not be decoded
    DecodeError,
    /// A certificate's issuer could not be resolved
    MissingIssuer,
    /// A certificate's issuer no longer exists in the backend
    InactiveIssuer,
    /// A single certificate could not be fetched
    FetchError,
    /// The result is knowingly incomplete
    Truncated,
}

impl WarningKind {
    /// The wire name of this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission-denied",
            Self::DecodeError => "decode-error",
            Self::MissingIssuer => "missing-issuer",
            Self::InactiveIssuer => "inactive-issuer",
            Self::FetchError => "fetch-error",
            Self::Truncated => "truncated",
        }
    }
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recoverable anomaly recorded during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Category
    pub kind: WarningKind,

    /// Serial, issuer reference or mount implicated
    pub resource: String,

    /// Human-readable detail
    pub message: String,
}

impl Warning {
    /// Create a warning
    #[must_use]
    pub fn new(kind: WarningKind, resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// A certificate or issuer read was refused
    #[must_use]
    pub fn permission_denied(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::PermissionDenied, resource, message)
    }

    /// Certificate bytes could not be decoded
    #[must_use]
    pub fn decode_error(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::DecodeError, resource, message)
    }

    /// A certificate's issuer could not be resolved
    #[must_use]
    pub fn missing_issuer(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::MissingIssuer, resource, message)
    }

    /// An issuer no longer exists in the backend
    #[must_use]
    pub fn inactive_issuer(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::InactiveIssuer, resource, message)
    }

    /// A certificate could not be fetched
    #[must_use]
    pub fn fetch_error(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::FetchError, resource, message)
    }

    /// The result is incomplete
    #[must_use]
    pub fn truncated(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::Truncated, resource, message)
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.resource, self.message)
    }
}
