use thiserror::Error;

/// Result type alias for Vault PKI operations
pub type Result<T> = std::result::Result<T, VaultPkiError>;

/// Errors that can occur when talking to a Vault PKI backend
#[derive(Error, Debug)]
pub enum VaultPkiError {
    /// Authentication failed - missing, invalid or expired token
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The token is valid but lacks a capability on the path
    #[error("permission denied on {path}: {message}")]
    PermissionDenied {
        /// Backend path that was denied
        path: String,
        /// Error message from the backend
        message: String,
    },

    /// Resource not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// API returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Mount path is empty or contains invalid characters
    #[error("invalid mount path '{0}': use alphanumeric characters, underscores and hyphens")]
    InvalidMountPath(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl VaultPkiError {
    /// Returns true if the backend reported the resource as absent
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the caller's credentials were refused
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Returns true if the backend could not be reached at all
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout(_) | Self::Connection(_)
        )
    }

    /// Returns true if the error is due to authentication
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Returns the HTTP status code if this is an API error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::PermissionDenied { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
