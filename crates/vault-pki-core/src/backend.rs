//! The backend collaborator the resolver reads through.

use async_trait::async_trait;

use crate::{CertificateEntry, IssuerEntry, PkiMount, Result};

/// Read-only access to a PKI backend.
///
/// Every method may fail with an error for which
/// [`VaultPkiError::is_not_found`](crate::VaultPkiError::is_not_found),
/// [`VaultPkiError::is_forbidden`](crate::VaultPkiError::is_forbidden) or
/// [`VaultPkiError::is_unreachable`](crate::VaultPkiError::is_unreachable)
/// holds, so callers can tell the three conditions apart.
#[async_trait]
pub trait PkiBackend: Send + Sync {
    /// List every certificate serial under a mount
    async fn list_serials(&self, mount: &str) -> Result<Vec<String>>;

    /// Read one certificate and its revocation metadata
    async fn fetch_certificate(&self, mount: &str, serial: &str) -> Result<CertificateEntry>;

    /// Read one issuer with its chain to root
    async fn fetch_issuer(&self, mount: &str, issuer_ref: &str) -> Result<IssuerEntry>;

    /// The issuer the mount uses when a certificate names none
    async fn default_issuer(&self, _mount: &str) -> Result<Option<String>> {
        Ok(None)
    }

    /// List the PKI mounts visible to the caller
    async fn list_pki_mounts(&self) -> Result<Vec<PkiMount>>;
}
