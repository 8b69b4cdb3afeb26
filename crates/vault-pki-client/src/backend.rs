use async_trait::async_trait;
use tracing::instrument;
use vault_pki_core::{CertificateEntry, IssuerEntry, PkiBackend, PkiMount, Result};

use crate::VaultClient;

#[async_trait]
impl PkiBackend for VaultClient {
    #[instrument(skip(self), fields(backend = "vault"))]
    async fn list_serials(&self, mount: &str) -> Result<Vec<String>> {
        self.pki(mount).list_certs().await
    }

    #[instrument(skip(self), fields(backend = "vault"))]
    async fn fetch_certificate(&self, mount: &str, serial: &str) -> Result<CertificateEntry> {
        Ok(self.pki(mount).read_cert(serial).await?.into_entry())
    }

    #[instrument(skip(self), fields(backend = "vault"))]
    async fn fetch_issuer(&self, mount: &str, issuer_ref: &str) -> Result<IssuerEntry> {
        Ok(self
            .pki(mount)
            .read_issuer(issuer_ref)
            .await?
            .into_entry(issuer_ref))
    }

    #[instrument(skip(self), fields(backend = "vault"))]
    async fn default_issuer(&self, mount: &str) -> Result<Option<String>> {
        let config = self.pki(mount).read_issuers_config().await?;
        Ok(config.default_issuer().map(String::from))
    }

    #[instrument(skip(self), fields(backend = "vault"))]
    async fn list_pki_mounts(&self) -> Result<Vec<PkiMount>> {
        self.sys().list_pki_mounts().await
    }
}
