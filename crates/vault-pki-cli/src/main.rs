//! vault-pki - certificate hierarchy viewer for Vault PKI
//!
//! Lists PKI engines and renders their certificates grouped by root and
//! intermediate CA.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    vault_pki_cli::run().await
}
