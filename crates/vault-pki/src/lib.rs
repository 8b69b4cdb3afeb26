//! Certificate hierarchy views over HashiCorp Vault PKI secrets engines.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vault_pki::{HierarchyResolver, VaultClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // VAULT_ADDR, VAULT_TOKEN and optionally VAULT_NAMESPACE
//!     let client = VaultClient::from_env()?;
//!
//!     for mount in client.sys().list_pki_mounts().await? {
//!         println!("PKI engine: {}", mount.path);
//!     }
//!
//!     let report = HierarchyResolver::new(client).resolve_all("pki_int").await?;
//!     println!(
//!         "{} certificates, {} expired, {} revoked",
//!         report.summary.total_certificates,
//!         report.summary.expired_count,
//!         report.summary.revoked_count,
//!     );
//!
//!     for warning in &report.warnings {
//!         eprintln!("warning: {warning}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/vault-pki/0.3.0")]

// Re-export core types
pub use vault_pki_core::*;

// Re-export client
pub use vault_pki_client::{api, RateLimit, VaultClient, VaultClientBuilder, VaultConfig};

// Re-export the resolver
pub use vault_pki_hierarchy::{
    simplified_list, HierarchyResolver, ResolveError, ResolveResult, ResolverConfig,
    SimplifiedCertificate, SimplifiedList,
};
pub use vault_pki_hierarchy as hierarchy;

// Re-export runtime for convenience
pub use tokio;
pub use serde;
pub use serde_json;
