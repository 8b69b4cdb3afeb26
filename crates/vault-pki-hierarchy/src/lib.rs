//! Certificate hierarchy resolution for Vault PKI mounts.
//!
//! [`HierarchyResolver`] lists every certificate under a mount, fetches and
//! decodes them concurrently, resolves each issuer once per request and folds
//! the result into a root → intermediate → certificate tree. Problems with
//! individual certificates or issuers become [`Warning`](vault_pki_core::Warning)s
//! on the report; only failures that make the whole result meaningless are
//! returned as [`ResolveError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use vault_pki_core::PkiBackend;
//! use vault_pki_hierarchy::{HierarchyResolver, ResolveResult};
//!
//! async fn print_tree<B: PkiBackend + 'static>(backend: B) -> ResolveResult<()> {
//!     let report = HierarchyResolver::new(backend).resolve_all("pki_int").await?;
//!     for root in &report.root_groups {
//!         println!("{}: {} certificates", root.root_common_name, root.certificate_count());
//!     }
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/vault-pki-hierarchy/0.3.0")]

mod assembler;
mod config;
mod decoder;
mod error;
mod issuer_cache;
mod orchestrator;
mod resolver;
mod simplified;

#[cfg(test)]
mod testing;

pub use assembler::{assemble, Assembly};
pub use config::ResolverConfig;
pub use decoder::{chain_entry, decode_record, parse_certificate, ParsedCertificate};
pub use error::{DecodeError, ResolveError, ResolveResult};
pub use issuer_cache::{IssuerCache, IssuerLookup, IssuerResolution};
pub use orchestrator::{fetch_all, FetchOutput};
pub use resolver::HierarchyResolver;
pub use simplified::{format_expiring_in, simplified_list, SimplifiedCertificate, SimplifiedList};
