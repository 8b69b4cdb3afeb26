//! Core types and traits for resolving Vault PKI certificate hierarchies.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - **Types**: the certificate, issuer, hierarchy and warning model
//! - **Errors**: backend failure classification with [`VaultPkiError`]
//! - **Backend**: the [`PkiBackend`] trait the resolver reads through
//!
//! # Example
//!
//! ```rust,ignore
//! use vault_pki_core::{HierarchyReport, Result};
//!
//! fn print_report(report: &HierarchyReport) -> Result<()> {
//!     for root in &report.root_groups {
//!         println!("{} ({} intermediates)", root.root_common_name, root.intermediate_groups.len());
//!     }
//!     println!("total: {}", report.summary.total_certificates);
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/vault-pki-core/0.3.0")]

mod backend;
mod error;
pub mod types;

pub use backend::PkiBackend;
pub use error::{Result, VaultPkiError};
pub use types::*;
