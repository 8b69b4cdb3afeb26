//! HTTP client for the Vault PKI secrets engine API.
//!
//! This crate provides the main [`VaultClient`] for reading PKI mounts,
//! certificates and issuers. [`VaultClient`] implements
//! [`PkiBackend`](vault_pki_core::PkiBackend), so it can be handed straight to
//! the hierarchy resolver.

#![doc(html_root_url = "https://docs.rs/vault-pki-client/0.3.0")]

mod backend;
mod client;
mod config;
pub mod api;

pub use client::{VaultClient, VaultClientBuilder};
pub use config::*;
pub use vault_pki_core::{Result, VaultPkiError};
