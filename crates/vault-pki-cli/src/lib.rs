//! # vault-pki-cli
//!
//! Command-line front end for the Vault PKI hierarchy resolver.
//!
//! ## Features
//!
//! - **Engine discovery**: list mounted PKI secrets engines, optionally with certificate counts
//! - **Hierarchy view**: certificates grouped root → intermediate → leaf with expiry and revocation
//! - **Flat listing**: one row per certificate with a human "expiring in"
//! - **Token check**: verify the configured token and show its policies
//! - **Multiple output formats**: Pretty tables, JSON, CSV, YAML

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
