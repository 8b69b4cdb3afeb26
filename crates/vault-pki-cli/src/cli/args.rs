//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Certificate hierarchy viewer for HashiCorp Vault PKI
///
/// Lists PKI secrets engines and shows every certificate under a mount,
/// grouped by the root and intermediate CA that issued it.
///
/// Connection settings come from flags, then VAULT_* environment
/// variables, then the config file (see `vault-pki config path`).
#[derive(Parser, Debug)]
#[command(name = "vault-pki")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault server address
    #[arg(short = 'a', long = "addr", env = "VAULT_ADDR", global = true)]
    pub address: Option<String>,

    /// Vault token
    #[arg(short = 't', long, env = "VAULT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Vault Enterprise namespace
    #[arg(short = 'n', long, env = "VAULT_NAMESPACE", global = true)]
    pub namespace: Option<String>,

    /// Skip TLS certificate verification (development only)
    #[arg(
        long,
        env = "VAULT_SKIP_VERIFY",
        value_parser = clap::builder::BoolishValueParser::new(),
        global = true
    )]
    pub skip_verify: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Maximum requests per second sent to Vault
    #[arg(long, value_name = "N", global = true)]
    pub rate_limit: Option<u32>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List mounted PKI secrets engines
    Engines(EnginesArgs),

    /// Show certificates grouped by root and intermediate CA
    #[command(alias = "tree")]
    Hierarchy(HierarchyArgs),

    /// Flat certificate listing with expiry and issuer names
    #[command(alias = "ls")]
    List(ListArgs),

    /// Verify the token and show what it can do
    #[command(alias = "whoami")]
    Status,

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Engines command
// ============================================================================

#[derive(Args, Debug)]
pub struct EnginesArgs {
    /// Also count the certificates stored under each engine
    #[arg(short, long)]
    pub count: bool,
}

// ============================================================================
// Resolution options shared by hierarchy and list
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Maximum certificate fetches in flight
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Give up on outstanding fetches after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Fetch at most this many certificates
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Skip checking the mount table before listing
    #[arg(long)]
    pub no_verify_mount: bool,

    /// Do not attribute issuer-less certificates to the default issuer
    #[arg(long)]
    pub no_default_issuer: bool,
}

// ============================================================================
// Hierarchy command
// ============================================================================

#[derive(Args, Debug)]
pub struct HierarchyArgs {
    /// PKI mount path (e.g. pki, pki_int)
    pub mount: String,

    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Hide revoked certificates in the pretty tree
    #[arg(long)]
    pub hide_revoked: bool,

    /// Hide expired certificates in the pretty tree
    #[arg(long)]
    pub hide_expired: bool,
}

// ============================================================================
// List command
// ============================================================================

#[derive(Args, Debug)]
pub struct ListArgs {
    /// PKI mount path (e.g. pki, pki_int)
    pub mount: String,

    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Only show certificates expiring within this many days
    #[arg(long, value_name = "DAYS")]
    pub expiring_within: Option<i64>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Remove a configuration value
    Unset {
        /// Configuration key
        key: String,
    },

    /// Show configuration file path
    Path,
}
