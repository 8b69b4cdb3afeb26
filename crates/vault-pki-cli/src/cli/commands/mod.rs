//! Command implementations.

pub mod config;
pub mod engines;
pub mod hierarchy;
pub mod list;
pub mod status;

use std::time::Duration;

use vault_pki::{RateLimit, ResolverConfig, VaultClient, VaultConfig};

use super::args::ResolveArgs;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Vault server address
    pub address: Option<String>,

    /// Vault token
    pub token: Option<String>,

    /// Vault Enterprise namespace
    pub namespace: Option<String>,

    /// Skip TLS verification
    pub skip_verify: bool,

    /// Per-request timeout in seconds
    pub timeout: Option<u64>,

    /// Requests per second
    pub rate_limit: Option<u32>,

    /// Configured fetch concurrency
    pub concurrency: Option<usize>,

    /// Configured deadline in seconds
    pub deadline: Option<u64>,

    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,

    /// Disable colors
    pub no_color: bool,
}

impl Context {
    /// Connection settings, returning an error if address or token is missing.
    pub fn vault_config(&self) -> anyhow::Result<VaultConfig> {
        let address = self.address.as_deref().filter(|a| !a.is_empty()).ok_or_else(|| {
            anyhow::anyhow!(
                "Vault address required.\n\n\
                 Set it with one of:\n  \
                 1. --addr <URL>\n  \
                 2. VAULT_ADDR environment variable\n  \
                 3. vault-pki config set address <URL>"
            )
        })?;
        let token = self.token.as_deref().filter(|t| !t.is_empty()).ok_or_else(|| {
            anyhow::anyhow!(
                "Vault token required.\n\n\
                 Set it with one of:\n  \
                 1. --token <TOKEN>\n  \
                 2. VAULT_TOKEN environment variable\n  \
                 3. vault-pki config set token <TOKEN>"
            )
        })?;

        let mut config = VaultConfig::new(address, token);
        config.namespace.clone_from(&self.namespace);
        config.skip_verify = self.skip_verify;
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        config.rate_limit = self.rate_limit.filter(|n| *n > 0).map(RateLimit::per_second);
        Ok(config)
    }

    /// Create a Vault client from the resolved settings.
    pub fn client(&self) -> anyhow::Result<VaultClient> {
        Ok(VaultClient::from_config(&self.vault_config()?)?)
    }

    /// Resolver tuning: command flags, then the config file, then defaults.
    pub fn resolver_config(&self, args: &ResolveArgs) -> ResolverConfig {
        let mut config = ResolverConfig::default()
            .verify_mount(!args.no_verify_mount)
            .use_default_issuer(!args.no_default_issuer)
            .limit(args.limit);

        if let Some(n) = args.concurrency.or(self.concurrency) {
            config = config.concurrency(n);
        }
        if let Some(secs) = args.deadline.or(self.deadline) {
            config = config.deadline(Duration::from_secs(secs));
        }
        config
    }
}
