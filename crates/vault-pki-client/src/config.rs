//! Client configuration types.

use std::time::Duration;

use vault_pki_core::{Result, VaultPkiError};

/// Environment variable holding the Vault address
pub const ENV_ADDR: &str = "VAULT_ADDR";
/// Environment variable holding the Vault token
pub const ENV_TOKEN: &str = "VAULT_TOKEN";
/// Environment variable holding the Vault Enterprise namespace
pub const ENV_NAMESPACE: &str = "VAULT_NAMESPACE";
/// Environment variable disabling TLS verification
pub const ENV_SKIP_VERIFY: &str = "VAULT_SKIP_VERIFY";

/// Connection settings for a Vault server
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Server address (e.g. `https://vault.example.com:8200`)
    pub address: String,

    /// Authentication token
    pub token: String,

    /// Vault Enterprise namespace
    pub namespace: Option<String>,

    /// Skip TLS certificate verification (development only)
    pub skip_verify: bool,

    /// Per-request timeout
    pub timeout: Duration,

    /// Client-side request rate limit
    pub rate_limit: Option<RateLimit>,
}

impl VaultConfig {
    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a configuration for the given address and token
    #[must_use]
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            namespace: None,
            skip_verify: false,
            timeout: Self::DEFAULT_TIMEOUT,
            rate_limit: None,
        }
    }

    /// Read `VAULT_ADDR`, `VAULT_TOKEN`, `VAULT_NAMESPACE` and `VAULT_SKIP_VERIFY`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup (environment, config file, ...)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let address = lookup(ENV_ADDR)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                VaultPkiError::Config(format!(
                    "{ENV_ADDR} is not set; set it to your Vault server address \
                     (e.g. https://vault.example.com:8200)"
                ))
            })?;

        let token = lookup(ENV_TOKEN)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                VaultPkiError::Config(format!(
                    "{ENV_TOKEN} is not set; set it to a valid Vault token"
                ))
            })?;

        let mut config = Self::new(address, token);
        config.namespace = lookup(ENV_NAMESPACE).filter(|v| !v.is_empty());
        config.skip_verify = lookup(ENV_SKIP_VERIFY).is_some_and(|v| parse_flag(&v));
        Ok(config)
    }
}

/// Requests-per-second budget applied before every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Sustained requests per second
    pub per_second: u32,

    /// Requests allowed in a burst
    pub burst: u32,
}

impl RateLimit {
    /// Limit to `per_second` requests with an equal burst
    #[must_use]
    pub const fn per_second(per_second: u32) -> Self {
        Self {
            per_second,
            burst: per_second,
        }
    }

    /// Set the burst size
    #[must_use]
    pub const fn burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_all_settings() {
        let config = VaultConfig::from_lookup(lookup(&[
            (ENV_ADDR, "https://vault.example.com:8200"),
            (ENV_TOKEN, "hvs.test"),
            (ENV_NAMESPACE, "admin"),
            (ENV_SKIP_VERIFY, "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.address, "https://vault.example.com:8200");
        assert_eq!(config.token, "hvs.test");
        assert_eq!(config.namespace.as_deref(), Some("admin"));
        assert!(config.skip_verify);
        assert_eq!(config.timeout, VaultConfig::DEFAULT_TIMEOUT);
    }

    #[test]
    fn missing_address_or_token_is_a_config_error() {
        let err = VaultConfig::from_lookup(lookup(&[(ENV_TOKEN, "hvs.test")])).unwrap_err();
        assert!(matches!(err, VaultPkiError::Config(ref msg) if msg.contains(ENV_ADDR)));

        let err = VaultConfig::from_lookup(lookup(&[(ENV_ADDR, "http://127.0.0.1:8200")]))
            .unwrap_err();
        assert!(matches!(err, VaultPkiError::Config(ref msg) if msg.contains(ENV_TOKEN)));
    }

    #[test]
    fn empty_namespace_is_ignored() {
        let config = VaultConfig::from_lookup(lookup(&[
            (ENV_ADDR, "http://127.0.0.1:8200"),
            (ENV_TOKEN, "root"),
            (ENV_NAMESPACE, ""),
            (ENV_SKIP_VERIFY, "false"),
        ]))
        .unwrap();
        assert!(config.namespace.is_none());
        assert!(!config.skip_verify);
    }
}
