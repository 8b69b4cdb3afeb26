//! Configuration management.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Environment variable overriding the config file location
pub const ENV_CONFIG_PATH: &str = "VAULT_PKI_CONFIG";

/// Keys accepted by `config set` and `config unset`
pub const KEYS: &[(&str, &str)] = &[
    ("address", "Vault server address (https://vault.example.com:8200)"),
    ("token", "Vault token (prefer VAULT_TOKEN)"),
    ("namespace", "Vault Enterprise namespace"),
    ("skip_verify", "Skip TLS verification (true/false)"),
    ("output_format", "Default output format (pretty/json/csv/yaml)"),
    ("concurrency", "Certificate fetches in flight"),
    ("deadline", "Resolution deadline in seconds"),
    ("timeout", "Per-request timeout in seconds"),
    ("rate_limit", "Maximum requests per second"),
];

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Vault server address.
    pub address: Option<String>,

    /// Vault token.
    pub token: Option<String>,

    /// Vault Enterprise namespace.
    pub namespace: Option<String>,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub skip_verify: bool,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Certificate fetches in flight.
    pub concurrency: Option<usize>,

    /// Resolution deadline in seconds.
    pub deadline: Option<u64>,

    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,

    /// Requests per second.
    pub rate_limit: Option<u32>,
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("io", "vault-pki", "vault-pki")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from a specific file, defaulting when it is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Set one key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "address" | "addr" => self.address = Some(value.trim_end_matches('/').to_string()),
            "token" => self.token = Some(value.to_string()),
            "namespace" => self.namespace = Some(value.to_string()),
            "skip_verify" => self.skip_verify = value.parse()?,
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "concurrency" => {
                let n: usize = value.parse()?;
                anyhow::ensure!(n > 0, "concurrency must be at least 1");
                self.concurrency = Some(n);
            }
            "deadline" => self.deadline = Some(value.parse()?),
            "timeout" => self.timeout = Some(value.parse()?),
            "rate_limit" => self.rate_limit = Some(value.parse()?),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Clear one key back to its default.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        match key {
            "address" | "addr" => self.address = None,
            "token" => self.token = None,
            "namespace" => self.namespace = None,
            "skip_verify" => self.skip_verify = false,
            "output_format" | "output" => self.output_format = None,
            "concurrency" => self.concurrency = None,
            "deadline" => self.deadline = None,
            "timeout" => self.timeout = None,
            "rate_limit" => self.rate_limit = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    let keys = KEYS
        .iter()
        .map(|(name, help)| format!("  {name:<14} - {help}"))
        .collect::<Vec<_>>()
        .join("\n");
    anyhow::anyhow!("Unknown config key: {key}\n\nAvailable keys:\n{keys}")
}

/// Mask a secret, keeping a short prefix and suffix.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}
