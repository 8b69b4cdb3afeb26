use serde::{Deserialize, Serialize};

/// A mounted PKI secrets engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkiMount {
    /// Mount path without a trailing slash (e.g. `pki`, `pki_int`)
    pub path: String,

    /// Engine type, always `pki`
    #[serde(rename = "type")]
    pub engine_type: String,

    /// Operator description of the mount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default lease TTL in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_lease_ttl: Option<u64>,

    /// Maximum lease TTL in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lease_ttl: Option<u64>,
}

impl PkiMount {
    /// Engine type reported by Vault for PKI mounts
    pub const ENGINE_TYPE: &'static str = "pki";

    /// Create a mount entry, trimming any trailing slash from the path
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: path.trim_end_matches('/').to_string(),
            engine_type: Self::ENGINE_TYPE.to_string(),
            description: None,
            default_lease_ttl: None,
            max_lease_ttl: None,
        }
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }
}
