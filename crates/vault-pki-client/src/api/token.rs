//! Token endpoints.

use crate::VaultClient;
use serde::{Deserialize, Serialize};
use vault_pki_core::Result;

/// Token endpoints
pub struct TokenApi<'a> {
    client: &'a VaultClient,
}

impl<'a> TokenApi<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    /// Look up the calling token, verifying it is valid
    pub async fn lookup_self(&self) -> Result<TokenInfo> {
        self.client.read("auth/token/lookup-self").await
    }
}

/// Information about the calling token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Display name of the token
    #[serde(default)]
    pub display_name: String,

    /// Policies attached to the token
    #[serde(default)]
    pub policies: Vec<String>,

    /// Remaining time to live in seconds, `0` for non-expiring tokens
    #[serde(default)]
    pub ttl: u64,

    /// Expiry as RFC 3339
    #[serde(default)]
    pub expire_time: Option<String>,

    /// Whether the token can be renewed
    #[serde(default)]
    pub renewable: bool,

    /// Namespace the token was created in
    #[serde(default)]
    pub namespace_path: Option<String>,
}
