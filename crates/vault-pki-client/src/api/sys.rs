//! System backend endpoints.

use crate::VaultClient;
use serde_json::{Map, Value};
use tracing::debug;
use vault_pki_core::{PkiMount, Result};

/// System backend endpoints
pub struct SysApi<'a> {
    client: &'a VaultClient,
}

impl<'a> SysApi<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    /// List every mounted secrets engine, sorted by path
    pub async fn list_mounts(&self) -> Result<Vec<PkiMount>> {
        let body: Value = self.client.get("sys/mounts").await?;
        let mounts = parse_mounts(&body);
        debug!(count = mounts.len(), "Listed secrets engines");
        Ok(mounts)
    }

    /// List only the PKI secrets engines
    pub async fn list_pki_mounts(&self) -> Result<Vec<PkiMount>> {
        Ok(self
            .list_mounts()
            .await?
            .into_iter()
            .filter(|m| m.engine_type == PkiMount::ENGINE_TYPE)
            .collect())
    }
}

/// Newer servers nest the mount table under `data`; older ones return it at
/// the top level next to the response metadata. Entries that are not objects
/// with a `type` are skipped.
fn parse_mounts(body: &Value) -> Vec<PkiMount> {
    let empty = Map::new();
    let table = body
        .get("data")
        .and_then(Value::as_object)
        .or_else(|| body.as_object())
        .unwrap_or(&empty);

    let mut mounts: Vec<PkiMount> = table
        .iter()
        .filter_map(|(path, details)| {
            let details = details.as_object()?;
            let engine_type = details.get("type")?.as_str()?;
            let config = details.get("config");
            let ttl = |key: &str| config.and_then(|c| c.get(key)).and_then(Value::as_u64);

            let mut mount = PkiMount::new(path).description(
                details
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default(),
            );
            mount.engine_type = engine_type.to_string();
            mount.default_lease_ttl = ttl("default_lease_ttl");
            mount.max_lease_ttl = ttl("max_lease_ttl");
            Some(mount)
        })
        .collect();

    mounts.sort_by(|a, b| a.path.cmp(&b.path));
    mounts
}
