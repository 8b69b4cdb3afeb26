//! PKI secrets engine endpoints.

use crate::VaultClient;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use vault_pki_core::{CertificateEntry, IssuerEntry, Result};

/// Endpoints of a single PKI mount
pub struct PkiApi<'a> {
    client: &'a VaultClient,
    mount: String,
}

impl<'a> PkiApi<'a> {
    pub(crate) fn new(client: &'a VaultClient, mount: String) -> Self {
        let mount = mount.trim_matches('/').to_string();
        Self { client, mount }
    }

    /// Mount path these endpoints are scoped to
    #[must_use]
    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// List the serial numbers of every certificate issued by the mount
    ///
    /// Requires `list` capability on `<mount>/certs`
    pub async fn list_certs(&self) -> Result<Vec<String>> {
        self.client.list(&format!("{}/certs", self.mount)).await
    }

    /// Read one certificate by serial number
    pub async fn read_cert(&self, serial: &str) -> Result<CertificateData> {
        self.client
            .read(&format!("{}/cert/{serial}", self.mount))
            .await
    }

    /// Read one issuer by identifier or name
    pub async fn read_issuer(&self, issuer_ref: &str) -> Result<IssuerData> {
        self.client
            .read(&format!("{}/issuer/{issuer_ref}", self.mount))
            .await
    }

    /// Read the mount's issuer configuration, including the default issuer
    pub async fn read_issuers_config(&self) -> Result<IssuersConfig> {
        self.client
            .read(&format!("{}/config/issuers", self.mount))
            .await
    }
}

/// Response data of `GET <mount>/cert/<serial>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificateData {
    /// PEM encoded certificate
    #[serde(default)]
    pub certificate: Option<String>,

    /// Revocation time in Unix seconds, `0` when not revoked.
    ///
    /// Vault has reported this as both a number and a string.
    #[serde(default)]
    pub revocation_time: Option<Value>,

    /// Revocation time as RFC 3339, empty when not revoked
    #[serde(default)]
    pub revocation_time_rfc3339: Option<String>,

    /// Identifier of the issuer that signed the certificate
    #[serde(default)]
    pub issuer_id: Option<String>,
}

impl CertificateData {
    /// When the certificate was revoked, if it was
    #[must_use]
    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        let secs = match self.revocation_time.as_ref()? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))?,
            Value::String(s) => s.trim().parse::<f64>().ok()? as i64,
            _ => return None,
        };

        if secs <= 0 {
            return None;
        }

        self.revocation_time_rfc3339
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
            .or_else(|| DateTime::from_timestamp(secs, 0))
    }

    /// Convert into the backend-neutral entry the resolver consumes
    #[must_use]
    pub fn into_entry(self) -> CertificateEntry {
        let revocation_time = self.revoked_at();
        CertificateEntry {
            certificate: self
                .certificate
                .filter(|pem| !pem.trim().is_empty())
                .map(String::into_bytes),
            issuer_ref: self.issuer_id.filter(|id| !id.is_empty()),
            revocation_time,
        }
    }
}

/// Response data of `GET <mount>/issuer/<ref>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuerData {
    /// Issuer identifier (UUID)
    #[serde(default)]
    pub issuer_id: String,

    /// Operator-assigned issuer name
    #[serde(default)]
    pub issuer_name: Option<String>,

    /// PEM encoded issuer certificate
    #[serde(default)]
    pub certificate: Option<String>,

    /// PEM encoded chain, issuer first and root last
    #[serde(default)]
    pub ca_chain: Vec<String>,
}

impl IssuerData {
    /// Convert into the backend-neutral entry the resolver consumes.
    ///
    /// `requested_ref` fills in the identifier when the response omits it.
    #[must_use]
    pub fn into_entry(self, requested_ref: &str) -> IssuerEntry {
        let issuer_ref = if self.issuer_id.is_empty() {
            requested_ref.to_string()
        } else {
            self.issuer_id
        };

        IssuerEntry {
            issuer_ref,
            issuer_name: self.issuer_name.filter(|n| !n.is_empty()),
            certificate: self.certificate.filter(|pem| !pem.trim().is_empty()),
            ca_chain: self
                .ca_chain
                .into_iter()
                .filter(|pem| !pem.trim().is_empty())
                .collect(),
        }
    }
}

/// Response data of `GET <mount>/config/issuers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuersConfig {
    /// Identifier of the default issuer
    #[serde(default)]
    pub default: Option<String>,

    /// Whether the default follows the most recently imported issuer
    #[serde(default)]
    pub default_follows_latest_issuer: bool,
}

impl IssuersConfig {
    /// The default issuer, if one is set
    #[must_use]
    pub fn default_issuer(&self) -> Option<&str> {
        self.default.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_revocation_time() {
        let data: CertificateData = serde_json::from_value(json!({
            "certificate": "-----BEGIN CERTIFICATE-----\n...",
            "revocation_time": 1_700_000_000,
            "revocation_time_rfc3339": "",
            "issuer_id": "b0b5c2a1"
        }))
        .unwrap();

        let revoked = data.revoked_at().unwrap();
        assert_eq!(revoked.timestamp(), 1_700_000_000);

        let entry = data.into_entry();
        assert_eq!(entry.issuer_ref.as_deref(), Some("b0b5c2a1"));
        assert!(entry.certificate.is_some());
    }

    #[test]
    fn string_revocation_time_prefers_rfc3339() {
        let data: CertificateData = serde_json::from_value(json!({
            "revocation_time": "1700000000",
            "revocation_time_rfc3339": "2023-11-14T22:13:20.5Z"
        }))
        .unwrap();
        let revoked = data.revoked_at().unwrap();
        assert_eq!(revoked.timestamp(), 1_700_000_000);
        assert_eq!(revoked.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn zero_revocation_time_is_not_revoked() {
        let data: CertificateData = serde_json::from_value(json!({
            "certificate": "pem",
            "revocation_time": 0,
            "issuer_id": ""
        }))
        .unwrap();
        assert!(data.revoked_at().is_none());

        let entry = data.into_entry();
        assert!(entry.issuer_ref.is_none());
        assert!(entry.revocation_time.is_none());
    }

    #[test]
    fn issuer_ref_falls_back_to_request() {
        let data: IssuerData = serde_json::from_value(json!({
            "certificate": "pem",
            "ca_chain": ["pem", ""]
        }))
        .unwrap();
        let entry = data.into_entry("root-2024");
        assert_eq!(entry.issuer_ref, "root-2024");
        assert_eq!(entry.ca_chain.len(), 1);
    }

    #[test]
    fn empty_default_issuer_is_none() {
        let config: IssuersConfig =
            serde_json::from_value(json!({"default": "", "default_follows_latest_issuer": false}))
                .unwrap();
        assert!(config.default_issuer().is_none());
    }
}
