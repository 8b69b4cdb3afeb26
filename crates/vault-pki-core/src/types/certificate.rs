use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A certificate as returned by the backend, before decoding.
///
/// Every field the backend may omit is an explicit `Option`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateEntry {
    /// PEM (or DER) encoded certificate
    pub certificate: Option<Vec<u8>>,

    /// Backend identifier of the issuing authority
    pub issuer_ref: Option<String>,

    /// When the backend revoked this certificate
    pub revocation_time: Option<DateTime<Utc>>,
}

impl CertificateEntry {
    /// Create an entry from PEM text
    #[must_use]
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self {
            certificate: Some(pem.into().into_bytes()),
            ..Self::default()
        }
    }

    /// Set the issuer reference
    #[must_use]
    pub fn issuer(mut self, issuer_ref: impl Into<String>) -> Self {
        self.issuer_ref = Some(issuer_ref.into());
        self
    }

    /// Mark the certificate as revoked at the given time
    #[must_use]
    pub const fn revoked_at(mut self, at: DateTime<Utc>) -> Self {
        self.revocation_time = Some(at);
        self
    }
}

/// One decoded certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Lowercase colon-separated hex serial
    pub serial_number: String,

    /// Subject CN, or "Unknown"
    pub subject_common_name: String,

    /// Issuer CN as written in the certificate, or "Unknown"
    pub issuer_common_name: String,

    /// Backend identifier of the issuing authority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_ref: Option<String>,

    /// Not valid before
    #[serde(default)]
    pub not_before: Option<DateTime<Utc>>,

    /// Not valid after
    #[serde(default)]
    pub not_after: Option<DateTime<Utc>>,

    /// Whether `not_after` had passed when the certificate was evaluated
    pub is_expired: bool,

    /// Whether the backend reports the certificate as revoked
    pub is_revoked: bool,

    /// Revocation time (only when revoked)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl CertificateRecord {
    /// Returns true if the certificate carries a validity window
    #[must_use]
    pub const fn has_validity(&self) -> bool {
        self.not_before.is_some() && self.not_after.is_some()
    }

    /// Time left before expiry, or `None` if expired or the window is unknown
    #[must_use]
    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.not_after
            .filter(|not_after| *not_after >= now)
            .map(|not_after| not_after - now)
    }

    /// Whole days until expiry (negative once expired)
    #[must_use]
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.not_after.map(|not_after| (not_after - now).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(not_after: Option<DateTime<Utc>>) -> CertificateRecord {
        CertificateRecord {
            serial_number: "01:02".into(),
            subject_common_name: "leaf.example.com".into(),
            issuer_common_name: "Example Root".into(),
            issuer_ref: None,
            not_before: not_after.map(|t| t - Duration::days(90)),
            not_after,
            is_expired: false,
            is_revoked: false,
            revoked_at: None,
        }
    }

    #[test]
    fn expiry_arithmetic() {
        let now = Utc::now();
        let cert = record(Some(now + Duration::days(10) + Duration::hours(1)));
        assert_eq!(cert.days_until_expiry(now), Some(10));
        assert!(cert.time_until_expiry(now).is_some());

        let expired = record(Some(now - Duration::days(2)));
        assert_eq!(expired.days_until_expiry(now), Some(-2));
        assert!(expired.time_until_expiry(now).is_none());

        let unknown = record(None);
        assert!(!unknown.has_validity());
        assert_eq!(unknown.days_until_expiry(now), None);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(record(None)).unwrap();
        assert_eq!(json["serialNumber"], "01:02");
        assert_eq!(json["subjectCommonName"], "leaf.example.com");
        assert!(json["notAfter"].is_null());
        assert!(json.get("revokedAt").is_none());
        assert!(json.get("issuerRef").is_none());
    }
}
