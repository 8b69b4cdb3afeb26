//! X.509 certificate decoding.

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;
use vault_pki_core::{
    canonical_serial, CertificateEntry, CertificateRecord, ChainEntry, Warning, UNKNOWN_NAME,
};
use x509_parser::certificate::X509Certificate;
use x509_parser::x509::X509Name;

use crate::error::DecodeError;

/// The fields extracted from one X.509 certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    /// Subject CN, if present
    pub subject_common_name: Option<String>,
    /// Issuer CN, if present
    pub issuer_common_name: Option<String>,
    /// Lowercase colon-separated serial from the certificate itself
    pub serial_number: String,
    /// Start of the validity window
    pub not_before: Option<DateTime<Utc>>,
    /// End of the validity window
    pub not_after: Option<DateTime<Utc>>,
}

/// Parse PEM or DER certificate bytes.
///
/// PEM input may hold several blocks; the first `CERTIFICATE` block wins.
pub fn parse_certificate(bytes: &[u8]) -> Result<ParsedCertificate, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Missing);
    }

    if looks_like_pem(bytes) {
        let pems = pem::parse_many(bytes).map_err(|e| DecodeError::Pem(e.to_string()))?;
        let block = pems
            .iter()
            .find(|p| p.tag() == "CERTIFICATE")
            .ok_or(DecodeError::NoCertificateBlock)?;
        parse_der(block.contents())
    } else {
        parse_der(bytes)
    }
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"-----BEGIN")
}

fn parse_der(der: &[u8]) -> Result<ParsedCertificate, DecodeError> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| DecodeError::X509(e.to_string()))?;
    Ok(extract(&cert))
}

fn extract(cert: &X509Certificate<'_>) -> ParsedCertificate {
    let validity = cert.validity();
    ParsedCertificate {
        subject_common_name: common_name(cert.subject()),
        issuer_common_name: common_name(cert.issuer()),
        serial_number: cert.raw_serial_as_string(),
        not_before: asn1_to_utc(validity.not_before),
        not_after: asn1_to_utc(validity.not_after),
    }
}

fn common_name(name: &X509Name<'_>) -> Option<String> {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::trim)
        .filter(|cn| !cn.is_empty())
        .map(String::from)
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(t.timestamp(), 0).single()
}

/// Decode one backend certificate into a record.
///
/// Never fails: bytes that cannot be decoded yield a best-effort record with
/// `"Unknown"` names and no validity window, plus a `decode-error` warning
/// naming the serial. A validity window whose end does not follow its start is
/// dropped with a warning.
pub fn decode_record(
    serial: &str,
    entry: &CertificateEntry,
    now: DateTime<Utc>,
) -> (CertificateRecord, Option<Warning>) {
    let serial_number = canonical_serial(serial);
    let revoked_at = entry.revocation_time;

    let parsed = entry
        .certificate
        .as_deref()
        .ok_or(DecodeError::Missing)
        .and_then(parse_certificate);

    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(serial = %serial_number, error = %err, "Certificate could not be decoded");
            let record = CertificateRecord {
                serial_number: serial_number.clone(),
                subject_common_name: UNKNOWN_NAME.to_string(),
                issuer_common_name: UNKNOWN_NAME.to_string(),
                issuer_ref: entry.issuer_ref.clone(),
                not_before: None,
                not_after: None,
                is_expired: false,
                is_revoked: false,
                revoked_at: None,
            };
            return (record, Some(Warning::decode_error(serial_number, err.to_string())));
        }
    };

    let (not_before, not_after, warning) = match (parsed.not_before, parsed.not_after) {
        (Some(start), Some(end)) if end <= start => (
            None,
            None,
            Some(Warning::decode_error(
                serial_number.clone(),
                format!("validity window ends ({end}) before it starts ({start})"),
            )),
        ),
        (start, end) => (start, end, None),
    };

    let record = CertificateRecord {
        serial_number,
        subject_common_name: parsed
            .subject_common_name
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        issuer_common_name: parsed
            .issuer_common_name
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        issuer_ref: entry.issuer_ref.clone(),
        not_before,
        not_after,
        is_expired: not_after.is_some_and(|end| now > end),
        is_revoked: revoked_at.is_some(),
        revoked_at,
    };

    (record, warning)
}

/// Decode one PEM from an issuer's chain into a chain identity
pub fn chain_entry(pem: &str) -> ChainEntry {
    match parse_certificate(pem.as_bytes()) {
        Ok(parsed) => ChainEntry {
            common_name: parsed
                .subject_common_name
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            serial_number: Some(parsed.serial_number),
        },
        Err(err) => {
            debug!(error = %err, "Chain certificate could not be decoded");
            ChainEntry {
                common_name: UNKNOWN_NAME.to_string(),
                serial_number: None,
            }
        }
    }
}
