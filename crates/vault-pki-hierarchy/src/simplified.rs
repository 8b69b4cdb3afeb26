//! A flat, human-oriented listing derived from the hierarchy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use vault_pki_core::{CertificateRecord, HierarchyReport, Warning};

/// The flat listing plus the warnings raised while resolving it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedList {
    /// One entry per certificate, in tree order
    pub certificates: Vec<SimplifiedCertificate>,

    /// Same warnings as the report the list was derived from
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

/// One certificate in the flat listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedCertificate {
    /// Lowercase colon-separated serial
    pub serial_number: String,

    /// Subject CN
    pub subject_common_name: String,

    /// `"yes"` or `"no"`
    pub expired: String,

    /// `"yes"` or `"no"`
    pub revoked: String,

    /// Time left before expiry, absent once expired or when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiring_in: Option<String>,

    /// Issuer names, intermediate first then root
    pub issuers: Vec<String>,
}

/// Flatten a report into one entry per certificate, in tree order
pub fn simplified_list(report: &HierarchyReport, now: DateTime<Utc>) -> SimplifiedList {
    let mut list = Vec::with_capacity(report.summary.total_certificates);

    for root in &report.root_groups {
        for group in &root.intermediate_groups {
            for cert in &group.certificates {
                list.push(simplify(
                    cert,
                    vec![
                        group.intermediate_common_name.clone(),
                        root.root_common_name.clone(),
                    ],
                    now,
                ));
            }
        }
        for cert in &root.direct_certificates {
            list.push(simplify(cert, vec![root.root_common_name.clone()], now));
        }
    }

    SimplifiedList {
        certificates: list,
        warnings: report.warnings.clone(),
    }
}

fn simplify(cert: &CertificateRecord, issuers: Vec<String>, now: DateTime<Utc>) -> SimplifiedCertificate {
    let expiring_in = if cert.is_expired {
        None
    } else {
        cert.time_until_expiry(now)
            .filter(|left| *left > Duration::zero())
            .map(format_expiring_in)
    };

    SimplifiedCertificate {
        serial_number: cert.serial_number.clone(),
        subject_common_name: cert.subject_common_name.clone(),
        expired: yes_no(cert.is_expired),
        revoked: yes_no(cert.is_revoked),
        expiring_in,
        issuers,
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

/// `"N days"` when at least a day remains, otherwise `"Hh Mm"`
pub fn format_expiring_in(left: Duration) -> String {
    let days = left.num_days();
    if days >= 1 {
        format!("{days} day{}", if days == 1 { "" } else { "s" })
    } else {
        let minutes = left.num_minutes();
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}
