use serde::{Deserialize, Serialize};

use super::{CertificateRecord, Warning};

/// Certificates issued by one intermediate CA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateGroup {
    /// CN of the intermediate CA
    pub intermediate_common_name: String,

    /// Backend identifier of the intermediate, unset when inactive
    pub intermediate_issuer_ref: Option<String>,

    /// Certificates issued by this intermediate
    pub certificates: Vec<CertificateRecord>,
}

/// Everything chaining up to one root CA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootGroup {
    /// CN of the root CA
    pub root_common_name: String,

    /// Backend identifier of the root, unset when inactive or unresolvable
    pub root_issuer_ref: Option<String>,

    /// Intermediates under this root
    pub intermediate_groups: Vec<IntermediateGroup>,

    /// Certificates issued by the root itself
    pub direct_certificates: Vec<CertificateRecord>,
}

impl RootGroup {
    /// Number of certificates anywhere under this root
    #[must_use]
    pub fn certificate_count(&self) -> usize {
        self.direct_certificates.len()
            + self
                .intermediate_groups
                .iter()
                .map(|group| group.certificates.len())
                .sum::<usize>()
    }

    /// Iterate every certificate under this root
    pub fn certificates(&self) -> impl Iterator<Item = &CertificateRecord> {
        self.direct_certificates.iter().chain(
            self.intermediate_groups
                .iter()
                .flat_map(|group| group.certificates.iter()),
        )
    }
}

/// Counters folded over a finished tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Certificates in the tree
    pub total_certificates: usize,
    /// Certificates past their `not_after`
    pub expired_count: usize,
    /// Revoked certificates
    pub revoked_count: usize,
    /// Root groups
    pub root_count: usize,
    /// Intermediate groups across all roots
    pub intermediate_count: usize,
}

impl Summary {
    /// Fold the counters over a tree
    #[must_use]
    pub fn from_tree(root_groups: &[RootGroup]) -> Self {
        root_groups.iter().fold(
            Self {
                root_count: root_groups.len(),
                ..Self::default()
            },
            |mut summary, root| {
                summary.intermediate_count += root.intermediate_groups.len();
                for cert in root.certificates() {
                    summary.total_certificates += 1;
                    summary.expired_count += usize::from(cert.is_expired);
                    summary.revoked_count += usize::from(cert.is_revoked);
                }
                summary
            },
        )
    }
}

/// The complete result of one resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyReport {
    /// Root groups, ordered by CN
    pub root_groups: Vec<RootGroup>,

    /// Recoverable anomalies, in the order they were recorded
    pub warnings: Vec<Warning>,

    /// Counters over `root_groups`
    pub summary: Summary,
}

impl HierarchyReport {
    /// Iterate every certificate in the tree
    pub fn certificates(&self) -> impl Iterator<Item = &CertificateRecord> {
        self.root_groups.iter().flat_map(RootGroup::certificates)
    }

    /// Returns true if the tree holds no certificates and nothing went wrong
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root_groups.is_empty() && self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(serial: &str, expired: bool, revoked: bool) -> CertificateRecord {
        CertificateRecord {
            serial_number: serial.into(),
            subject_common_name: format!("{serial}.example.com"),
            issuer_common_name: "CA".into(),
            issuer_ref: None,
            not_before: None,
            not_after: None,
            is_expired: expired,
            is_revoked: revoked,
            revoked_at: None,
        }
    }

    #[test]
    fn summary_folds_over_every_leaf_position() {
        let tree = vec![
            RootGroup {
                root_common_name: "Root A".into(),
                root_issuer_ref: Some("root-a".into()),
                intermediate_groups: vec![
                    IntermediateGroup {
                        intermediate_common_name: "Int 1".into(),
                        intermediate_issuer_ref: Some("int-1".into()),
                        certificates: vec![cert("01", true, true), cert("02", false, false)],
                    },
                    IntermediateGroup {
                        intermediate_common_name: "Int 2".into(),
                        intermediate_issuer_ref: None,
                        certificates: vec![cert("03", false, true)],
                    },
                ],
                direct_certificates: vec![cert("04", true, false)],
            },
            RootGroup {
                root_common_name: "Unknown Root".into(),
                root_issuer_ref: None,
                intermediate_groups: Vec::new(),
                direct_certificates: vec![cert("05", false, false)],
            },
        ];

        let summary = Summary::from_tree(&tree);
        assert_eq!(
            summary,
            Summary {
                total_certificates: 5,
                expired_count: 2,
                revoked_count: 2,
                root_count: 2,
                intermediate_count: 2,
            }
        );
        assert_eq!(tree[0].certificate_count(), 4);
    }

    #[test]
    fn empty_report_serializes_with_zero_counters() {
        let report = HierarchyReport::default();
        assert!(report.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rootGroups"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["warnings"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["summary"]["totalCertificates"], 0);
        assert_eq!(json["summary"]["intermediateCount"], 0);
    }
}
