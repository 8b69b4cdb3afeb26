//! Folds decoded certificates and resolved issuers into the root/intermediate tree.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use vault_pki_core::{
    inactive_name, CertificateRecord, IntermediateGroup, RootGroup, Summary, Warning,
    INACTIVE_SUFFIX, UNKNOWN_NAME, UNKNOWN_ROOT,
};

use crate::issuer_cache::{IssuerLookup, IssuerResolution};

/// The finished tree with its counters and placement warnings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    /// Root groups, sorted by common name
    pub root_groups: Vec<RootGroup>,

    /// Counters over `root_groups`
    pub summary: Summary,

    /// One `missing-issuer` warning per orphaned certificate
    pub warnings: Vec<Warning>,
}

/// Where a certificate lands in the tree
enum Placement {
    Direct {
        root: String,
        root_ref: Option<String>,
    },
    Intermediate {
        root: String,
        root_ref: Option<String>,
        intermediate: String,
        intermediate_ref: Option<String>,
    },
    Orphan(String),
}

#[derive(Default)]
struct RootBuilder {
    issuer_ref: Option<String>,
    intermediates: BTreeMap<String, IntermediateGroup>,
    direct: Vec<CertificateRecord>,
}

/// Build the hierarchy from decoded certificates and the issuers they reference.
///
/// Every record lands in exactly one leaf position. Root and intermediate
/// groups are ordered by common name, certificates by serial.
pub fn assemble(records: Vec<CertificateRecord>, issuers: &IssuerLookup) -> Assembly {
    let root_refs = root_refs(issuers);
    let subjects = subjects(&records);
    let inactive = inactive_names(&records, issuers);

    let mut roots: BTreeMap<String, RootBuilder> = BTreeMap::new();
    let mut warnings = Vec::new();

    for record in records {
        let placement = place(&record, issuers, &inactive, &root_refs, &subjects);

        match placement {
            Placement::Direct { root, root_ref } => {
                let group = root_group(&mut roots, root, root_ref);
                group.direct.push(record);
            }
            Placement::Intermediate {
                root,
                root_ref,
                intermediate,
                intermediate_ref,
            } => {
                let group = root_group(&mut roots, root, root_ref);
                let int = group
                    .intermediates
                    .entry(intermediate.clone())
                    .or_insert_with(|| IntermediateGroup {
                        intermediate_common_name: intermediate,
                        intermediate_issuer_ref: None,
                        certificates: Vec::new(),
                    });
                if int.intermediate_issuer_ref.is_none() {
                    int.intermediate_issuer_ref = intermediate_ref;
                }
                int.certificates.push(record);
            }
            Placement::Orphan(reason) => {
                debug!(serial = %record.serial_number, reason = %reason, "Orphaned certificate");
                warnings.push(Warning::missing_issuer(&record.serial_number, reason));
                let group = root_group(&mut roots, UNKNOWN_ROOT.to_string(), None);
                group.direct.push(record);
            }
        }
    }

    let root_groups: Vec<RootGroup> = roots
        .into_iter()
        .map(|(name, builder)| {
            let mut direct = builder.direct;
            direct.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
            RootGroup {
                root_common_name: name,
                root_issuer_ref: builder.issuer_ref,
                intermediate_groups: builder
                    .intermediates
                    .into_values()
                    .map(|mut group| {
                        group
                            .certificates
                            .sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
                        group
                    })
                    .collect(),
                direct_certificates: direct,
            }
        })
        .collect();

    let summary = Summary::from_tree(&root_groups);
    Assembly {
        root_groups,
        summary,
        warnings,
    }
}

fn root_group(
    roots: &mut BTreeMap<String, RootBuilder>,
    name: String,
    issuer_ref: Option<String>,
) -> &mut RootBuilder {
    let group = roots.entry(name).or_default();
    if group.issuer_ref.is_none() {
        group.issuer_ref = issuer_ref;
    }
    group
}

/// Issuer references of active roots, by common name
fn root_refs(issuers: &IssuerLookup) -> HashMap<&str, &str> {
    let mut refs: Vec<(&str, &str)> = issuers
        .values()
        .filter_map(IssuerResolution::record)
        .filter(|issuer| issuer.is_active && issuer.is_root())
        .map(|issuer| (issuer.common_name.as_str(), issuer.issuer_ref.as_str()))
        .collect();
    // first reference in sort order wins when two roots share a CN
    refs.sort_unstable();
    let mut map = HashMap::new();
    for (cn, issuer_ref) in refs {
        map.entry(cn).or_insert(issuer_ref);
    }
    map
}

/// Issuer CN of each certificate in the stream, by subject CN
fn subjects(records: &[CertificateRecord]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for record in records {
        if record.subject_common_name != UNKNOWN_NAME {
            map.entry(record.subject_common_name.clone())
                .or_insert_with(|| record.issuer_common_name.clone());
        }
    }
    map
}

/// Group names for inactive issuers, taken from the lowest serial that
/// still carries a decoded issuer CN
fn inactive_names(records: &[CertificateRecord], issuers: &IssuerLookup) -> HashMap<String, String> {
    let mut named: HashMap<&str, &CertificateRecord> = HashMap::new();
    for record in records {
        let Some(issuer_ref) = record.issuer_ref.as_deref() else {
            continue;
        };
        let is_inactive = matches!(
            issuers.get(issuer_ref),
            Some(IssuerResolution::Resolved(issuer)) if !issuer.is_active
        );
        if !is_inactive || record.issuer_common_name == UNKNOWN_NAME {
            continue;
        }
        named
            .entry(issuer_ref)
            .and_modify(|first| {
                if record.serial_number < first.serial_number {
                    *first = record;
                }
            })
            .or_insert(record);
    }

    named
        .into_iter()
        .map(|(issuer_ref, record)| {
            (issuer_ref.to_string(), inactive_name(&record.issuer_common_name))
        })
        .collect()
}

fn place(
    record: &CertificateRecord,
    issuers: &IssuerLookup,
    inactive: &HashMap<String, String>,
    root_refs: &HashMap<&str, &str>,
    subjects: &HashMap<String, String>,
) -> Placement {
    let Some(issuer_ref) = record.issuer_ref.as_deref() else {
        return Placement::Orphan("certificate names no issuer".into());
    };

    let issuer = match issuers.get(issuer_ref) {
        Some(IssuerResolution::Resolved(issuer)) => issuer,
        Some(IssuerResolution::Forbidden) => {
            return Placement::Orphan(format!("permission denied reading issuer {issuer_ref}"));
        }
        Some(IssuerResolution::Unavailable(cause)) => {
            return Placement::Orphan(format!("issuer {issuer_ref} could not be read: {cause}"));
        }
        None => return Placement::Orphan(format!("issuer {issuer_ref} was not resolved")),
    };

    if !issuer.is_active {
        let name = inactive
            .get(issuer_ref)
            .map_or(issuer.common_name.as_str(), String::as_str);
        return place_inactive(name, root_refs, subjects);
    }

    match issuer.chain_to_root.as_slice() {
        [] | [_] => Placement::Direct {
            root: issuer.common_name.clone(),
            root_ref: Some(issuer.issuer_ref.clone()),
        },
        [.., root] => Placement::Intermediate {
            root: root.common_name.clone(),
            root_ref: root_refs.get(root.common_name.as_str()).map(|r| (*r).to_string()),
            intermediate: issuer.common_name.clone(),
            intermediate_ref: Some(issuer.issuer_ref.clone()),
        },
    }
}

/// An inactive issuer is an intermediate when its own certificate is in the
/// stream and was issued by someone else; otherwise it stands as a root.
fn place_inactive(
    name: &str,
    root_refs: &HashMap<&str, &str>,
    subjects: &HashMap<String, String>,
) -> Placement {
    let base = name
        .strip_suffix(INACTIVE_SUFFIX)
        .map_or(name, str::trim_end);

    let parent = subjects
        .get(base)
        .map(String::as_str)
        .filter(|parent| *parent != base && *parent != UNKNOWN_NAME);

    match parent {
        Some(parent) => Placement::Intermediate {
            root: parent.to_string(),
            root_ref: root_refs.get(parent).map(|r| (*r).to_string()),
            intermediate: name.to_string(),
            intermediate_ref: None,
        },
        None => Placement::Direct {
            root: name.to_string(),
            root_ref: None,
        },
    }
}
