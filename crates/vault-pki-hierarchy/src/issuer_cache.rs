//! Request-scoped issuer resolution.
//!
//! Each issuer reference is fetched at most once per resolution. The map entry
//! is inserted before the fetch starts, so concurrent callers for the same
//! reference await the first fetch instead of issuing their own.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};
use vault_pki_core::{
    inactive_name, ChainEntry, IssuerEntry, IssuerRecord, PkiBackend, Warning, UNKNOWN_NAME,
};

use crate::decoder::chain_entry;

/// Outcome of resolving one issuer reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuerResolution {
    /// The issuer was read, or is known to have been deleted
    Resolved(IssuerRecord),

    /// The caller may not read the issuer
    Forbidden,

    /// The issuer could not be read for another reason
    Unavailable(String),
}

impl IssuerResolution {
    /// The resolved record, if any
    #[must_use]
    pub const fn record(&self) -> Option<&IssuerRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            _ => None,
        }
    }
}

/// Resolved issuers keyed by issuer reference
pub type IssuerLookup = HashMap<String, IssuerResolution>;

#[derive(Debug)]
struct CachedIssuer {
    resolution: IssuerResolution,
    warning: Option<Warning>,
}

/// Issuer cache for a single resolution of one mount
pub struct IssuerCache<B> {
    backend: Arc<B>,
    mount: String,
    entries: Mutex<HashMap<String, Arc<OnceCell<CachedIssuer>>>>,
    default_issuer: OnceCell<Option<String>>,
}

impl<B: PkiBackend> IssuerCache<B> {
    /// Create an empty cache for the mount
    pub fn new(backend: Arc<B>, mount: impl Into<String>) -> Self {
        Self {
            backend,
            mount: mount.into(),
            entries: Mutex::new(HashMap::new()),
            default_issuer: OnceCell::new(),
        }
    }

    /// Backend the cache reads through
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mount the cache is scoped to
    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Resolve an issuer reference, fetching it on first use.
    ///
    /// `issuer_common_name` is the issuer CN written in the referencing
    /// certificate; it names the issuer if the backend no longer holds it.
    pub async fn resolve(&self, issuer_ref: &str, issuer_common_name: &str) -> IssuerResolution {
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(issuer_ref.to_string()).or_default())
        };

        cell.get_or_init(|| self.fetch(issuer_ref, issuer_common_name))
            .await
            .resolution
            .clone()
    }

    async fn fetch(&self, issuer_ref: &str, issuer_common_name: &str) -> CachedIssuer {
        debug!(mount = %self.mount, issuer = issuer_ref, "Fetching issuer");

        match self.backend.fetch_issuer(&self.mount, issuer_ref).await {
            Ok(entry) => CachedIssuer {
                resolution: IssuerResolution::Resolved(active_record(entry, issuer_common_name)),
                warning: None,
            },
            Err(e) if e.is_not_found() => {
                let name = inactive_name(issuer_common_name);
                debug!(issuer = issuer_ref, name = %name, "Issuer no longer exists");
                CachedIssuer {
                    resolution: IssuerResolution::Resolved(IssuerRecord {
                        issuer_ref: issuer_ref.to_string(),
                        common_name: name,
                        chain_to_root: Vec::new(),
                        is_active: false,
                    }),
                    warning: Some(Warning::inactive_issuer(
                        issuer_ref,
                        "issuer no longer exists; its certificates are grouped under its last known name",
                    )),
                }
            }
            Err(e) if e.is_forbidden() => CachedIssuer {
                resolution: IssuerResolution::Forbidden,
                warning: Some(Warning::permission_denied(issuer_ref, e.to_string())),
            },
            Err(e) => {
                warn!(issuer = issuer_ref, error = %e, "Failed to fetch issuer");
                CachedIssuer {
                    resolution: IssuerResolution::Unavailable(e.to_string()),
                    warning: None,
                }
            }
        }
    }

    /// The mount's default issuer, read at most once per resolution.
    ///
    /// Any failure to read the configuration means there is no default.
    pub async fn default_issuer(&self) -> Option<String> {
        self.default_issuer
            .get_or_init(|| async {
                match self.backend.default_issuer(&self.mount).await {
                    Ok(default) => {
                        debug!(mount = %self.mount, default = ?default, "Read default issuer");
                        default
                    }
                    Err(e) => {
                        debug!(mount = %self.mount, error = %e, "Default issuer unavailable");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Every settled resolution plus the issuer warnings, one per reference.
    ///
    /// Fetches abandoned before they settled are absent.
    pub async fn snapshot(&self) -> (IssuerLookup, Vec<Warning>) {
        let entries = self.entries.lock().await;

        let mut lookup = IssuerLookup::with_capacity(entries.len());
        let mut warnings = Vec::new();
        for (issuer_ref, cell) in entries.iter() {
            if let Some(cached) = cell.get() {
                lookup.insert(issuer_ref.clone(), cached.resolution.clone());
                warnings.extend(cached.warning.clone());
            }
        }

        warnings.sort_by(|a, b| a.resource.cmp(&b.resource));
        (lookup, warnings)
    }
}

fn active_record(entry: IssuerEntry, fallback_name: &str) -> IssuerRecord {
    let own = entry.certificate.as_deref().map(chain_entry);

    let common_name = own
        .as_ref()
        .map(|e| e.common_name.clone())
        .filter(|cn| cn != UNKNOWN_NAME)
        .or(entry.issuer_name)
        .unwrap_or_else(|| fallback_name.to_string());

    let mut chain_to_root: Vec<ChainEntry> = entry.ca_chain.iter().map(|pem| chain_entry(pem)).collect();
    if chain_to_root.is_empty() {
        chain_to_root.push(own.unwrap_or_else(|| ChainEntry {
            common_name: common_name.clone(),
            serial_number: None,
        }));
    }

    IssuerRecord {
        issuer_ref: entry.issuer_ref,
        common_name,
        chain_to_root,
        is_active: true,
    }
}
