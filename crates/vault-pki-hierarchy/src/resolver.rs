//! The hierarchy resolver entry point.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use vault_pki_core::{
    canonical_serial, normalize_mount_path, HierarchyReport, PkiBackend, PkiMount, Warning,
};

use crate::assembler::assemble;
use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::issuer_cache::IssuerCache;
use crate::orchestrator::fetch_all;

/// Resolves the certificate hierarchy of PKI mounts.
///
/// Every call is an independent resolution: nothing is cached between calls.
pub struct HierarchyResolver<B> {
    backend: Arc<B>,
    config: ResolverConfig,
}

impl<B: PkiBackend + 'static> HierarchyResolver<B> {
    /// Create a resolver with the default configuration
    pub fn new(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create a resolver over a shared backend
    pub fn from_arc(backend: Arc<B>) -> Self {
        Self {
            backend,
            config: ResolverConfig::default(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Backend the resolver reads through
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// List the PKI mounts visible to the caller
    pub async fn list_pki_engines(&self) -> ResolveResult<Vec<PkiMount>> {
        Ok(self.backend.list_pki_mounts().await?)
    }

    /// Resolve every certificate under `mount` into the grouped hierarchy
    pub async fn resolve_all(&self, mount: &str) -> ResolveResult<HierarchyReport> {
        self.resolve_all_at(mount, Utc::now()).await
    }

    /// Resolve the hierarchy, judging expiry against `now`
    #[instrument(skip(self, now))]
    pub async fn resolve_all_at(
        &self,
        mount: &str,
        now: DateTime<Utc>,
    ) -> ResolveResult<HierarchyReport> {
        let mount = normalize_mount_path(mount)?;

        if self.config.verify_mount {
            self.verify_mount(&mount).await?;
        }

        let listed = self
            .backend
            .list_serials(&mount)
            .await
            .map_err(|e| ResolveError::from_list_error(&mount, e))?;
        info!(mount = %mount, count = listed.len(), "Listed certificates");

        let mut seen = HashSet::with_capacity(listed.len());
        let mut serials: Vec<String> = listed
            .into_iter()
            .filter(|serial| seen.insert(canonical_serial(serial)))
            .collect();

        let mut warnings = Vec::new();
        if let Some(limit) = self.config.limit {
            if serials.len() > limit {
                let skipped = serials.len() - limit;
                serials.truncate(limit);
                warnings.push(Warning::truncated(
                    &mount,
                    format!("result limit of {limit} reached; {skipped} certificates were not fetched"),
                ));
            }
        }

        let cache = Arc::new(IssuerCache::new(Arc::clone(&self.backend), mount.clone()));
        let fetched = fetch_all(Arc::clone(&cache), serials, &self.config, now).await;
        let (issuers, issuer_warnings) = cache.snapshot().await;
        let assembly = assemble(fetched.records, &issuers);

        warnings.extend(fetched.warnings);
        warnings.extend(issuer_warnings);
        warnings.extend(assembly.warnings);

        info!(
            mount = %mount,
            certificates = assembly.summary.total_certificates,
            roots = assembly.summary.root_count,
            intermediates = assembly.summary.intermediate_count,
            warnings = warnings.len(),
            "Resolved certificate hierarchy"
        );

        Ok(HierarchyReport {
            root_groups: assembly.root_groups,
            warnings,
            summary: assembly.summary,
        })
    }

    /// A missing or non-PKI mount is fatal when the mount table is readable.
    /// Without permission to read it, the listing call decides.
    async fn verify_mount(&self, mount: &str) -> ResolveResult<()> {
        match self.backend.list_pki_mounts().await {
            Ok(mounts) => {
                if mounts.iter().any(|m| m.path == mount) {
                    Ok(())
                } else {
                    Err(ResolveError::MountNotFound {
                        mount: mount.to_string(),
                        available: mounts.into_iter().map(|m| m.path).collect(),
                    })
                }
            }
            Err(e) if e.is_forbidden() || e.is_not_found() => {
                debug!(mount, error = %e, "Mount table unreadable; skipping verification");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
