//! Bounded concurrent fetch-and-decode of every serial under a mount.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use vault_pki_core::{canonical_serial, CertificateRecord, PkiBackend, Warning};

use crate::config::ResolverConfig;
use crate::decoder::decode_record;
use crate::issuer_cache::IssuerCache;

/// Records and per-certificate warnings from one fan-out
#[derive(Debug, Default)]
pub struct FetchOutput {
    /// Decoded certificates, best-effort records included, sorted by serial
    pub records: Vec<CertificateRecord>,

    /// Per-certificate warnings, plus a `truncated` warning if the deadline hit
    pub warnings: Vec<Warning>,
}

enum Outcome {
    Decoded {
        record: CertificateRecord,
        warning: Option<Warning>,
    },
    Skipped(Warning),
}

/// Fetch, decode and resolve the issuer of every serial.
///
/// At most `config.concurrency` certificates are processed at once. When
/// `config.deadline` expires the remaining tasks are aborted, the finished
/// records are kept and a `truncated` warning is added.
pub async fn fetch_all<B>(
    cache: Arc<IssuerCache<B>>,
    serials: Vec<String>,
    config: &ResolverConfig,
    now: DateTime<Utc>,
) -> FetchOutput
where
    B: PkiBackend + 'static,
{
    let total = serials.len();
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let deadline = Instant::now() + config.deadline;
    let use_default_issuer = config.use_default_issuer;

    let mut tasks = JoinSet::new();
    let mut task_serials = HashMap::with_capacity(total);
    for serial in serials {
        let cache = Arc::clone(&cache);
        let semaphore = Arc::clone(&semaphore);
        let resource = canonical_serial(&serial);
        let handle = tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Outcome::Skipped(Warning::fetch_error(
                    canonical_serial(&serial),
                    "fetch cancelled",
                ));
            };
            fetch_one(&cache, &serial, use_default_issuer, now).await
        });
        task_serials.insert(handle.id(), resource);
    }

    let mut output = FetchOutput::default();
    loop {
        match tokio::time::timeout_at(deadline, tasks.join_next_with_id()).await {
            Ok(Some(Ok((_, Outcome::Decoded { record, warning })))) => {
                output.records.push(record);
                output.warnings.extend(warning);
            }
            Ok(Some(Ok((_, Outcome::Skipped(warning))))) => output.warnings.push(warning),
            Ok(Some(Err(e))) => {
                let resource = task_serials
                    .remove(&e.id())
                    .unwrap_or_else(|| cache.mount().to_string());
                warn!(serial = %resource, error = %e, "Certificate task failed");
                output.warnings.push(Warning::fetch_error(
                    resource,
                    format!("certificate task failed: {e}"),
                ));
            }
            Ok(None) => break,
            Err(_) => {
                let pending = tasks.len();
                tasks.abort_all();
                warn!(pending, total, "Deadline expired; abandoning in-flight fetches");
                output.warnings.push(Warning::truncated(
                    cache.mount(),
                    format!(
                        "deadline of {}s expired; {pending} of {total} certificates were not fetched",
                        config.deadline.as_secs_f64()
                    ),
                ));
                break;
            }
        }
    }

    output.records.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
    output
        .warnings
        .sort_by(|a, b| a.resource.cmp(&b.resource).then(a.kind.cmp(&b.kind)));

    info!(
        fetched = output.records.len(),
        total,
        warnings = output.warnings.len(),
        "Fetched certificates"
    );
    output
}

async fn fetch_one<B: PkiBackend>(
    cache: &IssuerCache<B>,
    serial: &str,
    use_default_issuer: bool,
    now: DateTime<Utc>,
) -> Outcome {
    debug!(serial, "Fetching certificate");

    let entry = match cache.backend().fetch_certificate(cache.mount(), serial).await {
        Ok(entry) => entry,
        Err(e) if e.is_forbidden() => {
            return Outcome::Skipped(Warning::permission_denied(
                canonical_serial(serial),
                e.to_string(),
            ));
        }
        Err(e) => {
            debug!(serial, error = %e, "Certificate fetch failed");
            return Outcome::Skipped(Warning::fetch_error(canonical_serial(serial), e.to_string()));
        }
    };

    let (mut record, warning) = decode_record(serial, &entry, now);

    if record.issuer_ref.is_none() && use_default_issuer {
        record.issuer_ref = cache.default_issuer().await;
    }

    if let Some(issuer_ref) = record.issuer_ref.as_deref() {
        cache.resolve(issuer_ref, &record.issuer_common_name).await;
    }

    Outcome::Decoded { record, warning }
}
