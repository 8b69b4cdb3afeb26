//! `vault-pki engines` - List mounted PKI secrets engines.

use anyhow::Result;
use colored::Colorize;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;
use vault_pki::{HierarchyResolver, PkiMount, ResolverConfig, VaultClient};

use super::Context;
use crate::cli::args::EnginesArgs;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct EngineRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Certificates", display_with = "display_count")]
    #[serde(skip_serializing_if = "Option::is_none")]
    certificates: Option<String>,
}

#[allow(clippy::ref_option)]
fn display_count(count: &Option<String>) -> String {
    count.clone().unwrap_or_else(|| "-".to_string())
}

pub async fn execute(ctx: Context, args: EnginesArgs) -> Result<()> {
    let resolver = HierarchyResolver::new(ctx.client()?);
    let mounts = resolver.list_pki_engines().await?;
    debug!(count = mounts.len(), "Listed PKI engines");

    let counts = if args.count {
        let concurrency = ctx
            .concurrency
            .unwrap_or(ResolverConfig::DEFAULT_CONCURRENCY);
        Some(count_certificates(resolver.backend(), &mounts, concurrency).await)
    } else {
        None
    };

    let rows: Vec<EngineRow> = mounts
        .iter()
        .enumerate()
        .map(|(i, mount)| EngineRow {
            path: mount.path.clone(),
            description: mount.description.clone().unwrap_or_default(),
            certificates: counts.as_ref().and_then(|c| c.get(i).cloned()),
        })
        .collect();

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&rows)?,
        OutputFormat::Yaml => output::print_yaml(&rows)?,
        OutputFormat::Csv => output::print_csv(&rows)?,
        OutputFormat::Pretty => print_engines_pretty(&rows),
    }

    Ok(())
}

/// Count serials per mount, `"denied"` or `"error"` when a listing fails.
async fn count_certificates(
    client: &VaultClient,
    mounts: &[PkiMount],
    concurrency: usize,
) -> Vec<String> {
    let mut counts: Vec<(usize, String)> = stream::iter(mounts.iter().enumerate())
        .map(|(i, mount)| async move {
            let count = match client.pki(&mount.path).list_certs().await {
                Ok(serials) => serials.len().to_string(),
                Err(e) if e.is_forbidden() => "denied".to_string(),
                Err(e) => {
                    debug!(mount = %mount.path, error = %e, "Could not list certificates");
                    "error".to_string()
                }
            };
            (i, count)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    counts.sort_by_key(|(i, _)| *i);
    counts.into_iter().map(|(_, count)| count).collect()
}

fn print_engines_pretty(rows: &[EngineRow]) {
    if rows.is_empty() {
        println!("{}", "No PKI secrets engines are mounted.".yellow());
        println!(
            "{}",
            "Tip: Enable one with `vault secrets enable pki`".dimmed()
        );
        return;
    }

    println!(
        "{} {}",
        "PKI Engines:".bold(),
        rows.len().to_string().cyan()
    );
    println!();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    if rows.iter().all(|r| r.certificates.is_none()) {
        println!();
        println!(
            "{}",
            "Tip: Add --count to see how many certificates each engine holds".dimmed()
        );
    }
}
