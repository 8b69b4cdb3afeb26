//! `vault-pki hierarchy` - Certificates grouped by root and intermediate CA.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use vault_pki::{CertificateRecord, HierarchyReport, HierarchyResolver, Warning};

use super::Context;
use crate::cli::args::HierarchyArgs;
use crate::output::{self, OutputFormat};

#[derive(Tabled)]
struct CertRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Not After")]
    not_after: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// One CSV line per certificate, carrying its place in the tree
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow<'a> {
    root_common_name: &'a str,
    root_issuer_ref: &'a str,
    intermediate_common_name: &'a str,
    intermediate_issuer_ref: &'a str,
    serial_number: &'a str,
    subject_common_name: &'a str,
    not_before: String,
    not_after: String,
    expired: &'static str,
    revoked: &'static str,
}

pub async fn execute(ctx: Context, args: HierarchyArgs) -> Result<()> {
    let config = ctx.resolver_config(&args.resolve);
    let resolver = HierarchyResolver::new(ctx.client()?).with_config(config);

    let report = resolver.resolve_all(&args.mount).await?;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Yaml => output::print_yaml(&report)?,
        OutputFormat::Csv => {
            output::print_csv(&csv_rows(&report))?;
            print_warnings(&report.warnings);
        }
        OutputFormat::Pretty => {
            print_hierarchy_pretty(&report, &args, Utc::now());
            print_warnings(&report.warnings);
        }
    }

    Ok(())
}

fn csv_rows(report: &HierarchyReport) -> Vec<CsvRow<'_>> {
    let mut rows = Vec::with_capacity(report.summary.total_certificates);

    for root in &report.root_groups {
        let root_ref = root.root_issuer_ref.as_deref().unwrap_or_default();
        for group in &root.intermediate_groups {
            for cert in &group.certificates {
                rows.push(csv_row(
                    &root.root_common_name,
                    root_ref,
                    &group.intermediate_common_name,
                    group.intermediate_issuer_ref.as_deref().unwrap_or_default(),
                    cert,
                ));
            }
        }
        for cert in &root.direct_certificates {
            rows.push(csv_row(&root.root_common_name, root_ref, "", "", cert));
        }
    }

    rows
}

fn csv_row<'a>(
    root_common_name: &'a str,
    root_issuer_ref: &'a str,
    intermediate_common_name: &'a str,
    intermediate_issuer_ref: &'a str,
    cert: &'a CertificateRecord,
) -> CsvRow<'a> {
    CsvRow {
        root_common_name,
        root_issuer_ref,
        intermediate_common_name,
        intermediate_issuer_ref,
        serial_number: &cert.serial_number,
        subject_common_name: &cert.subject_common_name,
        not_before: cert.not_before.map(|t| t.to_rfc3339()).unwrap_or_default(),
        not_after: cert.not_after.map(|t| t.to_rfc3339()).unwrap_or_default(),
        expired: output::yes_no(cert.is_expired),
        revoked: output::yes_no(cert.is_revoked),
    }
}

fn print_hierarchy_pretty(report: &HierarchyReport, args: &HierarchyArgs, now: DateTime<Utc>) {
    let summary = &report.summary;

    // Header
    println!("{} {}", "Mount:".bold(), args.mount.cyan().bold());
    println!(
        "{} {} certificates, {} expired, {} revoked",
        "Summary:".bold(),
        summary.total_certificates.to_string().cyan(),
        summary.expired_count.to_string().yellow(),
        summary.revoked_count.to_string().red(),
    );
    println!(
        "{} {} roots, {} intermediates",
        "CAs:".bold(),
        summary.root_count,
        summary.intermediate_count
    );

    if report.root_groups.is_empty() {
        println!();
        println!("{}", "No certificates found under this mount.".dimmed());
        return;
    }

    let shown = |cert: &&CertificateRecord| {
        !((args.hide_revoked && cert.is_revoked) || (args.hide_expired && cert.is_expired))
    };

    for root in &report.root_groups {
        println!();
        println!(
            "{} {}{}",
            "Root:".bold(),
            root.root_common_name.green().bold(),
            issuer_ref_suffix(root.root_issuer_ref.as_deref())
        );

        for group in &root.intermediate_groups {
            println!(
                "  {} {}{}",
                "Intermediate:".bold(),
                group.intermediate_common_name.blue().bold(),
                issuer_ref_suffix(group.intermediate_issuer_ref.as_deref())
            );
            print_certificates(group.certificates.iter().filter(shown), now, "    ");
        }

        if !root.direct_certificates.is_empty() {
            println!("  {}", "Issued directly by root:".bold());
            print_certificates(root.direct_certificates.iter().filter(shown), now, "    ");
        }
    }

    if args.hide_revoked || args.hide_expired {
        println!();
        println!(
            "{}",
            "Some certificates are hidden; summary counts include them".dimmed()
        );
    }
}

fn issuer_ref_suffix(issuer_ref: Option<&str>) -> String {
    issuer_ref.map_or_else(String::new, |r| format!(" {}", format!("({r})").dimmed()))
}

fn print_certificates<'a>(
    certs: impl Iterator<Item = &'a CertificateRecord>,
    now: DateTime<Utc>,
    indent: &str,
) {
    let rows: Vec<CertRow> = certs
        .map(|cert| CertRow {
            serial: cert.serial_number.clone(),
            subject: cert.subject_common_name.clone(),
            not_after: output::short_date(cert.not_after),
            status: status(cert, now),
        })
        .collect();

    if rows.is_empty() {
        println!("{indent}{}", "(none shown)".dimmed());
        return;
    }

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    for line in table.lines() {
        println!("{indent}{line}");
    }
}

fn status(cert: &CertificateRecord, now: DateTime<Utc>) -> String {
    if cert.is_revoked {
        "revoked".red().to_string()
    } else if cert.is_expired {
        "expired".yellow().to_string()
    } else {
        match cert.days_until_expiry(now) {
            Some(days) if days < 30 => format!("{} ({days}d left)", "valid".yellow()),
            Some(days) => format!("{} ({days}d left)", "valid".green()),
            None => "unknown".dimmed().to_string(),
        }
    }
}

/// Print warnings to stderr so piped output stays clean.
pub(super) fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("{} {}", "Warnings:".yellow().bold(), warnings.len());
    for warning in warnings {
        eprintln!(
            "  {} {}: {}",
            format!("[{}]", warning.kind).yellow(),
            warning.resource.bold(),
            warning.message
        );
    }
}
