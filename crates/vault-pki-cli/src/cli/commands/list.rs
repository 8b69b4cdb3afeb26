//! `vault-pki list` - Flat certificate listing.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use vault_pki::{simplified_list, HierarchyResolver, SimplifiedCertificate};

use super::hierarchy::print_warnings;
use super::Context;
use crate::cli::args::ListArgs;
use crate::output::{self, OutputFormat};

/// Flat row shared by the table and CSV renderings
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct ListRow {
    #[tabled(rename = "Serial")]
    serial_number: String,
    #[tabled(rename = "Subject")]
    subject_common_name: String,
    #[tabled(rename = "Expired")]
    expired: String,
    #[tabled(rename = "Revoked")]
    revoked: String,
    #[tabled(rename = "Expiring In")]
    expiring_in: String,
    #[tabled(rename = "Issuers")]
    issuers: String,
}

impl From<&SimplifiedCertificate> for ListRow {
    fn from(cert: &SimplifiedCertificate) -> Self {
        Self {
            serial_number: cert.serial_number.clone(),
            subject_common_name: cert.subject_common_name.clone(),
            expired: cert.expired.clone(),
            revoked: cert.revoked.clone(),
            expiring_in: cert.expiring_in.clone().unwrap_or_default(),
            issuers: cert.issuers.join(" < "),
        }
    }
}

pub async fn execute(ctx: Context, args: ListArgs) -> Result<()> {
    let config = ctx.resolver_config(&args.resolve);
    let resolver = HierarchyResolver::new(ctx.client()?).with_config(config);

    let now = Utc::now();
    let report = resolver.resolve_all(&args.mount).await?;
    let mut list = simplified_list(&report, now);

    if let Some(days) = args.expiring_within {
        let serials = expiring_serials(&report, now, Duration::days(days));
        list.certificates
            .retain(|cert| serials.contains(&cert.serial_number.as_str()));
    }

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&list)?,
        OutputFormat::Yaml => output::print_yaml(&list)?,
        OutputFormat::Csv => {
            let rows: Vec<ListRow> = list.certificates.iter().map(ListRow::from).collect();
            output::print_csv(&rows)?;
            print_warnings(&list.warnings);
        }
        OutputFormat::Pretty => {
            print_list_pretty(&list.certificates, &args);
            print_warnings(&list.warnings);
        }
    }

    Ok(())
}

/// Serials of unexpired certificates whose `notAfter` falls within `window`
fn expiring_serials(
    report: &vault_pki::HierarchyReport,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<&str> {
    report
        .certificates()
        .filter(|cert| !cert.is_expired)
        .filter(|cert| cert.time_until_expiry(now).is_some_and(|left| left <= window))
        .map(|cert| cert.serial_number.as_str())
        .collect()
}

fn print_list_pretty(list: &[SimplifiedCertificate], args: &ListArgs) {
    println!(
        "{} {} ({} certificates)",
        "Mount:".bold(),
        args.mount.cyan().bold(),
        list.len()
    );

    if list.is_empty() {
        println!();
        match args.expiring_within {
            Some(days) => println!(
                "{}",
                format!("No certificates expire within {days} days.").dimmed()
            ),
            None => println!("{}", "No certificates found under this mount.".dimmed()),
        }
        return;
    }

    println!();
    let rows: Vec<ListRow> = list.iter().map(ListRow::from).collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}
