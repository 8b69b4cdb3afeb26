//! `vault-pki status` - Verify the token against the server.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use vault_pki::api::TokenInfo;

use super::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    token: TokenInfo,
}

pub async fn execute(ctx: Context) -> Result<()> {
    let client = ctx.client()?;
    let token = client.token().lookup_self().await.map_err(|e| {
        // Vault answers 403 for unknown or expired tokens on lookup-self
        if e.is_auth_error() || e.is_forbidden() {
            anyhow::anyhow!(
                "{e}\n\nThe token was rejected; check VAULT_TOKEN or `vault-pki config set token`"
            )
        } else {
            e.into()
        }
    })?;

    let status = Status {
        address: client.address().to_string(),
        namespace: ctx.namespace.clone(),
        token,
    };

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&status)?,
        OutputFormat::Yaml => output::print_yaml(&status)?,
        OutputFormat::Csv => {
            println!("address,display_name,policies,ttl,renewable");
            println!(
                "{},{},\"{}\",{},{}",
                status.address,
                status.token.display_name,
                status.token.policies.join(";"),
                status.token.ttl,
                status.token.renewable
            );
        }
        OutputFormat::Pretty => print_status_pretty(&status),
    }

    Ok(())
}

fn print_status_pretty(status: &Status) {
    let token = &status.token;

    println!("{} {}", "Vault:".bold(), status.address.cyan());
    if let Some(ns) = &status.namespace {
        println!("  {} {}", "Namespace:".bold(), ns);
    }
    println!("  {} {}", "Token:".bold(), "valid".green().bold());
    if !token.display_name.is_empty() {
        println!("  {} {}", "Display Name:".bold(), token.display_name);
    }
    println!("  {} {}", "Policies:".bold(), token.policies.join(", "));

    let ttl = if token.ttl == 0 {
        "never expires".to_string()
    } else {
        format_ttl(token.ttl)
    };
    println!("  {} {}", "TTL:".bold(), ttl);
    if let Some(expire) = &token.expire_time {
        println!("  {} {}", "Expires:".bold(), expire);
    }
    println!(
        "  {} {}",
        "Renewable:".bold(),
        output::yes_no(token.renewable)
    );
}

fn format_ttl(secs: u64) -> String {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, minutes) = (rem / 3600, (rem % 3600) / 60);
    if days > 0 {
        format!("{days}d {hours}h")
    } else {
        format!("{hours}h {minutes}m")
    }
}
