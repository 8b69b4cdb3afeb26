//! `vault-pki config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::{mask, Config};
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&key, &value),
        ConfigCommands::Unset { key } => unset_config(&key),
        ConfigCommands::Path => show_path(),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let mut config = Config::load()?;
    config.token = config.token.as_deref().map(mask);

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&config)?,
        OutputFormat::Yaml => output::print_yaml(&config)?,
        _ => {
            let unset = || "(not set)".dimmed().to_string();

            println!("{}", "Current Configuration:".bold());
            println!();
            println!(
                "  {} {}",
                "address:".bold(),
                config.address.unwrap_or_else(unset)
            );
            println!("  {} {}", "token:".bold(), config.token.unwrap_or_else(unset));
            println!(
                "  {} {}",
                "namespace:".bold(),
                config.namespace.unwrap_or_else(unset)
            );
            println!("  {} {}", "skip_verify:".bold(), config.skip_verify);
            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );
            println!(
                "  {} {}",
                "concurrency:".bold(),
                config.concurrency.map_or_else(unset, |n| n.to_string())
            );
            println!(
                "  {} {}",
                "deadline:".bold(),
                config.deadline.map_or_else(unset, |s| format!("{s}s"))
            );
            println!(
                "  {} {}",
                "timeout:".bold(),
                config.timeout.map_or_else(unset, |s| format!("{s}s"))
            );
            println!(
                "  {} {}",
                "rate_limit:".bold(),
                config.rate_limit.map_or_else(unset, |n| format!("{n}/s"))
            );
        }
    }

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let shown = if key == "token" { mask(value) } else { value.to_string() };
    println!("{} {} set to {}.", "Success:".green().bold(), key, shown.cyan());
    Ok(())
}

fn unset_config(key: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.unset(key)?;
    config.save()?;

    println!("{} {} cleared.", "Success:".green().bold(), key);
    Ok(())
}

fn show_path() -> Result<()> {
    let path = Config::path()?;
    println!("{}", path.display());
    Ok(())
}
