//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config = Config::load()?;

    // Flags and VAULT_* variables win over the config file
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    let ctx = commands::Context {
        address: cli.address.or_else(|| config.address.clone()),
        token: cli.token.or_else(|| config.token.clone()),
        namespace: cli.namespace.or_else(|| config.namespace.clone()),
        skip_verify: cli.skip_verify || config.skip_verify,
        timeout: cli.timeout.or(config.timeout),
        rate_limit: cli.rate_limit.or(config.rate_limit),
        concurrency: config.concurrency,
        deadline: config.deadline,
        output_format,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Engines(args) => commands::engines::execute(ctx, args).await,
        Commands::Hierarchy(args) => commands::hierarchy::execute(ctx, args).await,
        Commands::List(args) => commands::list::execute(ctx, args).await,
        Commands::Status => commands::status::execute(ctx).await,
        Commands::Config(args) => commands::config::execute(ctx, args).await,
    }
}

/// Log to stderr, `RUST_LOG` first, otherwise `warn` (`debug` with `--verbose`).
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,vault_pki_client=debug,vault_pki_hierarchy=debug,vault_pki_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
