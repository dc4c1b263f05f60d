//! pce-labels CLI - label creation and assignment for the Illumio PCE.
//!
//! Writes one JSON result document to stdout; logs go to stderr.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pce_labels::command::{self, Command};
use pce_labels::output::write_json;
use pce_labels::ConnectionArgs;

/// pce-labels - synchronize labels between CSV files and the PCE.
#[derive(Parser)]
#[command(name = "pce-labels")]
#[command(about = "Create PCE labels and assign them to managed workloads")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// JSON arguments file (user, password, pce, `org_href`, workload, path, name, type).
    #[arg(long, global = true)]
    args_file: Option<PathBuf>,

    /// Validate parameters without contacting the PCE.
    #[arg(long, global = true)]
    check: bool,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let report = command::execute(
        &cli.connection,
        cli.args_file.as_deref(),
        cli.check,
        &cli.command,
    )
    .await;
    write_json(io::stdout().lock(), &report).context("Failed to write result")?;

    let code = report.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
