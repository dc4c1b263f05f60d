//! Subcommand dispatch shared by the CLI.
//!
//! Merges flags with the arguments file, applies check mode, and turns the
//! run into a single [`Report`].

use std::path::{Path, PathBuf};

use clap::Subcommand;
use tracing::{error, info};

use crate::output::{Failure, Report, Unchanged};
use crate::{assign, create, ConnectionArgs, ModuleArgs, PceClient, SyncError};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Assign labels to managed workloads matched by IP from a CSV (ip,role,app,env,loc).
    Assign {
        /// Workload CSV file.
        #[arg(long)]
        workload: Option<PathBuf>,
    },

    /// Create labels from a CSV (type,name) or a single type/name pair.
    Create {
        /// Label CSV file. Takes precedence over --name/--type.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Label name.
        #[arg(long)]
        name: Option<String>,

        /// Label type: role, app, env or loc.
        #[arg(long = "type")]
        label_type: Option<String>,
    },
}

/// Run `command` and return the document to print. Errors are folded into
/// [`Report::Failure`].
pub async fn execute(
    connection: &ConnectionArgs,
    args_file: Option<&Path>,
    check: bool,
    command: &Command,
) -> Report {
    match try_execute(connection, args_file, check, command).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Run failed");
            Report::from(e)
        }
    }
}

async fn try_execute(
    connection: &ConnectionArgs,
    args_file: Option<&Path>,
    check: bool,
    command: &Command,
) -> Result<Report, SyncError> {
    let module = match args_file {
        Some(path) => ModuleArgs::from_file(path)?,
        None => ModuleArgs::default(),
    };
    let check_mode = module.is_check_mode(check);
    let config = connection.resolve(&module)?;

    match command {
        Command::Assign { workload } => {
            let path = module.workload_path(workload.as_deref())?;
            if check_mode {
                return Ok(Report::Unchanged(Unchanged::default()));
            }

            info!(pce = %config.base_url, workload = %path.display(), "Assigning labels");
            let client = PceClient::new(&config)?;
            Ok(Report::Assign(assign::run(&client, &path).await?))
        }

        Command::Create {
            path,
            name,
            label_type,
        } => {
            let mode = match module.create_mode(
                path.as_deref(),
                label_type.as_deref(),
                name.as_deref(),
            ) {
                Ok(mode) => mode,
                Err(e) => return Ok(Report::Failure(Failure::from(e))),
            };
            if check_mode {
                return Ok(Report::Unchanged(Unchanged::default()));
            }

            info!(pce = %config.base_url, mode = ?mode, "Creating labels");
            let client = PceClient::new(&config)?;
            Ok(Report::Create(create::run(&client, &mode).await?))
        }
    }
}
