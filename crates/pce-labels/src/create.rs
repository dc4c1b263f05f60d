//! Label creation from a CSV file or a single type/name pair.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::input::{self, LabelRow};
use crate::output::Failure;
use crate::resolver::{LabelResolver, Resolved};
use crate::{LabelRecord, LabelType, PceApi, SyncError};

/// Outcome of a creation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateSummary {
    pub changed: bool,
    /// `"type : name"` for every label now present in the PCE.
    pub success: Vec<String>,
    /// One message per rejected or failed row.
    pub error: Vec<String>,
}

/// Where the labels to create come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateMode {
    Csv(PathBuf),
    Single(LabelRecord),
}

/// Parameter problems detected before any API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Neither a path nor a name and type were supplied.
    Mismatch,
    /// Single-record type outside the allow-list.
    InvalidType(String),
}

impl From<ParamError> for Failure {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::Mismatch => Failure::parameter_mismatch(),
            ParamError::InvalidType(raw) => Failure::invalid_type(&raw),
        }
    }
}

impl CreateMode {
    /// Pick the mode from the supplied parameters. A path wins over a
    /// name/type pair.
    ///
    /// # Errors
    /// Returns [`ParamError::Mismatch`] when neither mode is fully specified
    /// and [`ParamError::InvalidType`] for a bad single-record type.
    pub fn from_params(
        path: Option<PathBuf>,
        label_type: Option<&str>,
        name: Option<&str>,
    ) -> Result<Self, ParamError> {
        if let Some(path) = path {
            return Ok(Self::Csv(path));
        }
        match (label_type, name) {
            (Some(t), Some(n)) if !t.is_empty() && !n.is_empty() => LabelRecord::parse(t, n)
                .map(Self::Single)
                .map_err(|_| ParamError::InvalidType(t.to_string())),
            _ => Err(ParamError::Mismatch),
        }
    }
}

/// Create labels according to `mode`.
///
/// # Errors
/// CSV mode fails only on setup errors; single mode also fails when the
/// label cannot be created.
pub async fn run<A: PceApi + ?Sized>(
    api: &A,
    mode: &CreateMode,
) -> Result<CreateSummary, SyncError> {
    match mode {
        CreateMode::Csv(path) => run_csv(api, path).await,
        CreateMode::Single(record) => run_single(api, record).await,
    }
}

/// Create every valid label listed in the CSV at `path`.
///
/// # Errors
/// Returns error if the CSV cannot be read, the label list cannot be
/// fetched, or a create fails with a setup error.
pub async fn run_csv<A: PceApi + ?Sized>(
    api: &A,
    path: impl AsRef<Path>,
) -> Result<CreateSummary, SyncError> {
    let rows = input::read_label_rows(path)?;
    run_rows(api, &rows).await
}

/// Create labels for already parsed rows. Invalid types are recorded and
/// skipped.
///
/// # Errors
/// See [`run_csv`].
#[instrument(skip_all, fields(rows = rows.len()))]
pub async fn run_rows<A: PceApi + ?Sized>(
    api: &A,
    rows: &[LabelRow],
) -> Result<CreateSummary, SyncError> {
    let mut resolver = LabelResolver::load(api).await?;
    let mut summary = CreateSummary::default();

    for row in rows {
        let Ok(label_type) = row.label_type.parse::<LabelType>() else {
            warn!(label_type = %row.label_type, name = %row.name, "Invalid label type");
            summary
                .error
                .push(LabelType::invalid_message(&row.label_type));
            continue;
        };

        let record = LabelRecord {
            label_type,
            name: row.name.clone(),
        };
        match resolver.resolve(label_type, &row.name).await {
            Ok(resolved) => record_success(&mut summary, &record, &resolved),
            Err(e) if e.is_setup_error() => return Err(e),
            Err(e) => {
                warn!(label = %record, error = %e, "Failed to create label");
                summary
                    .error
                    .push(format!("Failed to create {record}: {e}"));
            }
        }
    }

    info!(
        success = summary.success.len(),
        error = summary.error.len(),
        "Label creation finished"
    );
    Ok(summary)
}

/// Create a single label.
///
/// # Errors
/// Returns error if the label list cannot be fetched or the create fails.
#[instrument(skip(api))]
pub async fn run_single<A: PceApi + ?Sized>(
    api: &A,
    record: &LabelRecord,
) -> Result<CreateSummary, SyncError> {
    let mut resolver = LabelResolver::load(api).await?;
    let resolved = resolver.resolve(record.label_type, &record.name).await?;

    let mut summary = CreateSummary::default();
    record_success(&mut summary, record, &resolved);
    Ok(summary)
}

fn record_success(summary: &mut CreateSummary, record: &LabelRecord, resolved: &Resolved) {
    if resolved.is_created() {
        summary.changed = true;
    } else {
        info!(label = %record, href = %resolved.href(), "Label already exists");
    }
    summary.success.push(record.to_string());
}
