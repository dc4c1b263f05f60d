//! Label assignment for managed workloads.
//!
//! For each row of the workload CSV the referenced labels are resolved (and
//! created when missing), the managed workload list is fetched, and every
//! workload owning the row's IP gets its label set replaced.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::input::{self, WorkloadRecord};
use crate::matcher;
use crate::resolver::LabelResolver;
use crate::{PceApi, SyncError};

/// A row that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub ip: String,
    pub error: String,
}

/// Outcome of an assignment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignSummary {
    pub changed: bool,
    /// IPs whose workloads received labels, in first-seen order.
    pub labels_assigned: Vec<String>,
    /// IPs that matched no managed workload, in first-seen order.
    pub not_assigned: Vec<String>,
    pub failed: Vec<RowFailure>,
}

impl AssignSummary {
    fn record_assigned(&mut self, ip: &str) {
        if !self.labels_assigned.iter().any(|a| a == ip) {
            self.labels_assigned.push(ip.to_string());
        }
    }

    fn record_not_assigned(&mut self, ip: &str) {
        if !self.not_assigned.iter().any(|a| a == ip) {
            self.not_assigned.push(ip.to_string());
        }
    }
}

/// Per-row result. Progress made before an error is kept so the summary
/// reflects what was applied to the PCE.
#[derive(Default)]
struct RowOutcome {
    labels_created: bool,
    workloads_updated: usize,
    error: Option<SyncError>,
}

/// Assign labels from the workload CSV at `path`.
///
/// # Errors
/// Returns error if the CSV cannot be read, the label list cannot be
/// fetched, or a row fails with a setup error (e.g. authentication).
/// Other row failures are recorded in [`AssignSummary::failed`].
pub async fn run<A: PceApi + ?Sized>(
    api: &A,
    path: impl AsRef<Path>,
) -> Result<AssignSummary, SyncError> {
    let rows = input::read_workloads(path)?;
    run_records(api, &rows).await
}

/// Assign labels for already parsed rows.
///
/// # Errors
/// See [`run`].
#[instrument(skip_all, fields(rows = rows.len()))]
pub async fn run_records<A: PceApi + ?Sized>(
    api: &A,
    rows: &[WorkloadRecord],
) -> Result<AssignSummary, SyncError> {
    let mut resolver = LabelResolver::load(api).await?;
    let mut summary = AssignSummary::default();

    for row in rows {
        let outcome = assign_row(api, &mut resolver, row).await;
        summary.changed |= outcome.labels_created || outcome.workloads_updated > 0;
        if outcome.workloads_updated > 0 {
            summary.record_assigned(&row.ip);
        }

        match outcome.error {
            None if outcome.workloads_updated == 0 => {
                warn!(ip = %row.ip, "No managed workload matches");
                summary.record_not_assigned(&row.ip);
            }
            None => {}
            Some(e) if e.is_setup_error() => return Err(e),
            Some(e) => {
                warn!(ip = %row.ip, error = %e, "Failed to assign labels");
                summary.failed.push(RowFailure {
                    ip: row.ip.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        assigned = summary.labels_assigned.len(),
        not_assigned = summary.not_assigned.len(),
        failed = summary.failed.len(),
        "Label assignment finished"
    );
    Ok(summary)
}

async fn assign_row<A: PceApi + ?Sized>(
    api: &A,
    resolver: &mut LabelResolver<'_, A>,
    row: &WorkloadRecord,
) -> RowOutcome {
    let mut outcome = RowOutcome::default();
    if let Err(e) = apply_row(api, resolver, row, &mut outcome).await {
        outcome.error = Some(e);
    }
    outcome
}

async fn apply_row<A: PceApi + ?Sized>(
    api: &A,
    resolver: &mut LabelResolver<'_, A>,
    row: &WorkloadRecord,
    outcome: &mut RowOutcome,
) -> Result<(), SyncError> {
    if row.ip.is_empty() {
        return Err(SyncError::Validation("empty ip".to_string()));
    }
    // An empty label list would strip every label from the matched workloads.
    if row.labels().next().is_none() {
        return Err(SyncError::Validation(format!(
            "no labels to assign for {}",
            row.ip
        )));
    }

    let mut hrefs = Vec::with_capacity(4);
    for (label_type, value) in row.labels() {
        let resolved = resolver.resolve(label_type, value).await?;
        outcome.labels_created |= resolved.is_created();
        hrefs.push(resolved.into_href());
    }

    // Fetched per row so updates made by earlier rows are visible.
    let workloads = api.list_managed_workloads().await?;

    for workload in matcher::find_matches(&workloads, &row.ip) {
        api.update_workload_labels(&workload.href, &hrefs).await?;
        info!(ip = %row.ip, workload = %workload.href, labels = hrefs.len(), "Assigned labels");
        outcome.workloads_updated += 1;
    }
    Ok(())
}
