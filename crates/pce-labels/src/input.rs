//! CSV input files.
//!
//! Both files carry a header row; columns are matched by name, surrounding
//! whitespace is trimmed, and extra columns are ignored.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{LabelType, SyncError};

/// One row of the workload file (`ip,role,app,env,loc`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkloadRecord {
    pub ip: String,
    pub role: String,
    pub app: String,
    pub env: String,
    pub loc: String,
}

impl WorkloadRecord {
    /// Non-empty label values in update order (role, app, env, loc).
    pub fn labels(&self) -> impl Iterator<Item = (LabelType, &str)> {
        LabelType::ALL
            .into_iter()
            .map(move |t| (t, self.value(t)))
            .filter(|(_, value)| !value.is_empty())
    }

    fn value(&self, label_type: LabelType) -> &str {
        match label_type {
            LabelType::Role => &self.role,
            LabelType::App => &self.app,
            LabelType::Env => &self.env,
            LabelType::Loc => &self.loc,
        }
    }
}

/// One row of the label file (`type,name`). The type is validated later so
/// that a bad row is reported instead of rejecting the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelRow {
    #[serde(rename = "type")]
    pub label_type: String,
    pub name: String,
}

/// Read the workload file.
///
/// # Errors
/// Returns an error if the file cannot be opened, a required column is
/// missing, or a row is malformed.
pub fn read_workloads(path: impl AsRef<Path>) -> Result<Vec<WorkloadRecord>, SyncError> {
    read_records(std::fs::File::open(path)?)
}

/// Read the label file.
///
/// # Errors
/// Returns an error if the file cannot be opened, a required column is
/// missing, or a row is malformed.
pub fn read_label_rows(path: impl AsRef<Path>) -> Result<Vec<LabelRow>, SyncError> {
    read_records(std::fs::File::open(path)?)
}

/// Deserialize every row of a headed CSV.
///
/// # Errors
/// Returns the first row error.
pub fn read_records<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, SyncError> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(SyncError::from)
}
