//! JSON result documents written to stdout.

use std::io::Write;

use serde::Serialize;

use crate::assign::AssignSummary;
use crate::create::CreateSummary;
use crate::SyncError;

/// Run-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub failed: bool,
    pub msg: String,
    /// Offending label type for single-record creates.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label_type: Option<String>,
}

impl Failure {
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: msg.into(),
            label_type: None,
        }
    }

    #[must_use]
    pub fn invalid_type(raw: &str) -> Self {
        Self {
            label_type: Some(raw.to_string()),
            ..Self::new("Invalid type value.")
        }
    }

    #[must_use]
    pub fn parameter_mismatch() -> Self {
        Self::new("Parameter mismatch.")
    }
}

impl From<&SyncError> for Failure {
    fn from(err: &SyncError) -> Self {
        Self::new(err.to_string())
    }
}

/// Result of a check-mode run: nothing was contacted or changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Unchanged {
    pub changed: bool,
}

/// The single document a run writes to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Assign(AssignSummary),
    Create(CreateSummary),
    Unchanged(Unchanged),
    Failure(Failure),
}

impl Report {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Process exit code: 1 when a failure document is written.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.is_failure())
    }
}

impl From<SyncError> for Report {
    fn from(err: SyncError) -> Self {
        Self::Failure(Failure::from(&err))
    }
}

/// Write `value` as a single JSON document followed by a newline.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub fn write_json<T: Serialize, W: Write>(mut out: W, value: &T) -> Result<(), SyncError> {
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
