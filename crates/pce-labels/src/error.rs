//! Error type shared by the PCE client and the batch operations.

use thiserror::Error;

/// Errors that can occur while synchronizing labels.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Input failed validation (bad label type, empty value).
    #[error("{0}")]
    Validation(String),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The PCE rejected the credentials.
    #[error("Authentication failed ({status})")]
    Auth { status: u16 },

    /// Object not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response parsed but did not have the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// CSV input could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File could not be opened.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether this error makes the remaining rows pointless to process.
    ///
    /// Authentication, configuration and input-file failures abort the run;
    /// everything else is recorded against the current row.
    #[must_use]
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::Auth { .. } | Self::Config(_) | Self::Csv(_) | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_classification() {
        assert!(SyncError::Auth { status: 401 }.is_setup_error());
        assert!(SyncError::Config("missing pce".into()).is_setup_error());
        assert!(!SyncError::NotFound("/orgs/1/workloads/x".into()).is_setup_error());
        assert!(!SyncError::UnexpectedResponse("no href".into()).is_setup_error());
        assert!(!SyncError::Api {
            status: 406,
            message: "duplicate".into()
        }
        .is_setup_error());
    }

    #[test]
    fn test_display() {
        let err = SyncError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
        assert_eq!(
            SyncError::Auth { status: 401 }.to_string(),
            "Authentication failed (401)"
        );
    }
}
