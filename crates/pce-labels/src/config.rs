//! Connection configuration for the PCE API.
//!
//! Parameters come from command-line flags, environment variables, or a JSON
//! arguments file as handed to binary modules by configuration-management
//! tools. Explicit flags win over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use serde::Deserialize;
use url::Url;

use crate::create::{CreateMode, ParamError};
use crate::SyncError;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved PCE connection settings.
#[derive(Clone)]
pub struct PceConfig {
    /// PCE base URL without trailing slash, e.g. `https://poc1.illum.io`.
    pub base_url: String,
    /// Organization path segment without surrounding slashes, e.g. `orgs/85`.
    pub org_href: String,
    /// API key username.
    pub user: String,
    /// API key secret.
    pub password: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for PceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PceConfig")
            .field("base_url", &self.base_url)
            .field("org_href", &self.org_href)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PceConfig {
    /// Create a new configuration.
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] if the base URL is not an absolute
    /// http(s) URL or the org href is empty.
    pub fn new(
        base_url: &str,
        org_href: &str,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let base_url = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(base_url)
            .map_err(|e| SyncError::Config(format!("invalid pce url '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SyncError::Config(format!(
                "unsupported scheme '{}' in pce url",
                parsed.scheme()
            )));
        }

        let org_href = org_href.trim().trim_matches('/');
        if org_href.is_empty() {
            return Err(SyncError::Config("org_href must not be empty".to_string()));
        }

        Ok(Self {
            base_url: base_url.to_string(),
            org_href: org_href.to_string(),
            user: user.into(),
            password: password.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{pce}/api/v2/{org_href}/labels`
    #[must_use]
    pub fn labels_url(&self) -> String {
        format!("{}/api/v2/{}/labels", self.base_url, self.org_href)
    }

    /// `{pce}/api/v2/{org_href}/workloads`
    #[must_use]
    pub fn workloads_url(&self) -> String {
        format!("{}/api/v2/{}/workloads", self.base_url, self.org_href)
    }

    /// URL of an object given its href (`/orgs/85/workloads/...`).
    #[must_use]
    pub fn object_url(&self, href: &str) -> String {
        format!("{}/api/v2/{}", self.base_url, href.trim_start_matches('/'))
    }
}

/// Connection flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// PCE API key username (or set `PCE_USER`).
    #[arg(long, env = "PCE_USER", global = true)]
    pub user: Option<String>,

    /// PCE API key secret (or set `PCE_PASSWORD`).
    #[arg(long, env = "PCE_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// PCE base URL, e.g. <https://poc1.illum.io> (or set `PCE_URL`).
    #[arg(long, env = "PCE_URL", global = true)]
    pub pce: Option<String>,

    /// Organization href, e.g. orgs/85 (or set `PCE_ORG_HREF`).
    #[arg(long, env = "PCE_ORG_HREF", global = true)]
    pub org_href: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,
}

impl ConnectionArgs {
    /// Merge flags with an arguments file and build a [`PceConfig`].
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] if a required parameter is missing from
    /// both sources or fails validation.
    pub fn resolve(&self, module: &ModuleArgs) -> Result<PceConfig, SyncError> {
        let user = pick("user", self.user.as_ref(), module.user.as_ref())?;
        let password = pick("password", self.password.as_ref(), module.password.as_ref())?;
        let pce = pick("pce", self.pce.as_ref(), module.pce.as_ref())?;
        let org_href = pick("org_href", self.org_href.as_ref(), module.org_href.as_ref())?;

        Ok(PceConfig::new(pce, org_href, user.clone(), password.clone())?
            .with_timeout(Duration::from_secs(self.timeout)))
    }
}

fn pick<'a>(
    name: &str,
    flag: Option<&'a String>,
    file: Option<&'a String>,
) -> Result<&'a String, SyncError> {
    flag.or(file)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SyncError::Config(format!("missing required parameter: {name}")))
}

/// JSON arguments file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleArgs {
    pub user: Option<String>,
    pub password: Option<String>,
    pub pce: Option<String>,
    pub org_href: Option<String>,
    /// Workload CSV for `assign`.
    pub workload: Option<PathBuf>,
    /// Label CSV for `create`.
    pub path: Option<PathBuf>,
    /// Single label name for `create`.
    pub name: Option<String>,
    /// Single label type for `create`.
    #[serde(rename = "type")]
    pub label_type: Option<String>,
    /// Validate parameters only.
    #[serde(rename = "_ansible_check_mode", default)]
    pub check_mode: bool,
}

impl ModuleArgs {
    /// Load an arguments file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn from_file(path: &Path) -> Result<Self, SyncError> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            SyncError::Config(format!("invalid arguments file {}: {e}", path.display()))
        })
    }

    /// Check mode is on when either the flag or the file asks for it.
    #[must_use]
    pub fn is_check_mode(&self, flag: bool) -> bool {
        flag || self.check_mode
    }

    /// Workload CSV for `assign`, flag first.
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] if neither source names a file.
    pub fn workload_path(&self, flag: Option<&Path>) -> Result<PathBuf, SyncError> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.workload.clone())
            .ok_or_else(|| SyncError::Config("missing required parameter: workload".to_string()))
    }

    /// Creation mode for `create`. Each of path, type and name is taken
    /// from the flag when given, otherwise from the file.
    ///
    /// # Errors
    /// See [`CreateMode::from_params`].
    pub fn create_mode(
        &self,
        path: Option<&Path>,
        label_type: Option<&str>,
        name: Option<&str>,
    ) -> Result<CreateMode, ParamError> {
        CreateMode::from_params(
            path.map(Path::to_path_buf).or_else(|| self.path.clone()),
            label_type.or(self.label_type.as_deref()),
            name.or(self.name.as_deref()),
        )
    }
}
