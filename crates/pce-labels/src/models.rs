//! PCE API request and response models.
//!
//! Only the fields this crate reads are modeled; everything else in the
//! PCE payloads is ignored.

use serde::{Deserialize, Serialize};

use crate::LabelType;

// ============================================================================
// Labels
// ============================================================================

/// Label object from `GET /labels`.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    /// Label type key (`role`, `app`, `env`, `loc`, or custom).
    pub key: String,
    /// Label value.
    pub value: String,
    /// Label href.
    pub href: String,
}

/// Label create request for `POST /labels`.
#[derive(Debug, Serialize)]
pub struct CreateLabelRequest<'a> {
    pub key: LabelType,
    pub value: &'a str,
}

/// Label create response. `href` is optional so a malformed reply is
/// reported instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct CreatedLabel {
    pub href: Option<String>,
}

// ============================================================================
// Workloads
// ============================================================================

/// Network interface of a workload.
#[derive(Debug, Clone, Deserialize)]
pub struct Interface {
    /// Interface address.
    #[serde(default)]
    pub address: Option<String>,
}

/// Managed workload from `GET /workloads?managed=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagedWorkload {
    /// Workload href, e.g. `/orgs/85/workloads/<uuid>`.
    pub href: String,
    /// Public IP address.
    #[serde(default)]
    pub public_ip: Option<String>,
    /// Network interfaces.
    #[serde(default)]
    pub interfaces: Vec<Interface>,
}

/// Reference to a label by href.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRef {
    pub href: String,
}

/// Workload label update for `PUT {workload.href}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateWorkloadLabelsRequest {
    pub labels: Vec<LabelRef>,
}
