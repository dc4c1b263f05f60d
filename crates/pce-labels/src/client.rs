//! PCE REST API client.
//!
//! All requests use HTTP Basic authentication with the API key username and
//! secret. Requests are issued one at a time; callers await each response
//! before sending the next.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::config::PceConfig;
use crate::models::{
    CreateLabelRequest, CreatedLabel, Label, LabelRef, ManagedWorkload,
    UpdateWorkloadLabelsRequest,
};
use crate::{LabelType, SyncError};

/// Page size requested for label listings.
pub const DEFAULT_MAX_RESULTS: usize = 500;

/// Header carrying the total size of a collection.
const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Operations the batch runs need from the PCE.
#[async_trait]
pub trait PceApi: Send + Sync {
    /// List every label in the organization.
    async fn list_labels(&self) -> Result<Vec<Label>, SyncError>;

    /// Create a label and return its href.
    async fn create_label(&self, label_type: LabelType, value: &str) -> Result<String, SyncError>;

    /// List managed workloads.
    async fn list_managed_workloads(&self) -> Result<Vec<ManagedWorkload>, SyncError>;

    /// Replace a workload's label set with `label_hrefs`.
    async fn update_workload_labels(
        &self,
        workload_href: &str,
        label_hrefs: &[String],
    ) -> Result<(), SyncError>;
}

/// HTTP client for one PCE organization.
#[derive(Clone)]
pub struct PceClient {
    /// HTTP client.
    client: Client,
    /// Connection settings.
    config: PceConfig,
}

impl PceClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(config: &PceConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .user_agent(concat!("pce-labels/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Make an authenticated GET request, returning the parsed body and the
    /// collection total when the PCE reports one.
    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<usize>), SyncError> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url)
            .query(query)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .send()
            .await?;

        let total = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let body = Self::handle_response(response).await?;
        Ok((body, total))
    }

    /// Check the status and parse the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        let text = Self::check_status(response).await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse response");
            SyncError::Serialization(e)
        })
    }

    /// Map non-success statuses to errors, returning the body text otherwise.
    async fn check_status(response: reqwest::Response) -> Result<String, SyncError> {
        let status = response.status();
        let url = response.url().path().to_string();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(SyncError::Auth {
                status: status.as_u16(),
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(SyncError::NotFound(url))
        } else {
            Err(SyncError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl PceApi for PceClient {
    #[instrument(skip(self))]
    async fn list_labels(&self) -> Result<Vec<Label>, SyncError> {
        let url = self.config.labels_url();
        let (labels, total): (Vec<Label>, _) = self
            .get(&url, &[("max_results", DEFAULT_MAX_RESULTS.to_string())])
            .await?;

        match total {
            Some(total) if total > labels.len() => {
                info!(
                    returned = labels.len(),
                    total, "Label list truncated, requesting full collection"
                );
                let (labels, _): (Vec<Label>, _) =
                    self.get(&url, &[("max_results", total.to_string())]).await?;
                if labels.len() < total {
                    warn!(
                        returned = labels.len(),
                        total, "PCE returned fewer labels than reported"
                    );
                }
                Ok(labels)
            }
            _ => {
                debug!(count = labels.len(), "Fetched labels");
                Ok(labels)
            }
        }
    }

    #[instrument(skip(self))]
    async fn create_label(&self, label_type: LabelType, value: &str) -> Result<String, SyncError> {
        let url = self.config.labels_url();
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&CreateLabelRequest {
                key: label_type,
                value,
            })
            .send()
            .await?;

        let text = Self::check_status(response).await?;
        let href = serde_json::from_str::<CreatedLabel>(&text)
            .ok()
            .and_then(|label| label.href)
            .ok_or_else(|| {
                SyncError::UnexpectedResponse(format!("label create returned no href: {text}"))
            })?;

        info!(href = %href, value = %value, "Created label");
        Ok(href)
    }

    #[instrument(skip(self))]
    async fn list_managed_workloads(&self) -> Result<Vec<ManagedWorkload>, SyncError> {
        let (workloads, _): (Vec<ManagedWorkload>, _) = self
            .get(
                &self.config.workloads_url(),
                &[("managed", "true".to_string())],
            )
            .await?;
        debug!(count = workloads.len(), "Fetched managed workloads");
        Ok(workloads)
    }

    #[instrument(skip(self, label_hrefs), fields(labels = label_hrefs.len()))]
    async fn update_workload_labels(
        &self,
        workload_href: &str,
        label_hrefs: &[String],
    ) -> Result<(), SyncError> {
        let url = self.config.object_url(workload_href);
        debug!(url = %url, "PUT request");

        let body = UpdateWorkloadLabelsRequest {
            labels: label_hrefs
                .iter()
                .map(|href| LabelRef { href: href.clone() })
                .collect(),
        };

        let response = self
            .client
            .put(&url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await?;
        info!(workload = %workload_href, "Updated workload labels");
        Ok(())
    }
}
