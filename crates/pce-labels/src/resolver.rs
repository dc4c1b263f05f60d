//! Label catalog resolver.
//!
//! Looks labels up in the catalog and creates the ones the PCE does not have
//! yet. Each `(type, value)` pair is created at most once per run.

use tracing::{debug, instrument};

use crate::{LabelCatalog, LabelType, PceApi, SyncError};

/// How a label href was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Already present in the catalog.
    Existing(String),
    /// Created during this run.
    Created(String),
}

impl Resolved {
    #[must_use]
    pub fn href(&self) -> &str {
        match self {
            Self::Existing(href) | Self::Created(href) => href,
        }
    }

    #[must_use]
    pub fn into_href(self) -> String {
        match self {
            Self::Existing(href) | Self::Created(href) => href,
        }
    }

    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Resolves labels against a catalog, creating missing ones through the API.
pub struct LabelResolver<'a, A: PceApi + ?Sized> {
    api: &'a A,
    catalog: LabelCatalog,
}

impl<'a, A: PceApi + ?Sized> LabelResolver<'a, A> {
    #[must_use]
    pub fn new(api: &'a A, catalog: LabelCatalog) -> Self {
        Self { api, catalog }
    }

    /// Fetch the current label list and build a resolver over it.
    ///
    /// # Errors
    /// Returns error if the label list cannot be fetched.
    pub async fn load(api: &'a A) -> Result<Self, SyncError> {
        let labels = api.list_labels().await?;
        let catalog = LabelCatalog::from_labels(labels);
        debug!(labels = catalog.count(), "Loaded label catalog");
        Ok(Self::new(api, catalog))
    }

    /// Return the href for `(label_type, value)`, creating the label if the
    /// catalog does not have it.
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] for an empty value, or the API error
    /// if the create request fails. The catalog is unchanged on error.
    #[instrument(skip(self))]
    pub async fn resolve(
        &mut self,
        label_type: LabelType,
        value: &str,
    ) -> Result<Resolved, SyncError> {
        if value.is_empty() {
            return Err(SyncError::Validation(format!(
                "empty value for {label_type} label"
            )));
        }

        if let Some(href) = self.catalog.get(label_type, value) {
            return Ok(Resolved::Existing(href.to_string()));
        }

        let href = self.api.create_label(label_type, value).await?;
        self.catalog
            .insert(label_type, value.to_string(), href.clone());
        Ok(Resolved::Created(href))
    }

    #[must_use]
    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }
}
