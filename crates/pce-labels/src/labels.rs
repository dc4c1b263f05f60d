//! Label types and the in-memory label catalog.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Label;
use crate::SyncError;

/// The four label dimensions the PCE classifies workloads by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Role,
    App,
    Env,
    Loc,
}

impl LabelType {
    /// Payload order for workload updates.
    pub const ALL: [LabelType; 4] = [Self::Role, Self::App, Self::Env, Self::Loc];

    /// The label key as the PCE spells it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::App => "app",
            Self::Env => "env",
            Self::Loc => "loc",
        }
    }

    /// Error message recorded for a type outside the allow-list.
    #[must_use]
    pub fn invalid_message(raw: &str) -> String {
        format!("Invalid type:{raw}. Type should be either env,app,loc,role")
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "role" => Ok(Self::Role),
            "app" => Ok(Self::App),
            "env" => Ok(Self::Env),
            "loc" => Ok(Self::Loc),
            other => Err(SyncError::Validation(Self::invalid_message(other))),
        }
    }
}

/// A label to look up or create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub label_type: LabelType,
    pub name: String,
}

impl LabelRecord {
    /// Validate a raw type string and pair it with a name.
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] if `raw_type` is not one of
    /// `role`, `app`, `env`, `loc`.
    pub fn parse(raw_type: &str, name: impl Into<String>) -> Result<Self, SyncError> {
        Ok(Self {
            label_type: raw_type.parse()?,
            name: name.into(),
        })
    }
}

impl fmt::Display for LabelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.label_type, self.name)
    }
}

/// Existing labels keyed by type, then value, to href.
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    role: HashMap<String, String>,
    app: HashMap<String, String>,
    env: HashMap<String, String>,
    loc: HashMap<String, String>,
}

impl LabelCatalog {
    /// Build a catalog from the PCE label list.
    ///
    /// Labels with keys outside the four known types are skipped.
    #[must_use]
    pub fn from_labels(labels: impl IntoIterator<Item = Label>) -> Self {
        let mut catalog = Self::default();
        for label in labels {
            if let Ok(label_type) = label.key.parse::<LabelType>() {
                catalog.insert(label_type, label.value, label.href);
            }
        }
        catalog
    }

    fn map(&self, label_type: LabelType) -> &HashMap<String, String> {
        match label_type {
            LabelType::Role => &self.role,
            LabelType::App => &self.app,
            LabelType::Env => &self.env,
            LabelType::Loc => &self.loc,
        }
    }

    fn map_mut(&mut self, label_type: LabelType) -> &mut HashMap<String, String> {
        match label_type {
            LabelType::Role => &mut self.role,
            LabelType::App => &mut self.app,
            LabelType::Env => &mut self.env,
            LabelType::Loc => &mut self.loc,
        }
    }

    #[must_use]
    pub fn get(&self, label_type: LabelType, value: &str) -> Option<&str> {
        self.map(label_type).get(value).map(String::as_str)
    }

    pub fn insert(&mut self, label_type: LabelType, value: String, href: String) {
        self.map_mut(label_type).insert(value, href);
    }

    /// Number of labels across all four types.
    #[must_use]
    pub fn count(&self) -> usize {
        LabelType::ALL.iter().map(|t| self.map(*t).len()).sum()
    }
}
