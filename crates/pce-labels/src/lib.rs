//! Label synchronization for the Illumio Policy Compute Engine (PCE).
//!
//! This crate drives two batch operations against the PCE REST API:
//!
//! - [`assign`]: read a workload CSV (`ip,role,app,env,loc`), resolve or
//!   create the referenced labels, and attach them to every managed workload
//!   whose public IP or interface address matches the row.
//! - [`create`]: create labels from a `type,name` CSV or from a single
//!   type/name pair.
//!
//! # Example
//!
//! ```rust,ignore
//! use pce_labels::{assign, PceClient, PceConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PceConfig::new("https://poc1.illum.io", "orgs/85", "api_key", "secret")?;
//!     let client = PceClient::new(&config)?;
//!
//!     let summary = assign::run(&client, "workload.csv").await?;
//!     println!("{}", serde_json::to_string_pretty(&summary)?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assign;
pub mod client;
pub mod command;
pub mod config;
pub mod create;
mod error;
pub mod input;
pub mod labels;
pub mod matcher;
pub mod models;
pub mod output;
pub mod resolver;

pub use client::{PceApi, PceClient};
pub use config::{ConnectionArgs, ModuleArgs, PceConfig};
pub use error::SyncError;
pub use labels::{LabelCatalog, LabelRecord, LabelType};
