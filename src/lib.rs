//! Automation of the Forge Model Derivative workflow.
//!
//! This crate uploads a source file to object storage, requests its
//! translation into viewer and mesh formats (SVF2, OBJ, STL) and polls the
//! job manifest until it completes. Resulting OBJ resources can then be
//! downloaded, and everything created can be cleaned up again.
//!
//! ## Features
//! - Asynchronous client for the storage and Model Derivative APIs, one
//!   instance serving both the US and EMEA regions.
//! - URL-safe URN encoding and decoding.
//! - Manifest polling with exact completion matching, a deadline and cancellation.
//! - Filtering and download of produced OBJ resources.
//! - Typed error handling that separates "not found" from transient and fatal failures.
//!
//! ```no_run
//! # use forgemd::{Credentials, Workflow, WorkflowConfig};
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let credentials = Credentials::from_env()?;
//! let config = WorkflowConfig::new("model.rvt", "us", "us", "us", ".")?;
//! let urn = Workflow::new(config, credentials).run().await?;
//! println!("Translated: {}", urn);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod client;
pub mod config;
pub mod derivative;
pub mod error;
pub mod manifest;
pub mod region;
pub mod storage;
pub mod types;
pub mod urn;
pub mod workflow;

pub use client::ForgeClient;
pub use config::{Credentials, ObjExportOptions, PollOptions, WorkflowConfig};
pub use derivative::DerivativeFormat;
pub use error::ForgeError;
pub use manifest::DerivativeState;
pub use region::Region;
pub use storage::ContainerStatus;
pub use types::{DerivativeNode, Manifest, ManifestChild, Metadata, Unit};
pub use urn::Urn;
pub use workflow::{clean, CleanupReport, ObjOutcome, Workflow, WorkflowState};
