//! # ZahaniFlow Core
//!
//! Core business logic for the APOC structured clinical documentation workflow.
//!
//! This crate contains:
//! - The pure workflow engine under [`apoc`]: section registry, visibility resolution, progress
//!   tracking and declarative validation
//! - Progress persistence behind the [`store::ProgressStore`] trait (in-memory or sharded YAML
//!   files under the configured data directory)
//! - [`WorkflowService`], which validates submissions and records completion
//!
//! **No API concerns**: HTTP servers, authentication and CLI parsing belong in `api-rest`,
//! `api-shared` and `zahani-cli`.

pub mod apoc;
pub mod config;
pub mod constants;
pub mod error;
pub mod store;
pub mod workflow;

pub use config::{CoreConfig, StoreKind};
pub use constants::DEFAULT_DATA_DIR;
pub use error::{WorkflowError, WorkflowResult};
pub use workflow::{SubmissionOutcome, WorkflowOverview, WorkflowService};

pub use zahani_types::{CaseData, Gender, PatientSummary, StrokeClassification};
pub use zahani_uuid::CaseId;
