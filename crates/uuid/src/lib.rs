//! Case identifiers and sharded-path utilities.
//!
//! Every documented clinical case is keyed by a UUID. ZahaniFlow uses a *canonical* textual form
//! for these identifiers: **32 lowercase hexadecimal characters** (no hyphens), the same value
//! `Uuid::new_v4().simple().to_string()` produces.
//!
//! This crate provides:
//! - [`CaseId`], a wrapper that guarantees the canonical format once constructed.
//! - The sharding rule used to derive on-disk locations for per-case workflow files.
//!
//! ## Sharded directory layout
//! For a canonical id `u`, per-case data lives under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `zahani_data/workflows/55/0e/550e8400e29b41d4a716446655440000/`

mod case_id;

pub use case_id::{CaseId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
