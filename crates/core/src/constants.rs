//! Constants used throughout the ZahaniFlow core crate.
//!
//! Path and filename constants live here so the file store, the CLI and the server agree on the
//! on-disk layout.

/// Default directory for workflow data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "zahani_data";

/// Directory name (under the data directory) holding per-case workflow records.
pub const WORKFLOWS_DIR_NAME: &str = "workflows";

/// Filename for a persisted workflow progress record.
pub const PROGRESS_FILENAME: &str = "progress.yaml";
