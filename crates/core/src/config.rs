//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services, so request
//! handlers never read process-wide environment variables.

use crate::constants::WORKFLOWS_DIR_NAME;
use crate::{WorkflowError, WorkflowResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which [`ProgressStore`](crate::store::ProgressStore) backs the workflow service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// Process-local map; contents are lost on restart.
    Memory,
    /// Sharded YAML files under the data directory.
    File,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::File => "file",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            other => Err(WorkflowError::InvalidInput(format!(
                "unknown store kind '{other}' (expected 'memory' or 'file')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    store_kind: StoreKind,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidInput`] if a file store is requested and `data_dir` is not
    /// an existing directory.
    pub fn new(data_dir: PathBuf, store_kind: StoreKind) -> WorkflowResult<Self> {
        if store_kind == StoreKind::File && !data_dir.is_dir() {
            return Err(WorkflowError::InvalidInput(format!(
                "data directory does not exist: {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            data_dir,
            store_kind,
        })
    }

    /// Configuration for a purely in-memory deployment (tests, demos).
    pub fn in_memory() -> Self {
        Self {
            data_dir: PathBuf::new(),
            store_kind: StoreKind::Memory,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.data_dir.join(WORKFLOWS_DIR_NAME)
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store_kind
    }
}

/// Resolve the store kind from an optional override value.
///
/// An explicit, non-blank `value` wins. Otherwise a configured data directory selects the file
/// store and its absence selects the in-memory store.
pub fn store_kind_from_env_value(
    value: Option<String>,
    data_dir_configured: bool,
) -> WorkflowResult<StoreKind> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        Some(v) => v.parse(),
        None if data_dir_configured => Ok(StoreKind::File),
        None => Ok(StoreKind::Memory),
    }
}
