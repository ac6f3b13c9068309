//! Workflow progress persistence.
//!
//! The workflow engine only computes over snapshots; stores hold the one mutable record per case.
//! Both implementations are last-write-wins: concurrent saves for the same case do not merge.
//!
//! ## File layout
//! `FileProgressStore` keeps one YAML file per case under the sharded case directory:
//! `<data_dir>/workflows/<s1>/<s2>/<case_id>/progress.yaml`

use crate::apoc::WorkflowProgress;
use crate::config::CoreConfig;
use crate::constants::PROGRESS_FILENAME;
use crate::{WorkflowError, WorkflowResult};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use zahani_uuid::CaseId;

/// Storage for per-case workflow progress.
pub trait ProgressStore: Send + Sync {
    /// Returns the stored progress for `case_id`, or `None` if the workflow was never started.
    fn load(&self, case_id: &CaseId) -> WorkflowResult<Option<WorkflowProgress>>;

    /// Replaces the stored progress for `case_id`.
    fn save(&self, case_id: &CaseId, progress: &WorkflowProgress) -> WorkflowResult<()>;
}

/// Process-local store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    records: RwLock<HashMap<CaseId, WorkflowProgress>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn load(&self, case_id: &CaseId) -> WorkflowResult<Option<WorkflowProgress>> {
        let records = self.records.read().map_err(|_| WorkflowError::StoreLock)?;
        Ok(records.get(case_id).cloned())
    }

    fn save(&self, case_id: &CaseId, progress: &WorkflowProgress) -> WorkflowResult<()> {
        let mut records = self.records.write().map_err(|_| WorkflowError::StoreLock)?;
        records.insert(*case_id, progress.clone());
        Ok(())
    }
}

/// YAML-file store rooted at the configured workflows directory.
#[derive(Clone, Debug)]
pub struct FileProgressStore {
    root: PathBuf,
}

impl FileProgressStore {
    /// Creates a store rooted at `cfg.workflows_dir()`.
    pub fn new(cfg: &CoreConfig) -> Self {
        Self::with_root(cfg.workflows_dir())
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn case_dir(&self, case_id: &CaseId) -> PathBuf {
        case_id.sharded_dir(&self.root)
    }

    /// Path of the progress file for `case_id` (which may not exist yet).
    pub fn progress_path(&self, case_id: &CaseId) -> PathBuf {
        self.case_dir(case_id).join(PROGRESS_FILENAME)
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&self, case_id: &CaseId) -> WorkflowResult<Option<WorkflowProgress>> {
        let path = self.progress_path(case_id);
        if !path.is_file() {
            return Ok(None);
        }

        tracing::debug!("loading workflow progress from {}", path.display());
        let contents = fs::read_to_string(&path).map_err(WorkflowError::FileRead)?;
        let progress =
            serde_yaml::from_str(&contents).map_err(WorkflowError::YamlDeserialization)?;
        Ok(Some(progress))
    }

    fn save(&self, case_id: &CaseId, progress: &WorkflowProgress) -> WorkflowResult<()> {
        let dir = self.case_dir(case_id);
        fs::create_dir_all(&dir).map_err(WorkflowError::StorageDirCreation)?;

        let yaml = serde_yaml::to_string(progress).map_err(WorkflowError::YamlSerialization)?;

        // Per-writer scratch file, atomically renamed over the record.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(WorkflowError::FileWrite)?;
        tmp.write_all(yaml.as_bytes()).map_err(WorkflowError::FileWrite)?;
        tmp.persist(dir.join(PROGRESS_FILENAME))
            .map_err(|e| WorkflowError::FileWrite(e.error))?;

        tracing::debug!("saved workflow progress for case {}", case_id);
        Ok(())
    }
}
