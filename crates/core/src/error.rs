use crate::apoc::SectionId;
use zahani_uuid::CaseId;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("invalid case id: {0}")]
    InvalidCaseId(#[from] zahani_uuid::UuidError),
    #[error("no documentation workflow has been started for case {0}")]
    WorkflowNotFound(CaseId),
    #[error("section {0} does not apply to this patient and case")]
    SectionNotVisible(SectionId),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write progress file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read progress file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("progress store lock poisoned")]
    StoreLock,
}

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;
