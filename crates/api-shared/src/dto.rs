//! Request and response bodies for the HTTP API.
//!
//! Core types already serialise in camelCase; the wrappers here add OpenAPI schemas and flatten
//! registry entries into plain strings for clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zahani_core::apoc::{Section, SectionData, ValidationResult, WorkflowProgress};
use zahani_core::{CaseData, CaseId, PatientSummary, SubmissionOutcome, WorkflowOverview};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One registry entry as shown to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub id: String,
    pub order: u8,
    pub title: String,
    pub conditional: bool,
    pub subsections: Vec<String>,
}

impl From<&Section> for SectionInfo {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id.as_str().to_string(),
            order: section.order,
            title: section.title.to_string(),
            conditional: section.is_conditional(),
            subsections: section.subsections.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListSectionsRes {
    pub sections: Vec<SectionInfo>,
}

/// Patient demographics and case attributes that drive conditional sections.
///
/// Both parts are optional; an absent part means no information.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PatientContextReq {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub patient: PatientSummary,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub case: CaseData,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VisibleSectionsRes {
    pub sections: Vec<SectionInfo>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ValidateSectionReq {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: SectionData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSectionRes {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl From<ValidationResult> for ValidateSectionRes {
    fn from(result: ValidationResult) -> Self {
        Self {
            is_valid: result.is_valid,
            errors: result.errors,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmitSectionReq {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub patient: PatientSummary,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub case: CaseData,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: SectionData,
}

/// Stored progress for one case.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRes {
    pub case_id: String,
    #[schema(value_type = Object)]
    pub progress: WorkflowProgress,
}

impl ProgressRes {
    pub fn new(case_id: &CaseId, progress: WorkflowProgress) -> Self {
        Self {
            case_id: case_id.to_string(),
            progress,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OverviewRes {
    #[schema(value_type = Object)]
    pub overview: WorkflowOverview,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSectionRes {
    pub accepted: bool,
    pub validation: ValidateSectionRes,
    #[schema(value_type = Object)]
    pub progress: WorkflowProgress,
}

impl From<SubmissionOutcome> for SubmitSectionRes {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            accepted: outcome.accepted(),
            validation: outcome.validation.into(),
            progress: outcome.progress,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
