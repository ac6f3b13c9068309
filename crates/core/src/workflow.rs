//! Documentation workflow service.
//!
//! Wraps the pure APOC engine with a [`ProgressStore`]: starting a workflow for a case, reporting
//! its progress, and accepting section submissions. A submission is validated first; only a valid
//! submission is recorded and persisted.

use crate::apoc::{
    calculate_progress, is_visible, section_statuses, validate_section, SectionData, SectionId,
    SectionStatus, ValidationResult, WorkflowProgress,
};
use crate::config::{CoreConfig, StoreKind};
use crate::store::{FileProgressStore, InMemoryProgressStore, ProgressStore};
use crate::{WorkflowError, WorkflowResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zahani_types::{CaseData, PatientSummary};
use zahani_uuid::CaseId;

/// Progress indicator data for one case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOverview {
    pub case_id: CaseId,
    pub overall_progress: u8,
    /// Section the workflow resumes at; `None` once every visible section is complete.
    pub next_section: Option<SectionId>,
    pub sections: Vec<SectionStatus>,
}

/// Result of submitting one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub validation: ValidationResult,
    /// Progress after the submission. Unchanged when validation failed.
    pub progress: WorkflowProgress,
}

impl SubmissionOutcome {
    pub fn accepted(&self) -> bool {
        self.validation.is_valid
    }
}

/// Pure workflow operations over a progress store - no API concerns.
#[derive(Clone)]
pub struct WorkflowService {
    store: Arc<dyn ProgressStore>,
}

impl WorkflowService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Builds a service backed by the store selected in `cfg`.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        let store: Arc<dyn ProgressStore> = match cfg.store_kind() {
            StoreKind::Memory => Arc::new(InMemoryProgressStore::new()),
            StoreKind::File => Arc::new(FileProgressStore::new(cfg)),
        };
        Self::new(store)
    }

    /// Starts the documentation workflow for a case.
    ///
    /// Starting is idempotent: if progress already exists it is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read or written.
    pub fn start(&self, case_id: &CaseId) -> WorkflowResult<WorkflowProgress> {
        if let Some(existing) = self.store.load(case_id)? {
            tracing::debug!("workflow for case {} already started", case_id);
            return Ok(existing);
        }

        let progress = WorkflowProgress::new();
        self.store.save(case_id, &progress)?;
        tracing::info!("started documentation workflow for case {}", case_id);
        Ok(progress)
    }

    /// Returns the stored progress for a case.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::WorkflowNotFound`] if the workflow was never started.
    pub fn progress(&self, case_id: &CaseId) -> WorkflowResult<WorkflowProgress> {
        self.store
            .load(case_id)?
            .ok_or(WorkflowError::WorkflowNotFound(*case_id))
    }

    /// Computes progress-indicator data for a case as seen for `patient` and `case`.
    pub fn overview(
        &self,
        case_id: &CaseId,
        patient: &PatientSummary,
        case: &CaseData,
    ) -> WorkflowResult<WorkflowOverview> {
        let progress = self.progress(case_id)?;
        let sections = section_statuses(&progress, patient, case);
        let next_section = sections.iter().find(|s| s.is_current).map(|s| s.id);

        Ok(WorkflowOverview {
            case_id: *case_id,
            overall_progress: calculate_progress(&progress, patient, case),
            next_section,
            sections,
        })
    }

    /// Validates and, if valid, records completion of `section` for a case.
    ///
    /// A failed validation is not an error: the outcome carries the messages and the progress is
    /// neither changed nor persisted.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`WorkflowError::WorkflowNotFound`] if the workflow was never started,
    /// - [`WorkflowError::SectionNotVisible`] if the section does not apply to this patient/case,
    /// - a storage error if the store cannot be read or written.
    pub fn submit_section(
        &self,
        case_id: &CaseId,
        section: SectionId,
        data: &SectionData,
        patient: &PatientSummary,
        case: &CaseData,
    ) -> WorkflowResult<SubmissionOutcome> {
        self.submit_section_at(case_id, section, data, patient, case, Utc::now())
    }

    pub(crate) fn submit_section_at(
        &self,
        case_id: &CaseId,
        section: SectionId,
        data: &SectionData,
        patient: &PatientSummary,
        case: &CaseData,
        saved_at: DateTime<Utc>,
    ) -> WorkflowResult<SubmissionOutcome> {
        let mut progress = self.progress(case_id)?;

        if !is_visible(section, patient, case) {
            return Err(WorkflowError::SectionNotVisible(section));
        }

        let validation = validate_section(section, data);
        if !validation.is_valid {
            tracing::warn!(
                "section {} for case {} failed validation: {}",
                section,
                case_id,
                validation.errors.join("; ")
            );
            return Ok(SubmissionOutcome {
                validation,
                progress,
            });
        }

        progress.record_completion(section, saved_at, patient, case);
        self.store.save(case_id, &progress)?;
        tracing::info!(
            "section {} completed for case {} ({}%)",
            section,
            case_id,
            progress.overall_progress()
        );

        Ok(SubmissionOutcome {
            validation,
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apoc::SectionState;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use tempfile::TempDir;
    use zahani_types::{Gender, StrokeClassification};

    fn service() -> WorkflowService {
        WorkflowService::from_config(&CoreConfig::in_memory())
    }

    fn payload(value: serde_json::Value) -> SectionData {
        value.as_object().cloned().unwrap_or_default()
    }

    fn adult_male() -> PatientSummary {
        PatientSummary::new(Some(Gender::Male), Some(52))
    }

    #[test]
    fn start_creates_empty_progress_and_is_idempotent() {
        let svc = service();
        let case_id = CaseId::new();

        let progress = svc.start(&case_id).unwrap();
        assert_eq!(progress, WorkflowProgress::new());

        svc.submit_section(
            &case_id,
            SectionId::ReviewOfSystems,
            &SectionData::new(),
            &adult_male(),
            &CaseData::default(),
        )
        .unwrap();

        let again = svc.start(&case_id).unwrap();
        assert!(again.is_completed(SectionId::ReviewOfSystems));
    }

    #[test]
    fn progress_of_unknown_case_is_not_found() {
        let svc = service();
        let case_id = CaseId::new();
        let err = svc.progress(&case_id).expect_err("never started");
        assert!(matches!(err, WorkflowError::WorkflowNotFound(id) if id == case_id));
    }

    #[test]
    fn valid_submission_is_recorded() {
        let svc = service();
        let case_id = CaseId::new();
        svc.start(&case_id).unwrap();

        let outcome = svc
            .submit_section(
                &case_id,
                SectionId::ChiefComplaint,
                &payload(json!({"chiefComplaint": "severe headache"})),
                &adult_male(),
                &CaseData::default(),
            )
            .unwrap();

        assert!(outcome.accepted());
        assert!(outcome.progress.is_completed(SectionId::ChiefComplaint));
        assert_eq!(outcome.progress.overall_progress(), 10);
        assert_eq!(
            outcome.progress.current_section(),
            Some(SectionId::HistoryOfPresentingIllness)
        );
        assert_eq!(svc.progress(&case_id).unwrap(), outcome.progress);
    }

    #[test]
    fn invalid_submission_is_not_persisted() {
        let svc = service();
        let case_id = CaseId::new();
        svc.start(&case_id).unwrap();

        let outcome = svc
            .submit_section(
                &case_id,
                SectionId::VitalSigns,
                &payload(json!({"vitalSignsSpo2": 101})),
                &adult_male(),
                &CaseData::default(),
            )
            .unwrap();

        assert!(!outcome.accepted());
        assert_eq!(
            outcome.validation.errors,
            vec!["Oxygen saturation must be between 0 and 100%"]
        );
        assert_eq!(outcome.progress, WorkflowProgress::new());
        assert_eq!(svc.progress(&case_id).unwrap(), WorkflowProgress::new());
    }

    #[test]
    fn hidden_section_submission_is_rejected() {
        let svc = service();
        let case_id = CaseId::new();
        svc.start(&case_id).unwrap();

        let err = svc
            .submit_section(
                &case_id,
                SectionId::GynecologicalObstetricHistory,
                &SectionData::new(),
                &adult_male(),
                &CaseData::default(),
            )
            .expect_err("hidden for male patient");
        assert!(matches!(
            err,
            WorkflowError::SectionNotVisible(SectionId::GynecologicalObstetricHistory)
        ));
    }

    #[test]
    fn submission_without_start_is_not_found() {
        let svc = service();
        let err = svc
            .submit_section(
                &CaseId::new(),
                SectionId::Plan,
                &payload(json!({"managementPlan": "Review in two weeks"})),
                &adult_male(),
                &CaseData::default(),
            )
            .expect_err("never started");
        assert!(matches!(err, WorkflowError::WorkflowNotFound(_)));
    }

    #[test]
    fn resubmission_updates_timestamp_only() {
        let svc = service();
        let case_id = CaseId::new();
        svc.start(&case_id).unwrap();
        let patient = adult_male();
        let case = CaseData::default();
        let first = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let second = first + Duration::hours(3);
        let data = payload(json!({"primaryDiagnosis": "Tension-type headache"}));

        svc.submit_section_at(&case_id, SectionId::Diagnosis, &data, &patient, &case, first)
            .unwrap();
        let outcome = svc
            .submit_section_at(&case_id, SectionId::Diagnosis, &data, &patient, &case, second)
            .unwrap();

        let entry = outcome.progress.entry(SectionId::Diagnosis).unwrap();
        assert!(entry.completed);
        assert_eq!(entry.last_saved_at, second);
        assert_eq!(outcome.progress.overall_progress(), 10);
    }

    #[test]
    fn overview_reports_visible_sections_and_resume_point() {
        let svc = service();
        let case_id = CaseId::new();
        svc.start(&case_id).unwrap();

        let patient = PatientSummary::new(Some(Gender::Male), Some(70));
        let case = CaseData::with_stroke(StrokeClassification::Ischemic);

        for (section, data) in [
            (
                SectionId::ChiefComplaint,
                json!({"chiefComplaint": "sudden left arm weakness"}),
            ),
            (SectionId::HistoryOfPresentingIllness, json!({})),
        ] {
            let outcome = svc
                .submit_section(&case_id, section, &payload(data), &patient, &case)
                .unwrap();
            assert!(outcome.accepted());
        }

        let overview = svc.overview(&case_id, &patient, &case).unwrap();
        assert_eq!(overview.case_id, case_id);
        assert_eq!(overview.sections.len(), 11);
        assert_eq!(overview.overall_progress, 18);
        assert_eq!(overview.next_section, Some(SectionId::ReviewOfSystems));
        assert_eq!(overview.sections[0].state, SectionState::Completed);
        assert!(overview
            .sections
            .iter()
            .any(|s| s.id == SectionId::DevelopmentalHistory));
    }

    #[test]
    fn file_backed_service_survives_restart() {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().to_path_buf(), StoreKind::File).unwrap();
        let case_id = CaseId::new();

        {
            let svc = WorkflowService::from_config(&cfg);
            svc.start(&case_id).unwrap();
            svc.submit_section(
                &case_id,
                SectionId::Investigations,
                &SectionData::new(),
                &adult_male(),
                &CaseData::default(),
            )
            .unwrap();
        }

        let svc = WorkflowService::from_config(&cfg);
        let progress = svc.progress(&case_id).unwrap();
        assert!(progress.is_completed(SectionId::Investigations));
        assert_eq!(progress.current_section(), Some(SectionId::ChiefComplaint));
    }
}
