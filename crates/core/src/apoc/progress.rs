//! Workflow progress tracking.
//!
//! A [`WorkflowProgress`] belongs to exactly one clinical case. Each section moves through:
//!
//! - not started: no entry in the map
//! - in progress: draft data held by the UI only, never persisted here
//! - completed: entry present with `completed = true` and a save timestamp
//!
//! The only transition recorded here is into `completed`, via
//! [`WorkflowProgress::record_completion`] after successful validation. Re-saving a completed
//! section refreshes its timestamp. There is no way back to "not started".

use super::sections::{Section, SectionId};
use super::visibility::visible_sections;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zahani_types::{CaseData, PatientSummary};

/// Persisted completion entry for one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub completed: bool,
    pub last_saved_at: DateTime<Utc>,
}

/// Documentation progress for one clinical case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowProgress {
    #[serde(default)]
    sections: BTreeMap<SectionId, SectionProgress>,
    /// Percentage cached at the last completion.
    #[serde(default)]
    overall_progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_section: Option<SectionId>,
}

impl WorkflowProgress {
    /// An empty progress record: nothing completed, 0 %.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, id: SectionId) -> Option<&SectionProgress> {
        self.sections.get(&id)
    }

    pub fn is_completed(&self, id: SectionId) -> bool {
        self.entry(id).is_some_and(|e| e.completed)
    }

    /// Entries in registry order.
    pub fn entries(&self) -> impl Iterator<Item = (SectionId, &SectionProgress)> {
        self.sections.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn overall_progress(&self) -> u8 {
        self.overall_progress
    }

    pub fn current_section(&self) -> Option<SectionId> {
        self.current_section
    }

    /// Marks `id` completed as of `saved_at`, then refreshes the cached percentage and moves the
    /// current-section pointer to the earliest incomplete visible section.
    pub fn record_completion(
        &mut self,
        id: SectionId,
        saved_at: DateTime<Utc>,
        patient: &PatientSummary,
        case: &CaseData,
    ) {
        self.sections.insert(
            id,
            SectionProgress {
                completed: true,
                last_saved_at: saved_at,
            },
        );
        self.overall_progress = calculate_progress(self, patient, case);
        self.current_section = next_incomplete_section(self, patient, case);
    }
}

/// Completion state of one section, as derived from a progress record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionState {
    NotStarted,
    Completed,
}

pub fn section_state(progress: &WorkflowProgress, id: SectionId) -> SectionState {
    if progress.is_completed(id) {
        SectionState::Completed
    } else {
        SectionState::NotStarted
    }
}

/// Percentage of visible sections that are completed, rounded to the nearest integer.
///
/// Entries for sections hidden from this patient and case are ignored.
pub fn calculate_progress(
    progress: &WorkflowProgress,
    patient: &PatientSummary,
    case: &CaseData,
) -> u8 {
    let visible = visible_sections(patient, case);
    if visible.is_empty() {
        return 0;
    }

    let completed = visible
        .iter()
        .filter(|s| progress.is_completed(s.id))
        .count();

    (completed as f64 * 100.0 / visible.len() as f64).round() as u8
}

/// The earliest visible section (in registry order) that is not completed, if any.
///
/// The workflow always resumes here, never at the most recently viewed section.
pub fn next_incomplete_section(
    progress: &WorkflowProgress,
    patient: &PatientSummary,
    case: &CaseData,
) -> Option<SectionId> {
    visible_sections(patient, case)
        .into_iter()
        .map(|s| s.id)
        .find(|id| !progress.is_completed(*id))
}

/// One row of a progress indicator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStatus {
    pub id: SectionId,
    pub order: u8,
    pub title: String,
    pub state: SectionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<DateTime<Utc>>,
    /// True for the section the workflow would resume at.
    pub is_current: bool,
}

/// Status rows for every visible section, in registry order.
pub fn section_statuses(
    progress: &WorkflowProgress,
    patient: &PatientSummary,
    case: &CaseData,
) -> Vec<SectionStatus> {
    let next = next_incomplete_section(progress, patient, case);

    visible_sections(patient, case)
        .into_iter()
        .map(|s: &Section| SectionStatus {
            id: s.id,
            order: s.order,
            title: s.title.to_string(),
            state: section_state(progress, s.id),
            last_saved_at: progress.entry(s.id).map(|e| e.last_saved_at),
            is_current: next == Some(s.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use zahani_types::Gender;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn adult_male() -> PatientSummary {
        PatientSummary::new(Some(Gender::Male), Some(45))
    }

    fn complete_all(
        progress: &mut WorkflowProgress,
        ids: &[SectionId],
        patient: &PatientSummary,
        case: &CaseData,
    ) {
        for id in ids {
            progress.record_completion(*id, t0(), patient, case);
        }
    }

    #[test]
    fn empty_progress_is_zero_percent() {
        let progress = WorkflowProgress::new();
        assert_eq!(
            calculate_progress(&progress, &PatientSummary::default(), &CaseData::default()),
            0
        );
        assert_eq!(progress.overall_progress(), 0);
        assert!(progress.current_section().is_none());
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        let patient = adult_male();
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();

        // 1 of 10 visible sections.
        progress.record_completion(SectionId::ChiefComplaint, t0(), &patient, &case);
        assert_eq!(calculate_progress(&progress, &patient, &case), 10);

        // 1 of 11 visible sections for an adult female is 9.09 -> 9.
        let female = PatientSummary::new(Some(Gender::Female), Some(45));
        assert_eq!(calculate_progress(&progress, &female, &case), 9);

        // 6 of 11 is 54.5 -> 55.
        complete_all(
            &mut progress,
            &[
                SectionId::HistoryOfPresentingIllness,
                SectionId::ReviewOfSystems,
                SectionId::PastMedicalHistory,
                SectionId::GynecologicalObstetricHistory,
                SectionId::VitalSigns,
            ],
            &female,
            &case,
        );
        assert_eq!(calculate_progress(&progress, &female, &case), 55);
    }

    #[test]
    fn hidden_sections_do_not_count() {
        let patient = adult_male();
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();

        progress.record_completion(SectionId::GynecologicalObstetricHistory, t0(), &patient, &case);
        assert_eq!(calculate_progress(&progress, &patient, &case), 0);
    }

    #[test]
    fn hundred_percent_iff_all_visible_completed() {
        let patient = adult_male();
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();

        let visible: Vec<SectionId> = visible_sections(&patient, &case)
            .iter()
            .map(|s| s.id)
            .collect();
        let (last, rest) = visible.split_last().unwrap();

        complete_all(&mut progress, rest, &patient, &case);
        assert!(calculate_progress(&progress, &patient, &case) < 100);
        assert_eq!(next_incomplete_section(&progress, &patient, &case), Some(*last));

        progress.record_completion(*last, t0(), &patient, &case);
        assert_eq!(calculate_progress(&progress, &patient, &case), 100);
        assert_eq!(progress.overall_progress(), 100);
        assert_eq!(next_incomplete_section(&progress, &patient, &case), None);
        assert_eq!(progress.current_section(), None);
    }

    #[test]
    fn progress_is_monotonic() {
        let patient = PatientSummary::new(Some(Gender::Female), Some(9));
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();
        let mut previous = 0;

        // Deliberately out of registry order.
        for id in SectionId::ALL.iter().rev() {
            progress.record_completion(*id, t0(), &patient, &case);
            let now = calculate_progress(&progress, &patient, &case);
            assert!(now >= previous, "{id}: {now} < {previous}");
            previous = now;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn next_section_is_earliest_incomplete_not_latest_saved() {
        let patient = adult_male();
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();

        complete_all(
            &mut progress,
            &[
                SectionId::ChiefComplaint,
                SectionId::HistoryOfPresentingIllness,
                SectionId::ReviewOfSystems,
                SectionId::Diagnosis,
            ],
            &patient,
            &case,
        );

        assert_eq!(
            next_incomplete_section(&progress, &patient, &case),
            Some(SectionId::PastMedicalHistory)
        );
        assert_eq!(progress.current_section(), Some(SectionId::PastMedicalHistory));

        let recorded: Vec<SectionId> = progress.entries().map(|(id, _)| id).collect();
        assert_eq!(
            recorded,
            vec![
                SectionId::ChiefComplaint,
                SectionId::HistoryOfPresentingIllness,
                SectionId::ReviewOfSystems,
                SectionId::Diagnosis,
            ]
        );
    }

    #[test]
    fn next_section_skips_hidden_sections() {
        let patient = adult_male();
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();

        complete_all(
            &mut progress,
            &[
                SectionId::ChiefComplaint,
                SectionId::HistoryOfPresentingIllness,
                SectionId::ReviewOfSystems,
                SectionId::PastMedicalHistory,
            ],
            &patient,
            &case,
        );

        assert_eq!(
            next_incomplete_section(&progress, &patient, &case),
            Some(SectionId::PersonalFamilySocialHistory)
        );
    }

    #[test]
    fn resaving_refreshes_timestamp_and_stays_completed() {
        let patient = adult_male();
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();

        progress.record_completion(SectionId::VitalSigns, t0(), &patient, &case);
        let before = progress.overall_progress();

        let later = t0() + Duration::minutes(20);
        progress.record_completion(SectionId::VitalSigns, later, &patient, &case);

        let entry = progress.entry(SectionId::VitalSigns).unwrap();
        assert!(entry.completed);
        assert_eq!(entry.last_saved_at, later);
        assert_eq!(progress.overall_progress(), before);
        assert_eq!(section_state(&progress, SectionId::VitalSigns), SectionState::Completed);
        assert_eq!(section_state(&progress, SectionId::Plan), SectionState::NotStarted);
    }

    #[test]
    fn statuses_mark_current_section() {
        let patient = adult_male();
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();
        progress.record_completion(SectionId::ChiefComplaint, t0(), &patient, &case);

        let statuses = section_statuses(&progress, &patient, &case);
        assert_eq!(statuses.len(), 10);

        assert_eq!(statuses[0].id, SectionId::ChiefComplaint);
        assert_eq!(statuses[0].state, SectionState::Completed);
        assert_eq!(statuses[0].last_saved_at, Some(t0()));
        assert!(!statuses[0].is_current);

        assert_eq!(statuses[1].id, SectionId::HistoryOfPresentingIllness);
        assert!(statuses[1].is_current);
        assert_eq!(statuses.iter().filter(|s| s.is_current).count(), 1);
    }

    #[test]
    fn progress_serialises_with_wire_section_ids() {
        let patient = adult_male();
        let case = CaseData::default();
        let mut progress = WorkflowProgress::new();
        progress.record_completion(SectionId::VitalSigns, t0(), &patient, &case);

        let yaml = serde_yaml::to_string(&progress).unwrap();
        assert!(yaml.contains("vital_signs:"));
        assert!(yaml.contains("overallProgress: 10"));
        assert!(yaml.contains("currentSection: chief_complaint"));

        let back: WorkflowProgress = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, progress);
    }
}
