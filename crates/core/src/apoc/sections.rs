//! Section registry.
//!
//! The registry is a fixed, ordered table of the twelve clinical documentation sections. It is
//! never modified at runtime. Conditional sections carry their visibility predicate inline, so the
//! rule deciding whether a section applies sits next to the section it governs.

use crate::{WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zahani_types::{CaseData, Gender, PatientSummary};

/// Identifier of a documentation section.
///
/// Variant declaration order matches registry order, so the derived `Ord` sorts sections the way
/// the workflow presents them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    ChiefComplaint,
    HistoryOfPresentingIllness,
    ReviewOfSystems,
    PastMedicalHistory,
    DevelopmentalHistory,
    GynecologicalObstetricHistory,
    PersonalFamilySocialHistory,
    VitalSigns,
    Examination,
    Diagnosis,
    Investigations,
    Plan,
}

impl SectionId {
    /// All section ids in registry order.
    pub const ALL: [SectionId; 12] = [
        SectionId::ChiefComplaint,
        SectionId::HistoryOfPresentingIllness,
        SectionId::ReviewOfSystems,
        SectionId::PastMedicalHistory,
        SectionId::DevelopmentalHistory,
        SectionId::GynecologicalObstetricHistory,
        SectionId::PersonalFamilySocialHistory,
        SectionId::VitalSigns,
        SectionId::Examination,
        SectionId::Diagnosis,
        SectionId::Investigations,
        SectionId::Plan,
    ];

    /// Wire identifier, e.g. `vital_signs`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::ChiefComplaint => "chief_complaint",
            SectionId::HistoryOfPresentingIllness => "history_of_presenting_illness",
            SectionId::ReviewOfSystems => "review_of_systems",
            SectionId::PastMedicalHistory => "past_medical_history",
            SectionId::DevelopmentalHistory => "developmental_history",
            SectionId::GynecologicalObstetricHistory => "gynecological_obstetric_history",
            SectionId::PersonalFamilySocialHistory => "personal_family_social_history",
            SectionId::VitalSigns => "vital_signs",
            SectionId::Examination => "examination",
            SectionId::Diagnosis => "diagnosis",
            SectionId::Investigations => "investigations",
            SectionId::Plan => "plan",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = WorkflowError;

    fn from_str(s: &str) -> WorkflowResult<Self> {
        let s = s.trim();
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| WorkflowError::UnknownSection(s.to_string()))
    }
}

/// Pure predicate deciding whether a conditional section applies.
pub type VisibilityPredicate = fn(&PatientSummary, &CaseData) -> bool;

/// How a section's inclusion is decided.
#[derive(Clone, Copy, Debug)]
pub enum Visibility {
    /// Always part of the workflow.
    Always,
    /// Part of the workflow only when the predicate holds.
    When(VisibilityPredicate),
}

/// Static metadata for one documentation section.
#[derive(Clone, Copy, Debug)]
pub struct Section {
    pub id: SectionId,
    /// Position in the workflow, contiguous from 1.
    pub order: u8,
    pub title: &'static str,
    pub visibility: Visibility,
    /// Display-only labels; subsections carry no completion state of their own.
    pub subsections: &'static [&'static str],
}

impl Section {
    pub fn is_conditional(&self) -> bool {
        matches!(self.visibility, Visibility::When(_))
    }

    /// Evaluates this section's visibility for a patient and case.
    pub fn applies_to(&self, patient: &PatientSummary, case: &CaseData) -> bool {
        match self.visibility {
            Visibility::Always => true,
            Visibility::When(predicate) => predicate(patient, case),
        }
    }
}

/// Paediatric patients, or any case with a recorded stroke classification other than "n/a".
fn developmental_history_applies(patient: &PatientSummary, case: &CaseData) -> bool {
    let paediatric = matches!(patient.age, Some(age) if (0..18).contains(&age));
    let stroke_related = case
        .stroke_classification
        .is_some_and(|c| c.is_stroke_related());
    paediatric || stroke_related
}

fn gynecological_history_applies(patient: &PatientSummary, _case: &CaseData) -> bool {
    patient.gender == Some(Gender::Female)
}

static SECTIONS: [Section; 12] = [
    Section {
        id: SectionId::ChiefComplaint,
        order: 1,
        title: "Chief Complaint",
        visibility: Visibility::Always,
        subsections: &[],
    },
    Section {
        id: SectionId::HistoryOfPresentingIllness,
        order: 2,
        title: "History of Presenting Illness",
        visibility: Visibility::Always,
        subsections: &[
            "Onset",
            "Duration",
            "Character",
            "Aggravating & Relieving Factors",
        ],
    },
    Section {
        id: SectionId::ReviewOfSystems,
        order: 3,
        title: "Review of Systems",
        visibility: Visibility::Always,
        subsections: &[
            "General",
            "Cardiovascular",
            "Respiratory",
            "Gastrointestinal",
            "Genitourinary",
            "Neurological",
            "Musculoskeletal",
        ],
    },
    Section {
        id: SectionId::PastMedicalHistory,
        order: 4,
        title: "Past Medical History",
        visibility: Visibility::Always,
        subsections: &[
            "Medical Conditions",
            "Surgical History",
            "Medications",
            "Allergies",
        ],
    },
    Section {
        id: SectionId::DevelopmentalHistory,
        order: 5,
        title: "Developmental History",
        visibility: Visibility::When(developmental_history_applies),
        subsections: &["Birth History", "Milestones", "Immunisations"],
    },
    Section {
        id: SectionId::GynecologicalObstetricHistory,
        order: 6,
        title: "Gynecological & Obstetric History",
        visibility: Visibility::When(gynecological_history_applies),
        subsections: &["Menstrual History", "Obstetric History", "Contraception"],
    },
    Section {
        id: SectionId::PersonalFamilySocialHistory,
        order: 7,
        title: "Personal, Family & Social History",
        visibility: Visibility::Always,
        subsections: &["Personal History", "Family History", "Social History"],
    },
    Section {
        id: SectionId::VitalSigns,
        order: 8,
        title: "Vital Signs",
        visibility: Visibility::Always,
        subsections: &[
            "Blood Pressure",
            "Pulse",
            "Temperature",
            "Respiratory Rate",
            "Oxygen Saturation",
        ],
    },
    Section {
        id: SectionId::Examination,
        order: 9,
        title: "Examination",
        visibility: Visibility::Always,
        subsections: &["General Examination", "Systemic Examination"],
    },
    Section {
        id: SectionId::Diagnosis,
        order: 10,
        title: "Diagnosis",
        visibility: Visibility::Always,
        subsections: &[],
    },
    Section {
        id: SectionId::Investigations,
        order: 11,
        title: "Investigations",
        visibility: Visibility::Always,
        subsections: &[],
    },
    Section {
        id: SectionId::Plan,
        order: 12,
        title: "Plan",
        visibility: Visibility::Always,
        subsections: &[],
    },
];

/// The full registry, in workflow order.
pub fn sections() -> &'static [Section] {
    &SECTIONS
}

/// Metadata for one section.
pub fn section(id: SectionId) -> &'static Section {
    // Registry position equals enum discriminant; see `registry_index_matches_discriminant`.
    &SECTIONS[id as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_has_twelve_unique_sections() {
        let ids: HashSet<SectionId> = sections().iter().map(|s| s.id).collect();
        assert_eq!(sections().len(), 12);
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn orders_are_contiguous_from_one() {
        let orders: Vec<u8> = sections().iter().map(|s| s.order).collect();
        assert_eq!(orders, (1..=12).collect::<Vec<u8>>());
    }

    #[test]
    fn registry_index_matches_discriminant() {
        for (index, s) in sections().iter().enumerate() {
            assert_eq!(s.id as usize, index);
            assert_eq!(section(s.id).id, s.id);
            assert_eq!(SectionId::ALL[index], s.id);
        }
    }

    #[test]
    fn exactly_two_sections_are_conditional() {
        let conditional: Vec<SectionId> = sections()
            .iter()
            .filter(|s| s.is_conditional())
            .map(|s| s.id)
            .collect();
        assert_eq!(
            conditional,
            vec![
                SectionId::DevelopmentalHistory,
                SectionId::GynecologicalObstetricHistory
            ]
        );
    }

    #[test]
    fn section_ids_round_trip_through_wire_names() {
        for id in SectionId::ALL {
            assert_eq!(id.as_str().parse::<SectionId>().unwrap(), id);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }

    #[test]
    fn unknown_section_id_is_rejected() {
        let err = "social_media_history".parse::<SectionId>().unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownSection(s) if s == "social_media_history"));
    }

    #[test]
    fn derived_ordering_follows_registry() {
        let mut shuffled = vec![SectionId::Plan, SectionId::ChiefComplaint, SectionId::VitalSigns];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![SectionId::ChiefComplaint, SectionId::VitalSigns, SectionId::Plan]
        );
    }
}
