//! Visibility resolution.

use super::sections::{section, sections, Section, SectionId};
use zahani_types::{CaseData, PatientSummary};

/// Returns the sections that apply to `patient` and `case`, in registry order.
///
/// Unconditional sections are always included. Conditional sections are included when their
/// predicate holds; missing age or gender never matches a predicate.
pub fn visible_sections(patient: &PatientSummary, case: &CaseData) -> Vec<&'static Section> {
    sections()
        .iter()
        .filter(|s| s.applies_to(patient, case))
        .collect()
}

/// Returns true if the given section applies to `patient` and `case`.
pub fn is_visible(id: SectionId, patient: &PatientSummary, case: &CaseData) -> bool {
    section(id).applies_to(patient, case)
}
