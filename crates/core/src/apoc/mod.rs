//! APOC structured clinical documentation workflow.
//!
//! The workflow is built from four pure pieces:
//! - [`sections`]: the static, ordered registry of documentation sections
//! - [`visibility`]: which sections apply to a given patient and case
//! - [`progress`]: per-section completion and the derived completion percentage
//! - [`validation`]: declarative field rules checked before a section is marked complete
//!
//! None of these functions perform I/O or hold mutable global state. The registry and the rule
//! table are process-wide constants; callers pass snapshots of patient, case and progress in.

pub mod progress;
pub mod sections;
pub mod validation;
pub mod visibility;

pub use progress::{
    calculate_progress, next_incomplete_section, section_state, section_statuses, SectionProgress,
    SectionState, SectionStatus, WorkflowProgress,
};
pub use sections::{section, sections, Section, SectionId, Visibility, VisibilityPredicate};
pub use validation::{
    rules, validate_section, RuleCheck, SectionData, ValidationResult, ValidationRule,
};
pub use visibility::{is_visible, visible_sections};
