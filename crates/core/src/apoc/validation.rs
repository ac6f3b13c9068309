//! Declarative section validation.
//!
//! Rules are plain records in a single static table, evaluated in registration order. Each rule
//! targets one field of a section payload. Type-specific checks are permissive: a length rule
//! ignores non-string values and a range rule ignores non-numeric values, because the same field
//! may legitimately arrive in a different shape. Only `Required` treats a missing field as a
//! failure.
//!
//! Validation failure is data ([`ValidationResult`]), never an error.

use super::sections::SectionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Live form payload for one section: field name to value. `null` counts as absent.
pub type SectionData = serde_json::Map<String, Value>;

/// Signature of a custom check: the field value (if present) and the whole section payload.
pub type CustomCheck = fn(Option<&Value>, &SectionData) -> bool;

/// The check a rule applies to its field.
#[derive(Clone, Copy, Debug)]
pub enum RuleCheck {
    /// Value must be present and, if a string, contain a non-whitespace character.
    Required,
    /// Non-empty string values must have at least this many characters.
    MinLength(usize),
    /// String values must have at most this many characters.
    MaxLength(usize),
    /// Numeric values must lie in `[min, max]`.
    NumericRange { min: f64, max: f64 },
    Custom(CustomCheck),
}

#[derive(Clone, Copy, Debug)]
pub struct ValidationRule {
    pub section: SectionId,
    pub field: &'static str,
    pub check: RuleCheck,
    pub message: &'static str,
}

impl ValidationRule {
    /// Evaluates this rule against a section payload.
    pub fn passes(&self, data: &SectionData) -> bool {
        let value = data.get(self.field).filter(|v| !v.is_null());

        match self.check {
            RuleCheck::Required => match value {
                None => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            },
            RuleCheck::MinLength(min) => match value {
                Some(Value::String(s)) if !s.is_empty() => s.chars().count() >= min,
                _ => true,
            },
            RuleCheck::MaxLength(max) => match value {
                Some(Value::String(s)) => s.chars().count() <= max,
                _ => true,
            },
            RuleCheck::NumericRange { min, max } => match value.and_then(Value::as_f64) {
                Some(n) => (min..=max).contains(&n),
                None => true,
            },
            RuleCheck::Custom(check) => check(value, data),
        }
    }
}

/// Outcome of validating one section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Messages of every failing rule, in registration order.
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

fn diastolic_below_systolic(value: Option<&Value>, data: &SectionData) -> bool {
    let diastolic = value.and_then(Value::as_f64);
    let systolic = data.get("vitalSignsBpSystolic").and_then(Value::as_f64);
    match (diastolic, systolic) {
        (Some(d), Some(s)) => d < s,
        _ => true,
    }
}

static RULES: &[ValidationRule] = &[
    ValidationRule {
        section: SectionId::ChiefComplaint,
        field: "chiefComplaint",
        check: RuleCheck::MinLength(10),
        message: "Chief complaint must be at least 10 characters",
    },
    ValidationRule {
        section: SectionId::ChiefComplaint,
        field: "chiefComplaint",
        check: RuleCheck::MaxLength(2000),
        message: "Chief complaint must be at most 2000 characters",
    },
    ValidationRule {
        section: SectionId::VitalSigns,
        field: "vitalSignsSpo2",
        check: RuleCheck::NumericRange {
            min: 0.0,
            max: 100.0,
        },
        message: "Oxygen saturation must be between 0 and 100%",
    },
    ValidationRule {
        section: SectionId::VitalSigns,
        field: "vitalSignsPulse",
        check: RuleCheck::NumericRange {
            min: 30.0,
            max: 250.0,
        },
        message: "Pulse rate must be between 30 and 250 bpm",
    },
    ValidationRule {
        section: SectionId::VitalSigns,
        field: "vitalSignsTemperature",
        check: RuleCheck::NumericRange {
            min: 32.0,
            max: 45.0,
        },
        message: "Temperature must be between 32.0 and 45.0 °C",
    },
    ValidationRule {
        section: SectionId::VitalSigns,
        field: "vitalSignsRespiratoryRate",
        check: RuleCheck::NumericRange {
            min: 4.0,
            max: 60.0,
        },
        message: "Respiratory rate must be between 4 and 60 breaths/min",
    },
    ValidationRule {
        section: SectionId::VitalSigns,
        field: "vitalSignsBpDiastolic",
        check: RuleCheck::Custom(diastolic_below_systolic),
        message: "Diastolic pressure must be lower than systolic pressure",
    },
    ValidationRule {
        section: SectionId::Diagnosis,
        field: "primaryDiagnosis",
        check: RuleCheck::Required,
        message: "Primary diagnosis is required",
    },
    ValidationRule {
        section: SectionId::Plan,
        field: "managementPlan",
        check: RuleCheck::Required,
        message: "Management plan is required",
    },
];

/// The full rule table, in registration order.
pub fn rules() -> &'static [ValidationRule] {
    RULES
}

/// Validates a section payload against every rule registered for that section.
pub fn validate_section(section: SectionId, data: &SectionData) -> ValidationResult {
    let errors = RULES
        .iter()
        .filter(|rule| rule.section == section)
        .filter(|rule| !rule.passes(data))
        .map(|rule| rule.message.to_string())
        .collect();

    ValidationResult::from_errors(errors)
}
