//! Patient and case primitives shared across ZahaniFlow crates.
//!
//! These are the snapshot inputs handed to the APOC workflow engine. They are deliberately
//! lenient on the way in: unknown enum strings deserialise to an `Unrecognised` variant rather
//! than failing, so a stale or hand-edited form payload never blocks section resolution.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing patient primitives from free text.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// The gender string did not match any supported value.
    #[error("unknown gender '{0}' (expected Male, Female or Other)")]
    UnknownGender(String),
}

/// Recorded patient gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
    /// Any value outside the supported set.
    #[serde(other)]
    Unrecognised,
}

impl Gender {
    /// Wire representation as stored by the clinic records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::Unrecognised => "Unrecognised",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = TypesError;

    /// Parses a gender from user input, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [Gender::Male, Gender::Female, Gender::Other]
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypesError::UnknownGender(s.to_string()))
    }
}

/// Stroke classification recorded against a clinical case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrokeClassification {
    #[serde(rename = "ischemic")]
    Ischemic,
    #[serde(rename = "hemorrhagic")]
    Hemorrhagic,
    #[serde(rename = "tia")]
    Tia,
    #[serde(rename = "n/a")]
    NotApplicable,
    #[serde(rename = "unrecognised", other)]
    Unrecognised,
}

impl StrokeClassification {
    /// Maps a wire value to a classification. Unknown values are kept as `Unrecognised`.
    pub fn from_wire(s: &str) -> Self {
        match s.trim() {
            "ischemic" => Self::Ischemic,
            "hemorrhagic" => Self::Hemorrhagic,
            "tia" => Self::Tia,
            "n/a" => Self::NotApplicable,
            _ => Self::Unrecognised,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ischemic => "ischemic",
            Self::Hemorrhagic => "hemorrhagic",
            Self::Tia => "tia",
            Self::NotApplicable => "n/a",
            Self::Unrecognised => "unrecognised",
        }
    }

    /// True for every recorded classification except the explicit "n/a".
    pub fn is_stroke_related(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl fmt::Display for StrokeClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrokeClassification {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_wire(s))
    }
}

/// The subset of patient demographics the documentation workflow depends on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    /// Age in whole years, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
}

impl PatientSummary {
    pub fn new(gender: Option<Gender>, age: Option<i32>) -> Self {
        Self { gender, age }
    }
}

/// Case-in-progress fields consulted by section visibility rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseData {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub stroke_classification: Option<StrokeClassification>,
}

impl CaseData {
    pub fn with_stroke(classification: StrokeClassification) -> Self {
        Self {
            stroke_classification: Some(classification),
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<StrokeClassification>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(StrokeClassification::from_wire))
}
