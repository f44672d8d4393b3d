use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Ordinal intensity of a selected symptom
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    #[serde(alias = "None")]
    None,
    #[serde(alias = "Mild")]
    Mild,
    #[serde(alias = "Moderate")]
    Moderate,
    #[serde(alias = "Severe")]
    Severe,
}

impl Severity {
    /// Severities a user can choose for a selected symptom
    pub const SELECTABLE: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    /// Feature value for this severity (0..=3)
    pub fn value(&self) -> u8 {
        match self {
            Severity::None => 0,
            Severity::Mild => 1,
            Severity::Moderate => 2,
            Severity::Severe => 3,
        }
    }

    /// Display label as offered in the UI
    pub fn label(&self) -> &'static str {
        match self {
            Severity::None => "None",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

/// What the input collector hands over for one interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomSelection {
    /// Categories the user filtered by; when present, every selected
    /// symptom must belong to one of them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    /// Selected symptoms and their severities
    #[serde(default)]
    pub symptoms: BTreeMap<String, Severity>,
}

impl SymptomSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symptom(mut self, symptom: impl Into<String>, severity: Severity) -> Self {
        self.symptoms.insert(symptom.into(), severity);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Parse a `symptom=severity` pair as given on the command line
    pub fn parse_pair(pair: &str) -> Result<(String, Severity)> {
        let (symptom, severity) = pair.split_once('=').ok_or_else(|| {
            AppError::Validation(format!(
                "expected symptom=severity, got '{}'",
                pair
            ))
        })?;

        let symptom = symptom.trim();
        if symptom.is_empty() {
            return Err(AppError::Validation(format!(
                "missing symptom name in '{}'",
                pair
            )));
        }

        let severity = Severity::from_str(severity.trim()).map_err(|_| {
            AppError::Validation(format!(
                "unknown severity '{}' (expected mild, moderate or severe)",
                severity.trim()
            ))
        })?;

        Ok((symptom.to_string(), severity))
    }
}
