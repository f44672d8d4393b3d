use crate::catalog::{FeatureCatalog, HALLUCINATIONS, PARANOIA};
use crate::error::{AppError, Result};
use crate::ml::FeatureVector;
use crate::models::Advisory;
use serde::{Deserialize, Serialize};

pub const PSYCHOSIS_ADVISORY: &str = "⚠️ Urgent Attention Recommended: Combination of hallucinations and paranoia may indicate a serious condition. Please consult a mental health professional.";

/// Fires when every listed symptom is present in the vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRule {
    pub name: String,
    pub symptoms: Vec<String>,
    pub message: String,
}

impl AdvisoryRule {
    pub fn new<I, S>(name: impl Into<String>, symptoms: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Hallucinations together with paranoia
    pub fn builtin() -> Self {
        Self::new(
            "hallucinations_with_paranoia",
            [HALLUCINATIONS, PARANOIA],
            PSYCHOSIS_ADVISORY,
        )
    }

    /// Reject rules that cannot fire against this catalog
    pub fn check(&self, catalog: &FeatureCatalog) -> Result<()> {
        if self.symptoms.is_empty() {
            return Err(AppError::Configuration(format!(
                "advisory rule '{}' lists no symptoms",
                self.name
            )));
        }

        if let Some(missing) = self.symptoms.iter().find(|s| !catalog.contains(s)) {
            return Err(AppError::Configuration(format!(
                "advisory rule '{}' names unknown symptom '{}'",
                self.name, missing
            )));
        }

        Ok(())
    }

    pub fn evaluate(&self, vector: &FeatureVector, catalog: &FeatureCatalog) -> bool {
        self.symptoms.iter().all(|symptom| {
            catalog
                .index_of(symptom)
                .and_then(|i| vector.get(i))
                .is_some_and(|v| v > 0)
        })
    }

    pub fn to_advisory(&self) -> Advisory {
        Advisory {
            rule: self.name.clone(),
            message: self.message.clone(),
        }
    }
}
