use crate::ml::{DiagnosisProbability, FeatureVector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of one assessment interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique identifier
    pub id: Uuid,

    /// When the assessment was made
    pub assessed_at: DateTime<Utc>,

    /// Encoded selection, in catalog order
    pub feature_vector: FeatureVector,

    /// Scores or the awaiting-input placeholder
    pub outcome: AssessmentOutcome,

    /// Shown with every outcome
    pub disclaimer: String,
}

impl Assessment {
    pub fn new(
        feature_vector: FeatureVector,
        outcome: AssessmentOutcome,
        disclaimer: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessed_at: Utc::now(),
            feature_vector,
            outcome,
            disclaimer: disclaimer.into(),
        }
    }

    pub fn is_awaiting_input(&self) -> bool {
        matches!(self.outcome, AssessmentOutcome::AwaitingInput { .. })
    }

    /// Class probabilities, empty while awaiting input
    pub fn probabilities(&self) -> &[DiagnosisProbability] {
        match &self.outcome {
            AssessmentOutcome::Scored { probabilities, .. } => probabilities,
            AssessmentOutcome::AwaitingInput { .. } => &[],
        }
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        match &self.outcome {
            AssessmentOutcome::Scored { advisory, .. } => advisory.as_ref(),
            AssessmentOutcome::AwaitingInput { .. } => None,
        }
    }

    pub fn advisory_fired(&self) -> bool {
        self.advisory().is_some()
    }

    /// Highest-probability label; ties go to the earliest class
    pub fn top_diagnosis(&self) -> Option<&DiagnosisProbability> {
        self.probabilities().iter().fold(None, |best, p| match best {
            Some(b) if b.probability >= p.probability => Some(b),
            _ => Some(p),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssessmentOutcome {
    /// Nothing selected; the model was not consulted
    AwaitingInput { message: String },

    /// Model output for a non-empty selection
    Scored {
        probabilities: Vec<DiagnosisProbability>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        advisory: Option<Advisory>,
    },
}

/// Rule-based warning raised alongside the scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Name of the rule that fired
    pub rule: String,
    pub message: String,
}
