//! Assessment engine
//!
//! Encodes a symptom selection, asks the classifier for class probabilities
//! and evaluates the advisory rules. An empty selection short-circuits to the
//! awaiting-input placeholder without touching the model.

pub mod advisory;

pub use advisory::{AdvisoryRule, PSYCHOSIS_ADVISORY};

use crate::catalog::FeatureCatalog;
use crate::error::{AppError, Result};
use crate::ml::{
    DiagnosisClassifier, FeatureEncoder, FeatureEncoding, FeatureVector, MLConfig, TrainingTable,
};
use crate::models::{Assessment, AssessmentOutcome, SymptomSelection};
use tracing::{debug, info, warn};

pub const APP_TITLE: &str = "🧠 Mental Health Diagnostic Assistant";

pub const DISCLAIMER: &str = "🧪 Prototype — Not a diagnostic tool. Please seek professional evaluation for any mental health concerns.";

pub const AWAITING_INPUT_MESSAGE: &str = "Select at least one symptom to begin.";

/// Immutable pipeline from selection to assessment
pub struct AssessmentEngine {
    catalog: FeatureCatalog,
    classifier: DiagnosisClassifier,
    rules: Vec<AdvisoryRule>,
    encoding: FeatureEncoding,
}

impl AssessmentEngine {
    /// Engine with the built-in advisory rule
    pub fn new(
        catalog: FeatureCatalog,
        classifier: DiagnosisClassifier,
        encoding: FeatureEncoding,
    ) -> Result<Self> {
        Self::with_rules(catalog, classifier, encoding, vec![AdvisoryRule::builtin()])
    }

    pub fn with_rules(
        catalog: FeatureCatalog,
        classifier: DiagnosisClassifier,
        encoding: FeatureEncoding,
        rules: Vec<AdvisoryRule>,
    ) -> Result<Self> {
        if classifier.feature_names() != catalog.features() {
            return Err(AppError::Configuration(format!(
                "classifier was trained on features {:?}, catalog layout is {:?}",
                classifier.feature_names(),
                catalog.features()
            )));
        }

        for rule in &rules {
            rule.check(&catalog)?;
        }

        Ok(Self {
            catalog,
            classifier,
            rules,
            encoding,
        })
    }

    /// Build the catalog, align the training table and fit the configured model
    pub fn from_config(config: &MLConfig) -> Result<Self> {
        let catalog = FeatureCatalog::builtin();
        let table = TrainingTable::builtin().aligned_to(&catalog)?;
        let classifier = DiagnosisClassifier::train(&table, config)?;

        Self::new(catalog, classifier, config.encoding)
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    pub fn classifier(&self) -> &DiagnosisClassifier {
        &self.classifier
    }

    pub fn rules(&self) -> &[AdvisoryRule] {
        &self.rules
    }

    pub fn encoding(&self) -> FeatureEncoding {
        self.encoding
    }

    pub fn encode(&self, selection: &SymptomSelection) -> Result<FeatureVector> {
        FeatureEncoder::new(&self.catalog, self.encoding).encode(selection)
    }

    /// Run one interaction
    pub fn assess(&self, selection: &SymptomSelection) -> Result<Assessment> {
        let vector = self.encode(selection).inspect_err(|e| {
            warn!("Rejected symptom selection: {}", e);
        })?;

        if vector.is_all_zero() {
            debug!("No symptoms selected, awaiting input");
            return Ok(Assessment::new(
                vector,
                AssessmentOutcome::AwaitingInput {
                    message: AWAITING_INPUT_MESSAGE.to_string(),
                },
                DISCLAIMER,
            ));
        }

        let prediction = self.classifier.predict_proba(&vector)?;

        let advisory = self
            .rules
            .iter()
            .find(|rule| rule.evaluate(&vector, &self.catalog))
            .map(AdvisoryRule::to_advisory);

        debug!(
            selected = vector.nonzero_count(),
            classes = prediction.probabilities.len(),
            top = %prediction.value,
            "Scored symptom selection"
        );

        if let Some(advisory) = &advisory {
            info!(rule = %advisory.rule, "Advisory raised for assessment");
        }

        Ok(Assessment::new(
            vector,
            AssessmentOutcome::Scored {
                probabilities: prediction.probabilities,
                advisory,
            },
            DISCLAIMER,
        ))
    }
}
