use crate::error::{AppError, Result};
use crate::ml::dataset::TrainingTable;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ML model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MLConfig {
    /// Which model to fit at startup
    #[serde(default)]
    pub kind: ModelType,

    /// Number of trees in the forest
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,

    /// Seed for bootstrap resampling
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// How selected severities are written into the feature vector
    #[serde(default)]
    pub encoding: FeatureEncoding,
}

impl Default for MLConfig {
    fn default() -> Self {
        Self {
            kind: ModelType::default(),
            n_trees: default_n_trees(),
            seed: default_seed(),
            encoding: FeatureEncoding::default(),
        }
    }
}

impl MLConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(AppError::Configuration(
                "model.n_trees must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_n_trees() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

/// Inference-time encoding of a selected symptom
///
/// Training rows are 0/1 presence flags. `Severity` feeds 1/2/3 to the model
/// anyway, `Presence` clamps every selected symptom to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureEncoding {
    #[default]
    Severity,
    Presence,
}

/// Probability assigned to one diagnosis label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisProbability {
    pub label: String,
    pub probability: f64,
}

impl DiagnosisProbability {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Prediction result with confidence score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction<T> {
    /// Predicted value
    pub value: T,

    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,

    /// All class probabilities, in class order
    pub probabilities: Vec<DiagnosisProbability>,
}

impl<T> Prediction<T> {
    pub fn new(value: T, confidence: f64) -> Self {
        Self {
            value,
            confidence,
            probabilities: Vec::new(),
        }
    }

    pub fn with_probabilities(mut self, probabilities: Vec<DiagnosisProbability>) -> Self {
        self.probabilities = probabilities;
        self
    }

    /// Sum of all class probabilities
    pub fn total_probability(&self) -> f64 {
        self.probabilities.iter().map(|p| p.probability).sum()
    }
}

/// Training dataset in model layout
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// Feature matrix (n_samples × n_features)
    pub features: Array2<f64>,

    /// Class index per sample
    pub labels: Vec<usize>,

    /// Sorted class names; `labels` index into this
    pub classes: Vec<String>,

    /// Feature names in column order
    pub feature_names: Vec<String>,

    /// Number of samples
    pub n_samples: usize,

    /// Number of features
    pub n_features: usize,
}

impl TrainingDataset {
    /// Build a dataset from a validated training table
    pub fn from_table(table: &TrainingTable) -> Result<Self> {
        table.validate()?;

        let classes = table.classes();
        let n_samples = table.rows.len();
        let n_features = table.feature_names.len();

        let mut features = Array2::zeros((n_samples, n_features));
        let mut labels = Vec::with_capacity(n_samples);

        for (i, row) in table.rows.iter().enumerate() {
            for (j, &val) in row.values.iter().enumerate() {
                features[[i, j]] = val as f64;
            }
            let class_idx = classes
                .iter()
                .position(|c| *c == row.diagnosis)
                .ok_or_else(|| {
                    AppError::Internal(format!("label '{}' missing from classes", row.diagnosis))
                })?;
            labels.push(class_idx);
        }

        Ok(Self {
            features,
            labels,
            classes,
            feature_names: table.feature_names.clone(),
            n_samples,
            n_features,
        })
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// Model evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Accuracy
    pub accuracy: f64,

    /// Macro precision
    pub precision: f64,

    /// Macro recall
    pub recall: f64,

    /// Macro F1 score
    pub f1_score: f64,

    /// Per-class metrics
    pub per_class_metrics: HashMap<String, ClassMetrics>,
}

/// Per-class evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            per_class_metrics: HashMap::new(),
        }
    }
}

impl Default for ModelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Model version
    pub version: String,

    /// Model type
    pub model_type: ModelType,

    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of training samples
    pub n_training_samples: usize,

    /// Number of features
    pub n_features: usize,

    /// Metrics on the training rows
    pub training_metrics: ModelMetrics,

    /// Hyperparameters
    pub hyperparameters: HashMap<String, String>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            version: "1.0".to_string(),
            model_type,
            trained_at: chrono::Utc::now(),
            n_training_samples: 0,
            n_features: 0,
            training_metrics: ModelMetrics::new(),
            hyperparameters: HashMap::new(),
        }
    }

    pub fn with_hyperparameter(mut self, key: &str, value: impl ToString) -> Self {
        self.hyperparameters.insert(key.to_string(), value.to_string());
        self
    }
}

/// Model type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Bagged decision trees
    #[default]
    RandomForest,

    /// Single decision tree on the full table
    DecisionTree,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::RandomForest => write!(f, "Random Forest"),
            ModelType::DecisionTree => write!(f, "Decision Tree"),
        }
    }
}
