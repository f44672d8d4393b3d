/// Machine learning for symptom-based diagnosis suggestions
///
/// This module provides:
/// - The labeled training table and its alignment to the symptom catalog
/// - Feature encoding of a symptom selection
/// - Random forest and decision tree classifiers with class probabilities

pub mod classifier;
pub mod dataset;
pub mod features;
pub mod models;

pub use classifier::{
    Classifier, DecisionTreeClassifierWrapper, DiagnosisClassifier, RandomForestClassifier,
};
pub use dataset::{ExampleRow, TrainingTable};
pub use features::{FeatureEncoder, FeatureVector};
pub use models::{
    ClassMetrics, DiagnosisProbability, FeatureEncoding, MLConfig, ModelMetadata, ModelMetrics,
    ModelType, Prediction, TrainingDataset,
};
