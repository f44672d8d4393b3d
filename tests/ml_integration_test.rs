/// Integration tests for the diagnosis classifier
///
/// These tests verify the ML pipeline on the built-in table:
/// - Column alignment to the catalog
/// - Random forest and decision tree training
/// - Probability output shape and ordering
/// - Rejection of degenerate tables and mismatched vectors

use mh_assistant::{
    catalog::FeatureCatalog,
    error::AppError,
    ml::{
        DiagnosisClassifier, ExampleRow, FeatureVector, MLConfig, ModelType, TrainingTable,
    },
};

fn aligned_table() -> TrainingTable {
    TrainingTable::builtin()
        .aligned_to(&FeatureCatalog::builtin())
        .unwrap()
}

fn argmax_label(classifier: &DiagnosisClassifier, values: &[u8]) -> String {
    classifier
        .predict_proba(&FeatureVector::new(values.to_vec()))
        .unwrap()
        .value
}

#[test]
fn test_forest_metadata() {
    let classifier = DiagnosisClassifier::train(&aligned_table(), &MLConfig::default()).unwrap();
    let metadata = classifier.metadata();

    assert_eq!(metadata.model_type, ModelType::RandomForest);
    assert_eq!(metadata.n_training_samples, 5);
    assert_eq!(metadata.n_features, 8);
    assert_eq!(metadata.hyperparameters["n_trees"], "100");
    assert_eq!(metadata.hyperparameters["seed"], "42");
    assert_eq!(metadata.training_metrics.per_class_metrics.len(), 5);
}

#[test]
fn test_classes_sorted() {
    let classifier = DiagnosisClassifier::train(&aligned_table(), &MLConfig::default()).unwrap();

    assert_eq!(
        classifier.classes(),
        &[
            "bipolar_disorder",
            "borderline_personality",
            "major_depression",
            "ptsd",
            "schizophrenia",
        ]
    );
}

#[test]
fn test_decision_tree_memorises_rows() {
    let config = MLConfig {
        kind: ModelType::DecisionTree,
        ..MLConfig::default()
    };
    let table = aligned_table();
    let classifier = DiagnosisClassifier::train(&table, &config).unwrap();

    for row in &table.rows {
        assert_eq!(argmax_label(&classifier, &row.values), row.diagnosis);
    }
    assert_eq!(classifier.metadata().training_metrics.accuracy, 1.0);
}

#[test]
fn test_forest_seed_changes_nothing_on_repeat() {
    let config = MLConfig {
        n_trees: 40,
        seed: 5,
        ..MLConfig::default()
    };
    let a = DiagnosisClassifier::train(&aligned_table(), &config).unwrap();
    let b = DiagnosisClassifier::train(&aligned_table(), &config).unwrap();

    let vector = FeatureVector::new(vec![1, 0, 1, 0, 0, 0, 0, 1]);
    assert_eq!(
        a.predict_proba(&vector).unwrap().probabilities,
        b.predict_proba(&vector).unwrap().probabilities
    );
}

#[test]
fn test_probabilities_use_forest_vote_fractions() {
    let config = MLConfig {
        n_trees: 10,
        ..MLConfig::default()
    };
    let classifier = DiagnosisClassifier::train(&aligned_table(), &config).unwrap();

    let prediction = classifier
        .predict_proba(&FeatureVector::new(vec![0, 0, 0, 0, 1, 0, 0, 0]))
        .unwrap();

    for p in &prediction.probabilities {
        let votes = p.probability * 10.0;
        assert!((votes - votes.round()).abs() < 1e-9);
    }
}

#[test]
fn test_vector_length_mismatch() {
    let classifier = DiagnosisClassifier::train(&aligned_table(), &MLConfig::default()).unwrap();

    let result = classifier.predict_proba(&FeatureVector::zeros(7));
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn test_declared_class_without_rows() {
    let mut table = aligned_table();
    table.rows.retain(|row| row.diagnosis != "ptsd");

    let result = DiagnosisClassifier::train(&table, &MLConfig::default());
    assert!(matches!(result, Err(AppError::DegenerateTraining(_))));
}

#[test]
fn test_alternate_table() {
    let table = TrainingTable::new(
        vec!["x".to_string(), "y".to_string()],
        vec![
            ExampleRow::new(vec![1, 0], "left"),
            ExampleRow::new(vec![0, 1], "right"),
            ExampleRow::new(vec![1, 1], "right"),
        ],
    );
    let config = MLConfig {
        kind: ModelType::DecisionTree,
        ..MLConfig::default()
    };
    let classifier = DiagnosisClassifier::train(&table, &config).unwrap();

    assert_eq!(classifier.classes(), &["left", "right"]);
    assert_eq!(argmax_label(&classifier, &[1, 0]), "left");
    assert_eq!(argmax_label(&classifier, &[0, 1]), "right");
}
