/// Integration tests for the assessment pipeline
///
/// These tests verify, against the built-in catalog and training table:
/// - Feature vector layout for arbitrary selections
/// - Probability coverage of the training labels
/// - The hallucinations + paranoia advisory
/// - Awaiting-input handling of empty selections
/// - Determinism across repeated assessments

use mh_assistant::{
    assessment::{AssessmentEngine, AWAITING_INPUT_MESSAGE, DISCLAIMER, PSYCHOSIS_ADVISORY},
    catalog::FeatureCatalog,
    ml::{FeatureEncoding, MLConfig, ModelType},
    models::{AssessmentOutcome, Severity, SymptomSelection},
};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

fn setup_engine() -> AssessmentEngine {
    AssessmentEngine::from_config(&MLConfig::default()).unwrap()
}

fn random_selection(rng: &mut StdRng, catalog: &FeatureCatalog) -> SymptomSelection {
    let all = [Severity::None, Severity::Mild, Severity::Moderate, Severity::Severe];
    let count = rng.gen_range(0..=catalog.len());

    let mut symptoms = catalog.features().to_vec();
    symptoms.shuffle(rng);

    symptoms
        .into_iter()
        .take(count)
        .fold(SymptomSelection::new(), |selection, symptom| {
            let severity = all[rng.gen_range(0..all.len())];
            selection.with_symptom(symptom, severity)
        })
}

#[test]
fn test_vector_layout_for_random_selections() {
    let engine = setup_engine();
    let catalog = engine.catalog();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..200 {
        let selection = random_selection(&mut rng, catalog);
        let vector = engine.encode(&selection).unwrap();

        assert_eq!(vector.len(), catalog.len());
        for (i, feature) in catalog.features().iter().enumerate() {
            let expected = selection.symptoms.get(feature).map_or(0, |s| s.value());
            assert_eq!(vector.get(i), Some(expected), "position of {}", feature);
        }
    }
}

#[test]
fn test_probabilities_cover_training_labels() {
    let engine = setup_engine();
    let mut rng = StdRng::seed_from_u64(7);
    let classes = engine.classifier().classes().to_vec();

    for _ in 0..100 {
        let selection = random_selection(&mut rng, engine.catalog());
        let assessment = engine.assess(&selection).unwrap();

        if assessment.feature_vector.is_all_zero() {
            assert!(assessment.is_awaiting_input());
            continue;
        }

        let labels: Vec<String> = assessment
            .probabilities()
            .iter()
            .map(|p| p.label.clone())
            .collect();
        assert_eq!(labels, classes);

        let total: f64 = assessment.probabilities().iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-9, "probabilities sum to {}", total);
        assert!(assessment
            .probabilities()
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.probability)));
    }
}

#[test]
fn test_advisory_iff_hallucinations_and_paranoia() {
    let engine = setup_engine();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..200 {
        let selection = random_selection(&mut rng, engine.catalog());
        let assessment = engine.assess(&selection).unwrap();

        let present = |name: &str| {
            selection
                .symptoms
                .get(name)
                .is_some_and(|s| *s != Severity::None)
        };
        let expected = present("hallucinations") && present("paranoia");

        assert_eq!(assessment.advisory_fired(), expected);
    }
}

#[test]
fn test_scenario_hallucinations_and_paranoia() {
    let engine = setup_engine();
    let selection = SymptomSelection::new()
        .with_symptom("hallucinations", Severity::Severe)
        .with_symptom("paranoia", Severity::Moderate);

    let assessment = engine.assess(&selection).unwrap();

    assert_eq!(assessment.feature_vector.nonzero_count(), 2);
    assert_eq!(assessment.feature_vector.as_slice(), &[0, 0, 0, 2, 3, 0, 0, 0]);
    assert_eq!(assessment.probabilities().len(), 5);
    assert_eq!(assessment.advisory().unwrap().message, PSYCHOSIS_ADVISORY);
}

#[test]
fn test_scenario_anxiety_only() {
    let engine = setup_engine();
    let selection = SymptomSelection::new().with_symptom("anxiety", Severity::Mild);

    let assessment = engine.assess(&selection).unwrap();

    assert!(!assessment.is_awaiting_input());
    assert!(!assessment.advisory_fired());
    assert_eq!(assessment.probabilities().len(), 5);
}

#[test]
fn test_scenario_no_selection() {
    let engine = setup_engine();

    let assessment = engine.assess(&SymptomSelection::new()).unwrap();

    match &assessment.outcome {
        AssessmentOutcome::AwaitingInput { message } => {
            assert_eq!(message, AWAITING_INPUT_MESSAGE)
        }
        other => panic!("expected awaiting input, got {:?}", other),
    }
    assert_eq!(assessment.disclaimer, DISCLAIMER);
}

#[test]
fn test_repeated_assessment_is_deterministic() {
    let engine = setup_engine();
    let selection = SymptomSelection::new()
        .with_symptom("depressed_mood", Severity::Moderate)
        .with_symptom("sleep_disturbance", Severity::Mild);

    let first = engine.assess(&selection).unwrap();
    let second = engine.assess(&selection).unwrap();

    assert_eq!(first.probabilities(), second.probabilities());
    assert_ne!(first.id, second.id);
}

#[test]
fn test_same_seed_engines_agree() {
    let a = setup_engine();
    let b = setup_engine();
    let selection = SymptomSelection::new()
        .with_symptom("memory_loss", Severity::Severe)
        .with_symptom("anxiety", Severity::Mild);

    assert_eq!(
        a.assess(&selection).unwrap().probabilities(),
        b.assess(&selection).unwrap().probabilities()
    );
}

#[test]
fn test_decision_tree_recalls_training_rows() {
    let config = MLConfig {
        kind: ModelType::DecisionTree,
        encoding: FeatureEncoding::Presence,
        ..MLConfig::default()
    };
    let engine = AssessmentEngine::from_config(&config).unwrap();

    // schizophrenia row: paranoia, hallucinations, delusions
    let selection = SymptomSelection::new()
        .with_symptom("paranoia", Severity::Mild)
        .with_symptom("hallucinations", Severity::Severe)
        .with_symptom("delusions", Severity::Moderate);
    let assessment = engine.assess(&selection).unwrap();

    let top = assessment.top_diagnosis().unwrap();
    assert_eq!(top.label, "schizophrenia");
    assert_eq!(top.probability, 1.0);
    assert!(assessment.advisory_fired());
}

#[test]
fn test_category_filter_enforced() {
    let engine = setup_engine();
    let selection = SymptomSelection::new()
        .with_categories(["Behavioral"])
        .with_symptom("hallucinations", Severity::Mild);

    assert!(engine.assess(&selection).is_err());

    let unknown = SymptomSelection::new()
        .with_categories(["Somatic"])
        .with_symptom("anxiety", Severity::Mild);
    assert!(engine.assess(&unknown).is_err());
}
