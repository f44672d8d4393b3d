use crate::error::{AppError, Result};
use crate::ml::dataset::TrainingTable;
use crate::ml::features::FeatureVector;
use crate::ml::models::{
    ClassMetrics, DiagnosisProbability, MLConfig, ModelMetadata, ModelMetrics, ModelType,
    Prediction, TrainingDataset,
};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};
use std::collections::HashMap;
use tracing::{debug, info};

type Tree = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Trait for classifiers
pub trait Classifier: Send + Sync {
    /// Train the classifier
    fn train(&mut self, dataset: &TrainingDataset) -> Result<ModelMetrics>;

    /// Predict class indices
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>>;

    /// Predict class probabilities (n_samples × n_classes)
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType;

    /// Check if model is trained
    fn is_trained(&self) -> bool;
}

fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let shape = arr.shape();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(shape[0], shape[1], data, false)
}

fn vec_to_labels(vec: &[usize]) -> Vec<i32> {
    vec.iter().map(|&x| x as i32).collect()
}

/// Grow every tree until its leaves are pure; smartcore only splits a node
/// holding more than `min_samples_split` rows
fn tree_parameters() -> DecisionTreeClassifierParameters {
    DecisionTreeClassifierParameters::default()
        .with_criterion(SplitCriterion::Gini)
        .with_min_samples_split(1)
}

/// Accuracy and macro precision/recall/F1 on the given labels
pub(crate) fn calculate_metrics(
    y_true: &[usize],
    y_pred: &[usize],
    classes: &[String],
) -> ModelMetrics {
    let n_samples = y_true.len();
    if n_samples == 0 || classes.is_empty() {
        return ModelMetrics::new();
    }

    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    let accuracy = correct as f64 / n_samples as f64;

    let mut per_class = HashMap::new();

    for (class_idx, class_name) in classes.iter().enumerate() {
        let tp = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| **t == class_idx && **p == class_idx)
            .count();

        let fp = y_pred
            .iter()
            .zip(y_true.iter())
            .filter(|(p, t)| **p == class_idx && **t != class_idx)
            .count();

        let fn_count = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| **t == class_idx && **p != class_idx)
            .count();

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };

        let recall = if tp + fn_count > 0 {
            tp as f64 / (tp + fn_count) as f64
        } else {
            0.0
        };

        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let support = y_true.iter().filter(|&&t| t == class_idx).count();

        per_class.insert(
            class_name.clone(),
            ClassMetrics {
                precision,
                recall,
                f1_score: f1,
                support,
            },
        );
    }

    let n_classes = classes.len() as f64;
    let avg_precision = per_class.values().map(|m| m.precision).sum::<f64>() / n_classes;
    let avg_recall = per_class.values().map(|m| m.recall).sum::<f64>() / n_classes;
    let avg_f1 = per_class.values().map(|m| m.f1_score).sum::<f64>() / n_classes;

    ModelMetrics {
        accuracy,
        precision: avg_precision,
        recall: avg_recall,
        f1_score: avg_f1,
        per_class_metrics: per_class,
    }
}

/// Turn per-sample votes into an n_samples × n_classes probability matrix
fn votes_to_proba(votes: &[Vec<usize>], n_samples: usize, n_classes: usize) -> Array2<f64> {
    let mut proba = Array2::zeros((n_samples, n_classes));
    if votes.is_empty() {
        return proba;
    }

    for member_votes in votes {
        for (i, &class_idx) in member_votes.iter().enumerate() {
            if class_idx < n_classes {
                proba[[i, class_idx]] += 1.0;
            }
        }
    }

    proba.mapv_inplace(|v| v / votes.len() as f64);
    proba
}

/// One voter in the ensemble
enum ForestMember {
    Tree(Tree),
    /// Bootstrap sample held a single class
    Constant(usize),
}

impl ForestMember {
    fn fit(x: &DenseMatrix<f64>, y: &[usize]) -> Result<Self> {
        let first = y
            .first()
            .copied()
            .ok_or_else(|| AppError::DegenerateTraining("empty bootstrap sample".to_string()))?;

        if y.iter().all(|&label| label == first) {
            return Ok(ForestMember::Constant(first));
        }

        let tree = Tree::fit(x, &vec_to_labels(y), tree_parameters())
            .map_err(|e| AppError::Model(format!("Failed to train decision tree: {}", e)))?;
        Ok(ForestMember::Tree(tree))
    }

    fn predict(&self, x: &DenseMatrix<f64>, n_samples: usize) -> Result<Vec<usize>> {
        match self {
            ForestMember::Tree(tree) => {
                let predictions = tree
                    .predict(x)
                    .map_err(|e| AppError::Model(format!("Prediction failed: {}", e)))?;
                Ok(predictions.iter().map(|&p| p as usize).collect())
            }
            ForestMember::Constant(class_idx) => Ok(vec![*class_idx; n_samples]),
        }
    }
}

/// Random forest as bagged trees: each tree is fit on a seeded bootstrap
/// resample and considers every feature at every split
pub struct RandomForestClassifier {
    /// Model metadata
    metadata: ModelMetadata,

    members: Vec<ForestMember>,

    n_trees: usize,

    seed: u64,

    /// Number of classes
    n_classes: usize,

    /// Number of features seen in training
    n_features: usize,

    /// Is trained
    trained: bool,
}

impl RandomForestClassifier {
    pub fn new(n_trees: usize, seed: u64) -> Self {
        Self {
            metadata: ModelMetadata::new("Bagged Decision Trees", ModelType::RandomForest)
                .with_hyperparameter("n_trees", n_trees)
                .with_hyperparameter("seed", seed)
                .with_hyperparameter("criterion", "gini")
                .with_hyperparameter("bootstrap", true)
                .with_hyperparameter("max_features", "all")
                .with_hyperparameter("min_samples_split", 1),
            members: Vec::new(),
            n_trees: n_trees.max(1),
            seed,
            n_classes: 0,
            n_features: 0,
            trained: false,
        }
    }

    /// Draw row indices with replacement
    fn bootstrap_indices(rng: &mut StdRng, n_samples: usize) -> Vec<usize> {
        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }
}

impl Classifier for RandomForestClassifier {
    fn train(&mut self, dataset: &TrainingDataset) -> Result<ModelMetrics> {
        if dataset.n_samples == 0 {
            return Err(AppError::DegenerateTraining(
                "cannot fit a forest on zero samples".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut members = Vec::with_capacity(self.n_trees);
        let mut constant_members = 0usize;

        for _ in 0..self.n_trees {
            let indices = Self::bootstrap_indices(&mut rng, dataset.n_samples);
            let sample = dataset.features.select(ndarray::Axis(0), &indices);
            let labels: Vec<usize> = indices.iter().map(|&i| dataset.labels[i]).collect();

            let member = ForestMember::fit(&ndarray_to_densematrix(&sample), &labels)?;
            if matches!(member, ForestMember::Constant(_)) {
                constant_members += 1;
            }
            members.push(member);
        }

        debug!(
            n_trees = self.n_trees,
            constant_members, "Fitted bootstrap ensemble"
        );

        self.members = members;
        self.n_classes = dataset.n_classes();
        self.n_features = dataset.n_features;
        self.trained = true;

        let predictions = self.predict(&dataset.features)?;
        let metrics = calculate_metrics(&dataset.labels, &predictions, &dataset.classes);

        self.metadata.n_training_samples = dataset.n_samples;
        self.metadata.n_features = dataset.n_features;
        self.metadata.trained_at = chrono::Utc::now();
        self.metadata.training_metrics = metrics.clone();

        Ok(metrics)
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(features)?;

        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0usize, f64::MIN), |best, (idx, &p)| {
                        if p > best.1 {
                            (idx, p)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.trained {
            return Err(AppError::Internal("Model not trained".to_string()));
        }

        if features.ncols() != self.n_features {
            return Err(AppError::Validation(format!(
                "expected {} features, got {}",
                self.n_features,
                features.ncols()
            )));
        }

        let n_samples = features.nrows();
        let x = ndarray_to_densematrix(features);
        let votes = self
            .members
            .iter()
            .map(|member| member.predict(&x, n_samples))
            .collect::<Result<Vec<_>>>()?;

        Ok(votes_to_proba(&votes, n_samples, self.n_classes))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }

    fn is_trained(&self) -> bool {
        self.trained
    }
}

/// Decision Tree Classifier
pub struct DecisionTreeClassifierWrapper {
    /// Model metadata
    metadata: ModelMetadata,

    /// Trained model
    model: Option<ForestMember>,

    /// Number of classes
    n_classes: usize,

    /// Is trained
    trained: bool,
}

impl DecisionTreeClassifierWrapper {
    pub fn new() -> Self {
        Self {
            metadata: ModelMetadata::new("Decision Tree", ModelType::DecisionTree)
                .with_hyperparameter("criterion", "gini")
                .with_hyperparameter("min_samples_split", 1),
            model: None,
            n_classes: 0,
            trained: false,
        }
    }
}

impl Default for DecisionTreeClassifierWrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for DecisionTreeClassifierWrapper {
    fn train(&mut self, dataset: &TrainingDataset) -> Result<ModelMetrics> {
        let x = ndarray_to_densematrix(&dataset.features);
        let model = ForestMember::fit(&x, &dataset.labels)?;

        self.model = Some(model);
        self.n_classes = dataset.n_classes();
        self.trained = true;

        let predictions = self.predict(&dataset.features)?;
        let metrics = calculate_metrics(&dataset.labels, &predictions, &dataset.classes);

        self.metadata.n_training_samples = dataset.n_samples;
        self.metadata.n_features = dataset.n_features;
        self.metadata.trained_at = chrono::Utc::now();
        self.metadata.training_metrics = metrics.clone();

        Ok(metrics)
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let model = match (&self.model, self.trained) {
            (Some(model), true) => model,
            _ => return Err(AppError::Internal("Model not trained".to_string())),
        };

        let x = ndarray_to_densematrix(features);
        model.predict(&x, features.nrows())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let predictions = self.predict(features)?;
        Ok(votes_to_proba(
            &[predictions],
            features.nrows(),
            self.n_classes,
        ))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn model_type(&self) -> ModelType {
        ModelType::DecisionTree
    }

    fn is_trained(&self) -> bool {
        self.trained
    }
}

/// Diagnosis classifier: a fitted model plus the label set and feature
/// layout it was trained on
pub struct DiagnosisClassifier {
    model: Box<dyn Classifier>,

    /// Sorted class labels seen in training
    classes: Vec<String>,

    /// Feature names in training column order
    feature_names: Vec<String>,
}

impl DiagnosisClassifier {
    /// Fit the configured model type on a training table
    pub fn train(table: &TrainingTable, config: &MLConfig) -> Result<Self> {
        config.validate()?;

        let model: Box<dyn Classifier> = match config.kind {
            ModelType::RandomForest => {
                Box::new(RandomForestClassifier::new(config.n_trees, config.seed))
            }
            ModelType::DecisionTree => Box::new(DecisionTreeClassifierWrapper::new()),
        };

        Self::with_model(model, table)
    }

    /// Fit an arbitrary model on a training table
    pub fn with_model(mut model: Box<dyn Classifier>, table: &TrainingTable) -> Result<Self> {
        let dataset = TrainingDataset::from_table(table)?;

        info!(
            "Training {} on {} rows x {} features ({} classes)",
            model.model_type(),
            dataset.n_samples,
            dataset.n_features,
            dataset.n_classes()
        );

        let metrics = model.train(&dataset)?;

        info!(
            "Diagnosis classifier trained - training accuracy: {:.2}%",
            metrics.accuracy * 100.0
        );

        Ok(Self {
            model,
            classes: dataset.classes,
            feature_names: dataset.feature_names,
        })
    }

    /// Class labels in output order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Probability for every training label
    pub fn predict_proba(&self, vector: &FeatureVector) -> Result<Prediction<String>> {
        if vector.len() != self.n_features() {
            return Err(AppError::Validation(format!(
                "feature vector has {} values, expected {}",
                vector.len(),
                self.n_features()
            )));
        }

        let row = Array2::from_shape_vec((1, vector.len()), vector.to_f64())
            .map_err(|e| AppError::Internal(format!("Failed to create feature array: {}", e)))?;

        let proba = self.model.predict_proba(&row)?;
        if proba.ncols() != self.classes.len() {
            return Err(AppError::Model(format!(
                "model returned {} class probabilities, expected {}",
                proba.ncols(),
                self.classes.len()
            )));
        }

        let probabilities: Vec<DiagnosisProbability> = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, label)| DiagnosisProbability::new(label.clone(), proba[[0, i]]))
            .collect();

        let best = probabilities
            .iter()
            .fold(&probabilities[0], |best, p| {
                if p.probability > best.probability {
                    p
                } else {
                    best
                }
            })
            .clone();

        Ok(Prediction::new(best.label, best.probability).with_probabilities(probabilities))
    }

    /// Get model metadata
    pub fn metadata(&self) -> &ModelMetadata {
        self.model.metadata()
    }

    pub fn model_type(&self) -> ModelType {
        self.model.model_type()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_trained()
    }
}
