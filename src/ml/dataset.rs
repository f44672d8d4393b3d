use crate::catalog::FeatureCatalog;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Built-in training columns, keyed by symptom (column order is not the
/// catalog order; `TrainingTable::aligned_to` fixes that up)
const BUILTIN_COLUMNS: &[(&str, [u8; 5])] = &[
    ("hallucinations", [1, 0, 0, 0, 0]),
    ("delusions", [1, 1, 0, 0, 0]),
    ("anxiety", [0, 0, 1, 0, 1]),
    ("depressed_mood", [0, 0, 1, 1, 0]),
    ("impulsivity", [0, 0, 0, 1, 0]),
    ("memory_loss", [0, 0, 0, 0, 1]),
    ("sleep_disturbance", [0, 0, 1, 1, 1]),
    ("paranoia", [1, 1, 0, 0, 1]),
];

const BUILTIN_LABELS: [&str; 5] = [
    "schizophrenia",
    "bipolar_disorder",
    "ptsd",
    "major_depression",
    "borderline_personality",
];

/// One labeled historical record: 0/1 presence per symptom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRow {
    pub values: Vec<u8>,
    pub diagnosis: String,
}

impl ExampleRow {
    pub fn new(values: Vec<u8>, diagnosis: impl Into<String>) -> Self {
        Self {
            values,
            diagnosis: diagnosis.into(),
        }
    }
}

/// Fixed in-memory dataset of labeled examples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingTable {
    /// Column names, one per feature
    pub feature_names: Vec<String>,

    pub rows: Vec<ExampleRow>,

    /// Labels the table is expected to cover; each must have at least one row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_labels: Option<Vec<String>>,
}

impl TrainingTable {
    pub fn new(feature_names: Vec<String>, rows: Vec<ExampleRow>) -> Self {
        Self {
            feature_names,
            rows,
            declared_labels: None,
        }
    }

    pub fn with_declared_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// The table compiled into the program, in its original column order
    pub fn builtin() -> Self {
        let feature_names = BUILTIN_COLUMNS
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();

        let rows = BUILTIN_LABELS
            .iter()
            .enumerate()
            .map(|(row, label)| {
                let values = BUILTIN_COLUMNS.iter().map(|(_, col)| col[row]).collect();
                ExampleRow::new(values, *label)
            })
            .collect();

        Self::new(feature_names, rows).with_declared_labels(BUILTIN_LABELS)
    }

    /// Reorder columns to match the catalog's feature layout
    ///
    /// Fails when a catalog feature has no column or the table carries a
    /// column the catalog does not know.
    pub fn aligned_to(&self, catalog: &FeatureCatalog) -> Result<Self> {
        for name in &self.feature_names {
            if !catalog.contains(name) {
                return Err(AppError::Validation(format!(
                    "training column '{}' is not a catalog symptom",
                    name
                )));
            }
        }

        let positions = catalog
            .features()
            .iter()
            .map(|feature| {
                self.feature_names
                    .iter()
                    .position(|name| name == feature)
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "training table has no column for '{}'",
                            feature
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let values = positions
                    .iter()
                    .map(|&p| {
                        row.values.get(p).copied().ok_or_else(|| {
                            AppError::Validation(format!(
                                "row for '{}' has {} values, expected {}",
                                row.diagnosis,
                                row.values.len(),
                                self.feature_names.len()
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ExampleRow::new(values, row.diagnosis.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            feature_names: catalog.features().to_vec(),
            rows,
            declared_labels: self.declared_labels.clone(),
        })
    }

    /// Check the table can produce a meaningful model
    pub fn validate(&self) -> Result<()> {
        if self.rows.is_empty() {
            return Err(AppError::DegenerateTraining(
                "training table has no rows".to_string(),
            ));
        }
        if self.feature_names.is_empty() {
            return Err(AppError::DegenerateTraining(
                "training table has no feature columns".to_string(),
            ));
        }

        for row in &self.rows {
            if row.diagnosis.trim().is_empty() {
                return Err(AppError::Validation(
                    "training row has an empty diagnosis label".to_string(),
                ));
            }
            if row.values.len() != self.feature_names.len() {
                return Err(AppError::Validation(format!(
                    "row for '{}' has {} values, expected {}",
                    row.diagnosis,
                    row.values.len(),
                    self.feature_names.len()
                )));
            }
            if let Some(v) = row.values.iter().find(|&&v| v > 1) {
                return Err(AppError::Validation(format!(
                    "row for '{}' holds {}; training values must be 0 or 1",
                    row.diagnosis, v
                )));
            }
        }

        if let Some(declared) = &self.declared_labels {
            for label in declared {
                if !self.rows.iter().any(|r| &r.diagnosis == label) {
                    return Err(AppError::DegenerateTraining(format!(
                        "class '{}' has no training examples",
                        label
                    )));
                }
            }
            if let Some(row) = self.rows.iter().find(|r| !declared.contains(&r.diagnosis)) {
                return Err(AppError::Validation(format!(
                    "row label '{}' is not a declared class",
                    row.diagnosis
                )));
            }
        }

        Ok(())
    }

    /// Sorted distinct labels
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.rows.iter().map(|r| r.diagnosis.clone()).collect();
        classes.sort();
        classes.dedup();
        classes
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}
